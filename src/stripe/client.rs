//! Stripe API client module
//!
//! Encapsulates the handful of Stripe calls the checkout flows need, with
//! retry on transient failures and classification of Stripe error bodies.

use std::time::Duration;

use reqwest::{Client, Response};
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio_retry::strategy::{ExponentialBackoff, jitter};
use tracing::{info, warn};
use uuid::Uuid;

use super::form::encode_params;
use super::types::{ApiErrorBody, CheckoutSession, PaymentIntent};
use crate::core::config::AppConfig;
use crate::errors::{CheckoutError, StripeErrorKind};

const DEFAULT_MAX_RETRIES: usize = 3;

/// Stripe API client with retry logic and error handling
pub struct StripeClient {
    http: Client,
    api_base: String,
    secret_key: String,
    max_retries: usize,
}

impl StripeClient {
    #[must_use]
    pub fn new(api_base: impl Into<String>, secret_key: impl Into<String>) -> Self {
        let http = Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_else(|_| Client::new());
        Self {
            http,
            api_base: api_base.into().trim_end_matches('/').to_string(),
            secret_key: secret_key.into(),
            max_retries: DEFAULT_MAX_RETRIES,
        }
    }

    #[must_use]
    pub fn from_config(config: &AppConfig) -> Self {
        Self::new(&config.stripe_api_base, &config.stripe_secret_key)
    }

    #[must_use]
    pub fn with_max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Runs `operation`, retrying transient failures on a jittered
    /// exponential backoff up to `max_retries` times.
    async fn with_retry<F, Fut, T>(&self, mut operation: F) -> Result<T, CheckoutError>
    where
        F: FnMut() -> Fut + Send,
        Fut: std::future::Future<Output = Result<T, CheckoutError>> + Send,
        T: Send,
    {
        let mut delays = ExponentialBackoff::from_millis(10)
            .factor(10)
            .max_delay(Duration::from_secs(2))
            .map(jitter)
            .take(self.max_retries);

        loop {
            match operation().await {
                Ok(value) => return Ok(value),
                Err(e) if e.is_transient() => match delays.next() {
                    Some(delay) => {
                        warn!("Transient Stripe failure, retrying in {:?}: {}", delay, e);
                        tokio::time::sleep(delay).await;
                    }
                    None => return Err(e),
                },
                Err(e) => return Err(e),
            }
        }
    }

    /// # Errors
    ///
    /// Returns a classified `StripeError` when Stripe rejects the session, or
    /// an `HttpError` when Stripe cannot be reached.
    pub async fn create_checkout_session(
        &self,
        params: &Value,
    ) -> Result<CheckoutSession, CheckoutError> {
        let session: CheckoutSession = self.post_form("/v1/checkout/sessions", params).await?;
        info!(session_id = %session.id, "Checkout session created");
        Ok(session)
    }

    /// Retrieves a checkout session with its payment intent expanded.
    ///
    /// # Errors
    ///
    /// Returns an error if the call fails or the session does not exist.
    pub async fn retrieve_checkout_session(
        &self,
        session_id: &str,
    ) -> Result<CheckoutSession, CheckoutError> {
        let path = format!("/v1/checkout/sessions/{session_id}");
        self.get(&path, &[("expand[]", "payment_intent")]).await
    }

    /// # Errors
    ///
    /// Returns a classified `StripeError` (card, rate limit, ...) or an
    /// `HttpError` when Stripe cannot be reached.
    pub async fn create_payment_intent(
        &self,
        params: &Value,
    ) -> Result<PaymentIntent, CheckoutError> {
        let intent: PaymentIntent = self.post_form("/v1/payment_intents", params).await?;
        info!(payment_intent_id = %intent.id, amount = intent.amount, "Payment intent created");
        Ok(intent)
    }

    async fn post_form<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        params: &Value,
    ) -> Result<T, CheckoutError> {
        let url = format!("{}{}", self.api_base, path);
        let form = encode_params(params);
        // One key for every attempt so a retried create is applied once.
        let idempotency_key = Uuid::new_v4().to_string();

        self.with_retry(|| async {
            let resp = self
                .http
                .post(&url)
                .bearer_auth(&self.secret_key)
                .header("Idempotency-Key", &idempotency_key)
                .form(&form)
                .send()
                .await?;
            decode_response(resp).await
        })
        .await
    }

    async fn get<T: DeserializeOwned + Send>(
        &self,
        path: &str,
        query: &[(&str, &str)],
    ) -> Result<T, CheckoutError> {
        let url = format!("{}{}", self.api_base, path);

        self.with_retry(|| async {
            let resp = self
                .http
                .get(&url)
                .bearer_auth(&self.secret_key)
                .query(query)
                .send()
                .await?;
            decode_response(resp).await
        })
        .await
    }
}

async fn decode_response<T: DeserializeOwned>(resp: Response) -> Result<T, CheckoutError> {
    let status = resp.status();
    if status.is_success() {
        return resp
            .json::<T>()
            .await
            .map_err(|e| CheckoutError::ParseError(format!("Unexpected Stripe response: {e}")));
    }

    let body = resp
        .text()
        .await
        .unwrap_or_else(|_| "<failed to read body>".to_string());
    Err(stripe_error(status.as_u16(), &body))
}

/// Builds a classified error from a non-2xx Stripe response body.
#[must_use]
pub fn stripe_error(status: u16, body: &str) -> CheckoutError {
    let detail = serde_json::from_str::<ApiErrorBody>(body).ok().map(|b| b.error);
    let error_type = detail.as_ref().and_then(|d| d.error_type.as_deref());
    let kind = StripeErrorKind::classify(status, error_type);
    let message = detail
        .as_ref()
        .and_then(|d| d.message.clone())
        .or_else(|| detail.as_ref().and_then(|d| d.code.clone()))
        .unwrap_or_else(|| format!("HTTP {status}"));

    CheckoutError::StripeError {
        kind,
        status,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn card_errors_keep_stripe_message() {
        let err = stripe_error(
            402,
            r#"{"error":{"type":"card_error","code":"card_declined","message":"Your card was declined."}}"#,
        );
        match err {
            CheckoutError::StripeError {
                kind,
                status,
                message,
            } => {
                assert_eq!(kind, StripeErrorKind::Card);
                assert_eq!(status, 402);
                assert_eq!(message, "Your card was declined.");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[test]
    fn unparseable_bodies_fall_back_to_status() {
        let err = stripe_error(503, "<html>upstream</html>");
        assert!(err.is_transient());
        assert!(err.to_string().contains("HTTP 503"));
    }

    #[test]
    fn classification_by_status() {
        assert_eq!(
            StripeErrorKind::classify(429, Some("invalid_request_error")),
            StripeErrorKind::RateLimit
        );
        assert_eq!(
            StripeErrorKind::classify(401, None),
            StripeErrorKind::Authentication
        );
        assert_eq!(
            StripeErrorKind::classify(404, None),
            StripeErrorKind::InvalidRequest
        );
        assert_eq!(
            StripeErrorKind::classify(409, Some("idempotency_error")),
            StripeErrorKind::Idempotency
        );
        assert_eq!(StripeErrorKind::classify(500, None), StripeErrorKind::Api);
    }
}
