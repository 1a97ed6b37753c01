//! Stripe webhook receiver.
//!
//! The request is acknowledged quickly: succeeded payments are queued for the
//! worker (email + completed registration), failed payments are logged inline.

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{error, info, warn};
use uuid::Uuid;

use super::helpers::{empty_response, json_response};
use super::parsing::ApiRequest;
use super::sqs::ConfirmationQueue;
use crate::core::models::{ConfirmationTask, FailedPayment};
use crate::core::registrations::RegistrationStore;
use crate::errors::CheckoutError;
use crate::stripe::types::{Event, PaymentIntent};
use crate::stripe::webhook::construct_event;

pub const PAYMENT_SUCCEEDED: &str = "payment_intent.succeeded";
pub const PAYMENT_FAILED: &str = "payment_intent.payment_failed";

pub const SIGNATURE_HEADER: &str = "Stripe-Signature";

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WebhookOutcome {
    /// Confirmation queued; carries the correlation id.
    Queued(String),
    /// Failed payment written to the log; carries the payment intent id.
    FailureLogged(String),
    /// Event type this endpoint does not handle.
    Unhandled(String),
}

/// Routes a verified event by type.
///
/// # Errors
///
/// Returns an error when the event object is not a payment intent or the
/// queue/store call fails.
pub async fn dispatch_event(
    event: &Event,
    queue: &dyn ConfirmationQueue,
    store: &dyn RegistrationStore,
) -> Result<WebhookOutcome, CheckoutError> {
    match event.event_type.as_str() {
        PAYMENT_SUCCEEDED => {
            let intent = payment_intent_from(event)?;
            let task = ConfirmationTask {
                correlation_id: Uuid::new_v4().to_string(),
                event_id: event.id.clone(),
                payment_intent: intent,
            };
            queue.enqueue(&task).await?;
            Ok(WebhookOutcome::Queued(task.correlation_id))
        }
        PAYMENT_FAILED => {
            let intent = payment_intent_from(event)?;
            store
                .record_failed(&FailedPayment::from_payment_intent(&intent, Utc::now()))
                .await?;
            Ok(WebhookOutcome::FailureLogged(intent.id))
        }
        other => Ok(WebhookOutcome::Unhandled(other.to_string())),
    }
}

fn payment_intent_from(event: &Event) -> Result<PaymentIntent, CheckoutError> {
    serde_json::from_value(event.data.object.clone()).map_err(|e| {
        CheckoutError::ParseError(format!(
            "Event {} does not carry a payment intent: {e}",
            event.id
        ))
    })
}

/// `POST /webhook`
pub async fn handle_webhook(
    request: &ApiRequest,
    webhook_secret: &str,
    queue: &dyn ConfirmationQueue,
    store: &dyn RegistrationStore,
) -> Value {
    let Some(payload) = request.body.as_deref() else {
        error!("Webhook request missing body");
        return empty_response(400);
    };
    let Some(signature) = request.header(SIGNATURE_HEADER) else {
        error!("Missing {} header", SIGNATURE_HEADER);
        return empty_response(400);
    };

    let event = match construct_event(payload, signature, webhook_secret) {
        Ok(event) => event,
        Err(e) => {
            error!("Rejected webhook: {}", e);
            return empty_response(400);
        }
    };
    info!(event_id = %event.id, event_type = %event.event_type, "Webhook verified");

    match dispatch_event(&event, queue, store).await {
        Ok(WebhookOutcome::Unhandled(event_type)) => {
            warn!(event_type = %event_type, "Unexpected webhook event type");
            empty_response(400)
        }
        Ok(outcome) => {
            info!(event_id = %event.id, ?outcome, "Webhook handled");
            json_response(200, &json!({ "received": true }))
        }
        Err(CheckoutError::ParseError(msg)) => {
            error!(event_id = %event.id, "Malformed event object: {}", msg);
            empty_response(400)
        }
        Err(e) => {
            // A 5xx makes Stripe redeliver the event later.
            error!(event_id = %event.id, "Failed to handle webhook: {}", e);
            empty_response(500)
        }
    }
}
