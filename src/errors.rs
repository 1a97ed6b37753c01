use std::fmt;

use thiserror::Error;

/// Classification of a failed Stripe API call, derived from the HTTP status
/// and the `error.type` field of the response body.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StripeErrorKind {
    Card,
    RateLimit,
    InvalidRequest,
    Authentication,
    Idempotency,
    Api,
}

impl StripeErrorKind {
    #[must_use]
    pub fn classify(status: u16, error_type: Option<&str>) -> Self {
        match (status, error_type) {
            (429, _) => Self::RateLimit,
            (401, _) => Self::Authentication,
            (402, _) | (_, Some("card_error")) => Self::Card,
            (_, Some("idempotency_error")) => Self::Idempotency,
            (400 | 404, _) | (_, Some("invalid_request_error")) => Self::InvalidRequest,
            _ => Self::Api,
        }
    }
}

impl fmt::Display for StripeErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Card => "card_error",
            Self::RateLimit => "rate_limit_error",
            Self::InvalidRequest => "invalid_request_error",
            Self::Authentication => "authentication_error",
            Self::Idempotency => "idempotency_error",
            Self::Api => "api_error",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum CheckoutError {
    #[error("Failed to parse request: {0}")]
    ParseError(String),

    #[error("Invalid course type: {0}")]
    InvalidCourse(String),

    #[error("Stripe API error ({kind}, status {status}): {message}")]
    StripeError {
        kind: StripeErrorKind,
        status: u16,
        message: String,
    },

    #[error("Failed to send HTTP request: {0}")]
    HttpError(String),

    #[error("Failed to interact with AWS services: {0}")]
    AwsError(String),

    #[error("Failed to write registration record: {0}")]
    StorageError(String),

    #[error("Failed to send email: {0}")]
    EmailError(String),

    #[error("Webhook signature verification failed: {0}")]
    SignatureError(String),

    #[error("{0}")]
    GeneralError(String),
}

impl CheckoutError {
    /// Whether retrying the same call could succeed.
    #[must_use]
    pub fn is_transient(&self) -> bool {
        match self {
            Self::HttpError(_) => true,
            Self::StripeError { kind, status, .. } => {
                *kind == StripeErrorKind::RateLimit || *status >= 500
            }
            _ => false,
        }
    }
}

impl From<reqwest::Error> for CheckoutError {
    fn from(error: reqwest::Error) -> Self {
        CheckoutError::HttpError(error.to_string())
    }
}

impl From<serde_json::Error> for CheckoutError {
    fn from(error: serde_json::Error) -> Self {
        CheckoutError::ParseError(error.to_string())
    }
}

impl From<std::io::Error> for CheckoutError {
    fn from(error: std::io::Error) -> Self {
        CheckoutError::StorageError(error.to_string())
    }
}

impl From<anyhow::Error> for CheckoutError {
    fn from(error: anyhow::Error) -> Self {
        CheckoutError::GeneralError(error.to_string())
    }
}

impl<E, R> From<aws_sdk_sqs::error::SdkError<E, R>> for CheckoutError
where
    E: std::error::Error + Send + Sync + 'static,
    R: fmt::Debug,
{
    fn from(error: aws_sdk_sqs::error::SdkError<E, R>) -> Self {
        CheckoutError::AwsError(aws_sdk_sqs::error::DisplayErrorContext(error).to_string())
    }
}
