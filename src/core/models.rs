use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::pricing::Course;
use crate::stripe::types::PaymentIntent;

/// Body of `POST /create-checkout-session`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckoutRequest {
    pub course: String,
    #[serde(default)]
    pub number_of_lessons: Option<u32>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentInfo {
    #[serde(default)]
    pub first_name: String,
    #[serde(default)]
    pub last_name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub phone: String,
}

impl StudentInfo {
    #[must_use]
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name.trim(), self.last_name.trim())
            .trim()
            .to_string()
    }
}

/// Body of `POST /create-payment-intent`. A client-supplied `price` is
/// accepted for compatibility but never trusted.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PaymentIntentRequest {
    pub course: String,
    #[serde(default)]
    pub lessons: Option<u32>,
    #[serde(default)]
    pub student_info: StudentInfo,
    #[serde(default)]
    pub price: Option<serde_json::Value>,
}

/// Queued from the webhook for the worker once a payment has succeeded.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfirmationTask {
    pub correlation_id: String,
    pub event_id: String,
    pub payment_intent: PaymentIntent,
}

/// Appended for every payment intent created by the API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RegistrationAttempt {
    #[serde(with = "log_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub course: Course,
    /// Dollars, tax included.
    pub amount: f64,
    pub student_info: StudentInfo,
    pub payment_intent_id: String,
}

/// Appended by the worker once a confirmation has been processed.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompletedRegistration {
    #[serde(with = "log_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub payment_id: String,
    pub amount: f64,
    pub course: Option<String>,
    pub student_name: Option<String>,
    pub student_email: Option<String>,
    pub student_phone: Option<String>,
    pub lessons: String,
    pub status: String,
}

impl CompletedRegistration {
    #[must_use]
    pub fn from_payment_intent(intent: &PaymentIntent, timestamp: DateTime<Utc>) -> Self {
        let meta = |key: &str| intent.metadata.get(key).cloned();
        Self {
            timestamp,
            payment_id: intent.id.clone(),
            amount: cents_to_dollars(intent.amount),
            course: meta("course"),
            student_name: meta("student_name"),
            student_email: meta("student_email"),
            student_phone: meta("student_phone"),
            lessons: meta("lessons").unwrap_or_else(|| "1".to_string()),
            status: "completed".to_string(),
        }
    }
}

/// Appended by the webhook for `payment_intent.payment_failed`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailedPayment {
    #[serde(with = "log_timestamp")]
    pub timestamp: DateTime<Utc>,
    pub payment_id: String,
    pub amount: f64,
    pub student_email: String,
    pub error: String,
    /// Stripe's `last_payment_error.message`, when it gave one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub decline_reason: Option<String>,
}

impl FailedPayment {
    #[must_use]
    pub fn from_payment_intent(intent: &PaymentIntent, timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            payment_id: intent.id.clone(),
            amount: cents_to_dollars(intent.amount),
            student_email: intent
                .metadata
                .get("student_email")
                .cloned()
                .unwrap_or_else(|| "unknown".to_string()),
            error: "Payment failed".to_string(),
            decline_reason: intent
                .last_payment_error
                .as_ref()
                .and_then(|e| e.message.clone()),
        }
    }
}

#[allow(clippy::cast_precision_loss)]
#[must_use]
pub fn cents_to_dollars(cents: u64) -> f64 {
    cents as f64 / 100.0
}

/// Metadata attached to payment intents created by the API.
#[must_use]
pub fn payment_metadata(
    course: Course,
    lessons: u32,
    student: &StudentInfo,
    business_name: &str,
) -> HashMap<String, String> {
    HashMap::from([
        ("course".to_string(), course.code().to_string()),
        ("student_name".to_string(), student.full_name()),
        ("student_email".to_string(), student.email.clone()),
        ("student_phone".to_string(), student.phone.clone()),
        ("lessons".to_string(), lessons.to_string()),
        ("driving_school".to_string(), business_name.to_string()),
    ])
}

/// Registration logs use `YYYY-MM-DD HH:MM:SS` (UTC).
mod log_timestamp {
    use chrono::{DateTime, NaiveDateTime, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    const FORMAT: &str = "%Y-%m-%d %H:%M:%S";

    pub fn serialize<S: Serializer>(ts: &DateTime<Utc>, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_str(&ts.format(FORMAT).to_string())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<DateTime<Utc>, D::Error> {
        let raw = String::deserialize(d)?;
        NaiveDateTime::parse_from_str(&raw, FORMAT)
            .map(|naive| naive.and_utc())
            .map_err(serde::de::Error::custom)
    }
}
