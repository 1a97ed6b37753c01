//! Embedded card form flow: the API creates a payment intent directly and
//! the page confirms it with the returned client secret.

use chrono::Utc;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::helpers::{err_response, json_response};
use crate::core::models::{
    PaymentIntentRequest, RegistrationAttempt, StudentInfo, cents_to_dollars, payment_metadata,
};
use crate::core::pricing::{CURRENCY, Course, PaymentQuote, payment_intent_quote};
use crate::core::registrations::RegistrationStore;
use crate::errors::{CheckoutError, StripeErrorKind};
use crate::stripe::StripeClient;

/// Receipt description, e.g. `Individual Driving Lesson (3 lessons)`.
#[must_use]
pub fn describe(course: Course, quantity: u32) -> String {
    let name = course.receipt_name();
    if course == Course::Individual && quantity > 1 {
        format!("{name} ({quantity} lessons)")
    } else {
        name.to_string()
    }
}

/// Parameters for `POST /v1/payment_intents`.
#[must_use]
pub fn payment_intent_params(
    quote: &PaymentQuote,
    student: &StudentInfo,
    business_name: &str,
) -> Value {
    let receipt_email = Some(student.email.trim()).filter(|e| !e.is_empty());
    json!({
        "amount": quote.total_cents,
        "currency": CURRENCY,
        "description": describe(quote.course, quote.quantity),
        "metadata": payment_metadata(quote.course, quote.quantity, student, business_name),
        "receipt_email": receipt_email,
    })
}

/// Maps a failure to the status code and message shown to the client.
#[must_use]
pub fn failure_response(err: &CheckoutError) -> Value {
    match err {
        CheckoutError::StripeError { kind, message, .. } => match kind {
            StripeErrorKind::Card => err_response(400, message),
            StripeErrorKind::RateLimit => err_response(429, "Rate limit exceeded"),
            StripeErrorKind::InvalidRequest => err_response(400, "Invalid request"),
            StripeErrorKind::Authentication => err_response(401, "Authentication failed"),
            StripeErrorKind::Idempotency | StripeErrorKind::Api => {
                err_response(500, "Payment processing error")
            }
        },
        CheckoutError::HttpError(_) => err_response(500, "Network error"),
        _ => err_response(500, "An unexpected error occurred"),
    }
}

/// `POST /create-payment-intent`
pub async fn create_payment_intent(
    stripe: &StripeClient,
    store: &dyn RegistrationStore,
    business_name: &str,
    body: Option<&str>,
) -> Value {
    let request: PaymentIntentRequest = match body.map(serde_json::from_str) {
        Some(Ok(req)) => req,
        Some(Err(e)) => {
            warn!("Malformed payment request: {}", e);
            return err_response(400, "Invalid request");
        }
        None => return err_response(400, "Invalid request"),
    };

    let Some(course) = Course::parse(&request.course) else {
        warn!(course = %request.course, "Rejected unknown course");
        return err_response(400, "Invalid course type");
    };
    #[cfg(feature = "debug-logs")]
    info!("Payment request student info: {:?}", request.student_info);

    #[cfg(not(feature = "debug-logs"))]
    info!(
        course = %course,
        has_email = !request.student_info.email.trim().is_empty(),
        "Payment request received"
    );

    if request.price.is_some() {
        info!("Ignoring client-supplied price; using the server price table");
    }

    let quote = payment_intent_quote(course, request.lessons);
    let params = payment_intent_params(&quote, &request.student_info, business_name);

    let intent = match stripe.create_payment_intent(&params).await {
        Ok(intent) => intent,
        Err(e) => {
            error!(course = %course, "Failed to create payment intent: {}", e);
            return failure_response(&e);
        }
    };

    let attempt = RegistrationAttempt {
        timestamp: Utc::now(),
        course,
        amount: cents_to_dollars(quote.total_cents),
        student_info: request.student_info.clone(),
        payment_intent_id: intent.id.clone(),
    };
    if let Err(e) = store.record_attempt(&attempt).await {
        // The intent exists at Stripe; the page can still complete payment.
        error!(payment_intent_id = %intent.id, "Failed to log registration attempt: {}", e);
    }

    json_response(
        200,
        &json!({
            "client_secret": intent.client_secret,
            "amount": cents_to_dollars(quote.total_cents),
            "course": course.receipt_name(),
        }),
    )
}
