//! Hosted checkout: session creation and status lookup.

use std::collections::HashMap;

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{Value, json};
use tracing::{error, info, warn};

use super::helpers::{err_response, json_response};
use crate::core::config::AppConfig;
use crate::core::models::CheckoutRequest;
use crate::core::pricing::{CURRENCY, Course};
use crate::errors::CheckoutError;
use crate::stripe::StripeClient;

static SESSION_ID_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^cs_[A-Za-z0-9_]{1,250}$").expect("static regex compile"));

pub const ALLOWED_SHIPPING_COUNTRIES: [&str; 2] = ["US", "CA"];

/// Parameters for `POST /v1/checkout/sessions`.
#[must_use]
pub fn checkout_session_params(config: &AppConfig, course: Course, quantity: u32) -> Value {
    json!({
        "ui_mode": "custom",
        "billing_address_collection": "auto",
        "shipping_address_collection": { "allowed_countries": ALLOWED_SHIPPING_COUNTRIES },
        "line_items": [{
            "price_data": {
                "product_data": { "name": course.checkout_name() },
                "currency": CURRENCY,
                "unit_amount": course.checkout_unit_amount_cents(),
            },
            "quantity": quantity,
        }],
        "mode": "payment",
        "return_url": config.checkout_return_url(),
        "automatic_tax": { "enabled": true },
    })
}

#[must_use]
pub fn is_valid_session_id(session_id: &str) -> bool {
    SESSION_ID_RE.is_match(session_id)
}

/// `POST /create-checkout-session`
pub async fn create_checkout_session(
    config: &AppConfig,
    stripe: &StripeClient,
    body: Option<&str>,
) -> Value {
    let request: CheckoutRequest = match body.map(serde_json::from_str) {
        Some(Ok(req)) => req,
        Some(Err(e)) => {
            warn!("Malformed checkout request: {}", e);
            return err_response(400, "Invalid request body");
        }
        None => return err_response(400, "Missing body"),
    };

    let Some(course) = Course::parse(&request.course) else {
        warn!(course = %request.course, "Rejected unknown course");
        return err_response(400, "Invalid course type");
    };
    let quantity = course.quantity(request.number_of_lessons);
    let params = checkout_session_params(config, course, quantity);

    match stripe.create_checkout_session(&params).await {
        Ok(session) => {
            info!(session_id = %session.id, course = %course, quantity, "Checkout session ready");
            json_response(
                200,
                &json!({
                    "clientSecret": session.client_secret,
                    "sessionId": session.id,
                }),
            )
        }
        Err(e) => {
            error!("Failed to create checkout session: {}", e);
            server_error(&e)
        }
    }
}

/// `GET /session-status?session_id=...`
pub async fn session_status(stripe: &StripeClient, query: &HashMap<String, String>) -> Value {
    let Some(session_id) = query.get("session_id").filter(|s| !s.is_empty()) else {
        return err_response(400, "Missing session_id");
    };
    if !is_valid_session_id(session_id) {
        return err_response(400, "Invalid session_id");
    }

    match stripe.retrieve_checkout_session(session_id).await {
        Ok(session) => json_response(
            200,
            &json!({
                "status": session.status,
                "payment_status": session.payment_status,
                "payment_intent_id": session.payment_intent_id(),
                "payment_intent_status": session.payment_intent_status(),
            }),
        ),
        Err(e) => {
            error!(session_id = %session_id, "Failed to retrieve checkout session: {}", e);
            server_error(&e)
        }
    }
}

/// Forwards Stripe's status code; anything else is a 500.
fn server_error(err: &CheckoutError) -> Value {
    match err {
        CheckoutError::StripeError {
            status, message, ..
        } => err_response(*status, &format!("Server error: {message}")),
        other => err_response(500, &format!("Server error: {other}")),
    }
}
