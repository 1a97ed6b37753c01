use std::time::{SystemTime, UNIX_EPOCH};

use hmac::{Hmac, Mac};
use sha2::Sha256;
use tracing::error;

use super::types::Event;
use crate::errors::CheckoutError;

type HmacSha256 = Hmac<Sha256>;

/// Maximum age of a signed webhook, in seconds.
pub const DEFAULT_TOLERANCE_SECS: u64 = 300;

/// Allowed clock skew for timestamps from the future, in seconds.
const FUTURE_SKEW_SECS: u64 = 60;

/// Parsed `Stripe-Signature` header: `t=<unix>,v1=<hex>[,v1=<hex>][,v0=...]`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignatureHeader {
    pub timestamp: u64,
    pub signatures: Vec<String>,
}

impl SignatureHeader {
    /// # Errors
    ///
    /// Returns a `SignatureError` when the timestamp or every `v1` entry is missing.
    pub fn parse(header: &str) -> Result<Self, CheckoutError> {
        let mut timestamp = None;
        let mut signatures = Vec::new();

        for item in header.split(',') {
            let Some((key, value)) = item.trim().split_once('=') else {
                continue;
            };
            match key {
                "t" => timestamp = value.parse::<u64>().ok(),
                "v1" => signatures.push(value.to_string()),
                _ => {}
            }
        }

        let timestamp = timestamp.ok_or_else(|| {
            CheckoutError::SignatureError("Unable to extract timestamp from header".to_string())
        })?;
        if signatures.is_empty() {
            return Err(CheckoutError::SignatureError(
                "No v1 signatures found in header".to_string(),
            ));
        }

        Ok(Self {
            timestamp,
            signatures,
        })
    }
}

/// Verifies `payload` against a `Stripe-Signature` header at time `now_secs`.
///
/// # Errors
///
/// Returns a `SignatureError` when the header is malformed, the timestamp is
/// outside the tolerance window, or no `v1` signature matches.
pub fn verify_signature(
    payload: &str,
    header: &str,
    secret: &str,
    now_secs: u64,
    tolerance_secs: u64,
) -> Result<(), CheckoutError> {
    let parsed = SignatureHeader::parse(header)?;

    if now_secs.saturating_sub(parsed.timestamp) > tolerance_secs
        || parsed.timestamp > now_secs + FUTURE_SKEW_SECS
    {
        error!("Timestamp out of range, potential replay attack");
        return Err(CheckoutError::SignatureError(
            "Timestamp outside the tolerance zone".to_string(),
        ));
    }

    let mut mac = HmacSha256::new_from_slice(secret.as_bytes())
        .map_err(|e| CheckoutError::SignatureError(format!("Failed to create HMAC: {e}")))?;
    mac.update(format!("{}.{}", parsed.timestamp, payload).as_bytes());

    let matched = parsed.signatures.iter().any(|candidate| {
        hex::decode(candidate)
            .map(|bytes| mac.clone().verify_slice(&bytes).is_ok())
            .unwrap_or(false)
    });

    if matched {
        Ok(())
    } else {
        error!("Webhook signature verification failed");
        Err(CheckoutError::SignatureError(
            "No signatures found matching the expected signature for payload".to_string(),
        ))
    }
}

/// Verifies the signature with the default tolerance and decodes the event.
///
/// # Errors
///
/// Returns a `SignatureError` for bad signatures and a `ParseError` for a
/// payload that is not a Stripe event.
pub fn construct_event(payload: &str, header: &str, secret: &str) -> Result<Event, CheckoutError> {
    let now_secs = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map_err(|e| CheckoutError::GeneralError(format!("System clock error: {e}")))?
        .as_secs();
    verify_signature(payload, header, secret, now_secs, DEFAULT_TOLERANCE_SECS)?;

    serde_json::from_str(payload)
        .map_err(|e| CheckoutError::ParseError(format!("Invalid webhook payload: {e}")))
}

/// Hex HMAC of `"{timestamp}.{payload}"`, as Stripe computes it.
#[must_use]
pub fn compute_signature(timestamp: u64, payload: &str, secret: &str) -> String {
    let mut mac = match HmacSha256::new_from_slice(secret.as_bytes()) {
        Ok(mac) => mac,
        Err(e) => {
            error!("Failed to create HMAC: {}", e);
            return String::new();
        }
    };
    mac.update(format!("{timestamp}.{payload}").as_bytes());
    hex::encode(mac.finalize().into_bytes())
}

/// Builds a `Stripe-Signature` header value for `payload`.
#[must_use]
pub fn signature_header(timestamp: u64, payload: &str, secret: &str) -> String {
    format!(
        "t={},v1={}",
        timestamp,
        compute_signature(timestamp, payload, secret)
    )
}
