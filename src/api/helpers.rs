//! Response builders for API Gateway proxy integrations.

use serde_json::{Value, json};

/// Returns a response with a JSON body.
#[must_use]
pub fn json_response(status_code: u16, body: &Value) -> Value {
    json!({
        "statusCode": status_code,
        "headers": { "Content-Type": "application/json" },
        "body": body.to_string()
    })
}

/// Returns an error response with the given status code and message.
#[must_use]
pub fn err_response(status_code: u16, message: &str) -> Value {
    json_response(status_code, &json!({ "error": message }))
}

/// Returns a response with an empty body, as webhook senders expect.
#[must_use]
pub fn empty_response(status_code: u16) -> Value {
    json!({ "statusCode": status_code, "body": "" })
}

#[must_use]
pub fn method_not_allowed() -> Value {
    err_response(405, "Method not allowed")
}

#[must_use]
pub fn not_found() -> Value {
    err_response(404, "Not found")
}
