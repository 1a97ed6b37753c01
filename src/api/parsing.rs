use std::collections::HashMap;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use percent_encoding::percent_decode_str;
use serde_json::Value;

use crate::errors::CheckoutError;

/// The parts of an API Gateway proxy event the router looks at. Accepts
/// both HTTP API (v2) and REST API (v1) payload shapes.
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: String,
    pub path: String,
    pub query: HashMap<String, String>,
    pub headers: Value,
    pub body: Option<String>,
}

impl ApiRequest {
    /// # Errors
    ///
    /// Returns a `ParseError` when the body is flagged base64 but does not decode.
    pub fn from_event(payload: &Value) -> Result<Self, CheckoutError> {
        let method = v_str(payload, &["requestContext", "http", "method"])
            .or_else(|| payload.get("httpMethod").and_then(Value::as_str))
            .unwrap_or("")
            .to_ascii_uppercase();

        let path = payload
            .get("rawPath")
            .and_then(Value::as_str)
            .or_else(|| payload.get("path").and_then(Value::as_str))
            .unwrap_or("/")
            .to_string();

        let query = match payload.get("rawQueryString").and_then(Value::as_str) {
            Some(raw) => parse_query_string(raw),
            None => payload
                .get("queryStringParameters")
                .and_then(Value::as_object)
                .map(|map| {
                    map.iter()
                        .filter_map(|(k, v)| v.as_str().map(|s| (k.clone(), s.to_string())))
                        .collect()
                })
                .unwrap_or_default(),
        };

        let headers = payload.get("headers").cloned().unwrap_or(Value::Null);

        let is_base64 = payload
            .get("isBase64Encoded")
            .and_then(Value::as_bool)
            .unwrap_or(false);
        let body = match payload.get("body").and_then(Value::as_str) {
            Some(raw) if is_base64 => Some(decode_base64_body(raw)?),
            Some(raw) => Some(raw.to_string()),
            None => None,
        };

        Ok(Self {
            method,
            path,
            query,
            headers,
            body,
        })
    }

    #[must_use]
    pub fn header(&self, name: &str) -> Option<&str> {
        get_header_value(&self.headers, name)
    }

    /// Path without a trailing slash.
    #[must_use]
    pub fn route_path(&self) -> &str {
        let trimmed = self.path.trim_end_matches('/');
        if trimmed.is_empty() { "/" } else { trimmed }
    }
}

fn decode_base64_body(raw: &str) -> Result<String, CheckoutError> {
    let bytes = STANDARD
        .decode(raw)
        .map_err(|e| CheckoutError::ParseError(format!("Invalid base64 body: {e}")))?;
    String::from_utf8(bytes)
        .map_err(|e| CheckoutError::ParseError(format!("Body is not UTF-8: {e}")))
}

pub fn v_path<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    let mut cur = root;
    for key in path {
        cur = cur.get(*key)?;
    }
    Some(cur)
}

pub fn v_str<'a>(root: &'a Value, path: &[&str]) -> Option<&'a str> {
    v_path(root, path).and_then(|v| v.as_str())
}

pub fn get_header_value<'a>(headers: &'a Value, name: &str) -> Option<&'a str> {
    if let Some(v) = headers.get(name).and_then(|s| s.as_str()) {
        return Some(v);
    }
    headers.as_object().and_then(|map| {
        map.iter().find_map(|(k, v)| {
            if k.eq_ignore_ascii_case(name) {
                v.as_str()
            } else {
                None
            }
        })
    })
}

/// Decodes a URL component; `+` stands for a space.
///
/// # Errors
///
/// Returns an error if the decoded bytes are not valid UTF-8.
pub fn decode_url_component(input: &str) -> Result<String, String> {
    let spaced = input.replace('+', " ");
    percent_decode_str(&spaced)
        .decode_utf8()
        .map(|s| s.to_string())
        .map_err(|e| format!("Failed to decode URL component: {}", e))
}

/// Parses `a=1&b=two` into a map. Later duplicates win; undecodable pairs
/// are skipped.
#[must_use]
pub fn parse_query_string(raw: &str) -> HashMap<String, String> {
    raw.trim_start_matches('?')
        .split('&')
        .filter(|pair| !pair.is_empty())
        .filter_map(|pair| {
            let (key, value) = pair.split_once('=').unwrap_or((pair, ""));
            let key = decode_url_component(key).ok()?;
            let value = decode_url_component(value).ok()?;
            Some((key, value))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn decodes_plus_and_percent() {
        assert_eq!(decode_url_component("hello+world").unwrap(), "hello world");
        assert_eq!(decode_url_component("a%2Bb").unwrap(), "a+b");
        assert_eq!(
            decode_url_component("test%40example.com").unwrap(),
            "test@example.com"
        );
    }

    #[test]
    fn query_string_pairs() {
        let q = parse_query_string("q=road+test&category=safety&page=2&flag");
        assert_eq!(q.get("q").map(String::as_str), Some("road test"));
        assert_eq!(q.get("category").map(String::as_str), Some("safety"));
        assert_eq!(q.get("page").map(String::as_str), Some("2"));
        assert_eq!(q.get("flag").map(String::as_str), Some(""));
    }

    #[test]
    fn http_api_v2_event() {
        let req = ApiRequest::from_event(&json!({
            "rawPath": "/prod/session-status/",
            "rawQueryString": "session_id=cs_test_123",
            "requestContext": {"http": {"method": "get"}},
            "headers": {"content-type": "application/json"}
        }))
        .unwrap();
        assert_eq!(req.method, "GET");
        assert_eq!(req.route_path(), "/prod/session-status");
        assert_eq!(req.query.get("session_id").map(String::as_str), Some("cs_test_123"));
        assert_eq!(req.header("Content-Type"), Some("application/json"));
        assert!(req.body.is_none());
    }

    #[test]
    fn rest_api_v1_event_with_base64_body() {
        let req = ApiRequest::from_event(&json!({
            "path": "/webhook",
            "httpMethod": "POST",
            "queryStringParameters": null,
            "isBase64Encoded": true,
            "body": "eyJpZCI6ImV2dF8xIn0="
        }))
        .unwrap();
        assert_eq!(req.method, "POST");
        assert_eq!(req.body.as_deref(), Some(r#"{"id":"evt_1"}"#));
        assert!(req.query.is_empty());
    }
}
