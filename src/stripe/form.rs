//! Stripe takes `application/x-www-form-urlencoded` bodies with nested
//! parameters spelled in bracket notation, e.g.
//! `line_items[0][price_data][currency]=cad`.

use serde_json::Value;

/// Flattens a JSON object into Stripe form pairs. Nulls are dropped; arrays
/// are indexed; booleans and numbers use their JSON spelling.
#[must_use]
pub fn encode_params(params: &Value) -> Vec<(String, String)> {
    let mut out = Vec::new();
    if let Value::Object(map) = params {
        for (key, value) in map {
            flatten_into(key.clone(), value, &mut out);
        }
    }
    out
}

fn flatten_into(prefix: String, value: &Value, out: &mut Vec<(String, String)>) {
    match value {
        Value::Null => {}
        Value::Bool(b) => out.push((prefix, b.to_string())),
        Value::Number(n) => out.push((prefix, n.to_string())),
        Value::String(s) => out.push((prefix, s.clone())),
        Value::Array(items) => {
            for (i, item) in items.iter().enumerate() {
                flatten_into(format!("{prefix}[{i}]"), item, out);
            }
        }
        Value::Object(map) => {
            for (key, item) in map {
                flatten_into(format!("{prefix}[{key}]"), item, out);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn lookup<'a>(pairs: &'a [(String, String)], key: &str) -> Option<&'a str> {
        pairs
            .iter()
            .find(|(k, _)| k == key)
            .map(|(_, v)| v.as_str())
    }

    #[test]
    fn nested_objects_and_arrays_use_brackets() {
        let pairs = encode_params(&json!({
            "mode": "payment",
            "line_items": [{
                "price_data": {"currency": "cad", "unit_amount": 52200},
                "quantity": 1
            }],
            "automatic_tax": {"enabled": true},
            "shipping_address_collection": {"allowed_countries": ["US", "CA"]}
        }));

        assert_eq!(lookup(&pairs, "mode"), Some("payment"));
        assert_eq!(
            lookup(&pairs, "line_items[0][price_data][currency]"),
            Some("cad")
        );
        assert_eq!(
            lookup(&pairs, "line_items[0][price_data][unit_amount]"),
            Some("52200")
        );
        assert_eq!(lookup(&pairs, "line_items[0][quantity]"), Some("1"));
        assert_eq!(lookup(&pairs, "automatic_tax[enabled]"), Some("true"));
        assert_eq!(
            lookup(&pairs, "shipping_address_collection[allowed_countries][1]"),
            Some("CA")
        );
    }

    #[test]
    fn nulls_are_skipped_and_non_objects_yield_nothing() {
        let pairs = encode_params(&json!({"receipt_email": null, "amount": 100}));
        assert_eq!(pairs, vec![("amount".to_string(), "100".to_string())]);
        assert!(encode_params(&json!(["a"])).is_empty());
    }
}
