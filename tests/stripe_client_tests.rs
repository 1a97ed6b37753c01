use httpmock::prelude::*;
use lessonpay::errors::{CheckoutError, StripeErrorKind};
use lessonpay::stripe::StripeClient;
use serde_json::json;

const SECRET_KEY: &str = "sk_test_123";

fn client(server: &MockServer) -> StripeClient {
    StripeClient::new(server.base_url(), SECRET_KEY).with_max_retries(2)
}

#[tokio::test]
async fn test_create_payment_intent_sends_form_params() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/payment_intents")
                .header("authorization", "Bearer sk_test_123")
                .header_exists("idempotency-key")
                .x_www_form_urlencoded_tuple("amount", "50850")
                .x_www_form_urlencoded_tuple("currency", "cad")
                .x_www_form_urlencoded_tuple("metadata[course]", "bde");
            then.status(200).json_body(json!({
                "id": "pi_123",
                "amount": 50850,
                "currency": "cad",
                "created": 1700000000,
                "status": "requires_payment_method",
                "client_secret": "pi_123_secret_abc",
                "metadata": {"course": "bde"}
            }));
        })
        .await;

    let intent = client(&server)
        .create_payment_intent(&json!({
            "amount": 50850,
            "currency": "cad",
            "metadata": {"course": "bde"}
        }))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(intent.id, "pi_123");
    assert_eq!(intent.client_secret.as_deref(), Some("pi_123_secret_abc"));
    assert_eq!(intent.metadata.get("course").map(String::as_str), Some("bde"));
}

#[tokio::test]
async fn test_create_checkout_session_flattens_line_items() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST)
                .path("/v1/checkout/sessions")
                .x_www_form_urlencoded_tuple("line_items[0][price_data][unit_amount]", "52200")
                .x_www_form_urlencoded_tuple("line_items[0][quantity]", "1")
                .x_www_form_urlencoded_tuple("mode", "payment");
            then.status(200).json_body(json!({
                "id": "cs_test_abc",
                "client_secret": "cs_test_abc_secret"
            }));
        })
        .await;

    let session = client(&server)
        .create_checkout_session(&json!({
            "line_items": [{
                "price_data": {"unit_amount": 52200},
                "quantity": 1
            }],
            "mode": "payment"
        }))
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.id, "cs_test_abc");
    assert_eq!(session.client_secret.as_deref(), Some("cs_test_abc_secret"));
}

#[tokio::test]
async fn test_retrieve_session_expands_payment_intent() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(GET)
                .path("/v1/checkout/sessions/cs_test_abc")
                .query_param("expand[]", "payment_intent");
            then.status(200).json_body(json!({
                "id": "cs_test_abc",
                "status": "complete",
                "payment_status": "paid",
                "payment_intent": {"id": "pi_9", "status": "succeeded"}
            }));
        })
        .await;

    let session = client(&server)
        .retrieve_checkout_session("cs_test_abc")
        .await
        .unwrap();

    mock.assert_async().await;
    assert_eq!(session.status.as_deref(), Some("complete"));
    assert_eq!(session.payment_intent_id(), Some("pi_9"));
    assert_eq!(session.payment_intent_status(), Some("succeeded"));
}

#[tokio::test]
async fn test_card_errors_are_not_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(402).json_body(json!({
                "error": {
                    "type": "card_error",
                    "code": "card_declined",
                    "message": "Your card was declined."
                }
            }));
        })
        .await;

    let err = client(&server)
        .create_payment_intent(&json!({"amount": 100}))
        .await
        .unwrap_err();

    mock.assert_hits_async(1).await;
    match err {
        CheckoutError::StripeError { kind, message, .. } => {
            assert_eq!(kind, StripeErrorKind::Card);
            assert_eq!(message, "Your card was declined.");
        }
        other => panic!("unexpected error: {other:?}"),
    }
}

#[tokio::test]
async fn test_server_errors_are_retried() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(500).json_body(json!({
                "error": {"type": "api_error", "message": "Something went wrong"}
            }));
        })
        .await;

    let err = client(&server)
        .create_payment_intent(&json!({"amount": 100}))
        .await
        .unwrap_err();

    // First attempt plus two retries.
    mock.assert_hits_async(3).await;
    assert!(err.is_transient());
}

#[tokio::test]
async fn test_rate_limit_is_classified() {
    let server = MockServer::start_async().await;
    server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(429).json_body(json!({
                "error": {"type": "invalid_request_error", "message": "Too many requests"}
            }));
        })
        .await;

    let err = StripeClient::new(server.base_url(), SECRET_KEY)
        .with_max_retries(0)
        .create_payment_intent(&json!({"amount": 100}))
        .await
        .unwrap_err();

    assert!(matches!(
        err,
        CheckoutError::StripeError {
            kind: StripeErrorKind::RateLimit,
            status: 429,
            ..
        }
    ));
}

#[tokio::test]
async fn test_zero_retry_budget_makes_one_attempt() {
    let server = MockServer::start_async().await;
    let mock = server
        .mock_async(|when, then| {
            when.method(POST).path("/v1/payment_intents");
            then.status(503).json_body(json!({
                "error": {"type": "api_error", "message": "Service unavailable"}
            }));
        })
        .await;

    let err = StripeClient::new(server.base_url(), SECRET_KEY)
        .with_max_retries(0)
        .create_payment_intent(&json!({"amount": 100}))
        .await
        .unwrap_err();

    mock.assert_hits_async(1).await;
    assert!(err.is_transient());
}
