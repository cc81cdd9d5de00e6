//! Live adapter against a local HTTP vendor.

use adapters::{AdapterError, EndpointConfig, HttpServiceAdapter, ServiceAdapter, ServiceFamily};
use axum::{
    http::{HeaderMap, StatusCode},
    routing::post,
    Json, Router,
};
use serde_json::{json, Value};

async fn echo(headers: HeaderMap, Json(body): Json<Value>) -> Json<Value> {
    let authorization = headers
        .get("authorization")
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default()
        .to_string();
    Json(json!({ "authorization": authorization, "received": body }))
}

/// Serve a fake vendor on an ephemeral port and return its base URL.
async fn vendor() -> String {
    let app = Router::new()
        .route("/echo", post(echo))
        .route("/unauthorized", post(|| async { (StatusCode::UNAUTHORIZED, "bad key") }))
        .route("/forbidden", post(|| async { (StatusCode::FORBIDDEN, "no access") }))
        .route("/throttled", post(|| async { (StatusCode::TOO_MANY_REQUESTS, "slow down") }))
        .route(
            "/broken",
            post(|| async { (StatusCode::INTERNAL_SERVER_ERROR, "upstream exploded") }),
        )
        .route("/listing", post(|| async { Json(json!([1, 2, 3])) }))
        .route("/garbage", post(|| async { "not json" }));

    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });

    format!("http://{}", addr)
}

async fn adapter() -> HttpServiceAdapter {
    let config = EndpointConfig::new("test-key", vendor().await).with_timeout_secs(5);
    HttpServiceAdapter::new(ServiceFamily::Legal, config).unwrap()
}

#[tokio::test]
async fn test_success_returns_body_and_sends_bearer_key() {
    let adapter = adapter().await;

    let result = adapter
        .invoke("echo", &json!({ "matter": "lease review" }))
        .await
        .unwrap();

    assert_eq!(result["authorization"], "Bearer test-key");
    assert_eq!(result["received"]["matter"], "lease review");
}

#[tokio::test]
async fn test_rejected_credentials_are_authentication_errors() {
    let adapter = adapter().await;

    for action in ["unauthorized", "forbidden"] {
        let err = adapter.invoke(action, &json!({})).await.unwrap_err();
        assert!(err.is_auth_error(), "{} gave {:?}", action, err);
    }
}

#[tokio::test]
async fn test_throttling_is_rate_limited() {
    let adapter = adapter().await;

    let err = adapter.invoke("throttled", &json!({})).await.unwrap_err();
    assert!(matches!(err, AdapterError::RateLimited(ref body) if body == "slow down"));
}

#[tokio::test]
async fn test_unknown_endpoint_is_unsupported_action() {
    let adapter = adapter().await;

    let err = adapter.invoke("transcode", &json!({})).await.unwrap_err();
    match err {
        AdapterError::UnsupportedAction { family, action } => {
            assert_eq!(family, "legal");
            assert_eq!(action, "transcode");
        }
        other => panic!("expected UnsupportedAction, got {:?}", other),
    }
}

#[tokio::test]
async fn test_server_error_is_provider_error() {
    let adapter = adapter().await;

    let err = adapter.invoke("broken", &json!({})).await.unwrap_err();
    match err {
        AdapterError::Provider(message) => {
            assert!(message.contains("500"));
            assert!(message.contains("upstream exploded"));
        }
        other => panic!("expected Provider, got {:?}", other),
    }
}

#[tokio::test]
async fn test_non_object_bodies_are_invalid_responses() {
    let adapter = adapter().await;

    for action in ["listing", "garbage"] {
        let err = adapter.invoke(action, &json!({})).await.unwrap_err();
        assert!(
            matches!(err, AdapterError::InvalidResponse(_)),
            "{} gave {:?}",
            action,
            err
        );
    }
}
