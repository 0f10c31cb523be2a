use axum::body::{to_bytes, Body};
use axum::http::{Request, StatusCode};
use axum::Router;
use jirax_core::Strictness;
use jirax_server::router;
use pretty_assertions::assert_eq;
use serde_json::{json, Value};
use tower::ServiceExt;

async fn post(app: Router, uri: &str, body: impl Into<Body>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(body.into())
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&bytes).unwrap())
}

fn comment_created() -> Value {
    json!({
        "webhookEvent": "comment_created",
        "timestamp": 1_500_000_000_000_i64,
        "comment": {"id": "10100", "body": "Off with their heads!"}
    })
}

#[tokio::test]
async fn test_health() {
    let request = Request::builder().uri("/health").body(Body::empty()).unwrap();
    let response = router(Strictness::Strict).oneshot(request).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body: Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(body["status"], json!("ok"));
    assert!(body["version"].is_string());
}

#[tokio::test]
async fn test_receive_event() {
    let (status, body) = post(
        router(Strictness::Strict),
        "/webhook",
        comment_created().to_string(),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["type"], json!("comment_created"));
    assert_eq!(body["kind"], json!("comment"));
    assert_eq!(body["timestamp"], json!("2017-07-14T02:40:00Z"));
    assert_eq!(body["extras"], json!([]));
    assert_eq!(body["delivery_id"].as_str().map(str::len), Some(36));
}

#[tokio::test]
async fn test_decode_error_is_unprocessable() {
    let mut payload = comment_created();
    payload["comment"] = json!("10100");

    let (status, body) = post(router(Strictness::Strict), "/webhook", payload.to_string()).await;

    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert_eq!(body["kind"], json!("webhook event"));
    assert_eq!(body["field"], json!("comment"));
    assert!(body["error"].as_str().unwrap().contains("field comment"));
}

#[tokio::test]
async fn test_strictness_query_overrides_default() {
    let mut payload = comment_created();
    payload["matchedWebhookIds"] = json!([3]);

    let (status, body) = post(router(Strictness::Strict), "/webhook", payload.to_string()).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body.get("field").is_none());

    let (status, body) = post(
        router(Strictness::Strict),
        "/webhook?strict=false",
        payload.to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["extras"], json!(["matchedWebhookIds"]));
}

#[tokio::test]
async fn test_unknown_event_falls_back_when_lenient() {
    let payload = json!({"webhookEvent": "sprint_started", "timestamp": 1_500_000_000_000_i64});

    let (status, body) = post(router(Strictness::Warn), "/webhook", payload.to_string()).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["kind"], json!("generic"));
    assert_eq!(body["type"], json!("sprint_started"));
}

#[tokio::test]
async fn test_bad_requests() {
    let (status, _) = post(router(Strictness::Strict), "/webhook", "[1, 2]").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = post(router(Strictness::Strict), "/webhook", "{not json").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, body) = post(
        router(Strictness::Strict),
        "/webhook?strict=maybe",
        comment_created().to_string(),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("invalid strictness"));
}
