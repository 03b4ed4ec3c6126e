use crate::actors::fixtures::FixtureFeed;
use crate::actors::messages::AppError;
use crate::actors::supervisor::FALLBACK_REPLY;
use crate::api::{router, AppState};
use crate::tests::mocks::{options, supervisor, MockCompletion, MockFixtures};
use axum::body::{to_bytes, Body};
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use tokio::time::Duration;
use tower::ServiceExt;

fn app_with(completion: MockCompletion) -> Router {
    let completion = Arc::new(completion);
    let fixtures = Arc::new(MockFixtures::with_feed(FixtureFeed::Unconfigured));
    router(AppState::new(supervisor(
        &completion,
        &fixtures,
        options(Duration::from_millis(100)),
    )))
}

fn post(uri: &str, body: impl Into<String>) -> Request<Body> {
    Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.into()))
        .unwrap()
}

async fn send(app: Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = app.oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, body)
}

#[tokio::test]
async fn test_ask_returns_reply_and_session() {
    let app = app_with(MockCompletion::ok());
    let (status, body) = send(app, post("/ask", json!({"message": "hello"}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], "reply to: hello");
    assert!(body["session_id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body.get("fallback").is_none());
}

#[tokio::test]
async fn test_chat_alias_keeps_session() {
    let app = app_with(MockCompletion::ok());
    let (status, body) = send(
        app,
        post("/chat", json!({"message": "hi", "session_id": "abc"}).to_string()),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "abc");
}

#[tokio::test]
async fn test_bad_bodies_get_retry_prompt() {
    let bodies = [
        json!({}).to_string(),
        json!({"message": 42}).to_string(),
        json!({"message": "   "}).to_string(),
        json!({"message": ""}).to_string(),
        "{not json".to_string(),
    ];

    for body in bodies {
        let app = app_with(MockCompletion::ok());
        let (status, response) = send(app, post("/ask", body.clone())).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "body: {}", body);
        assert_eq!(response["reply"], "Please enter a valid message.");
    }
}

#[tokio::test]
async fn test_missing_content_type_is_bad_request() {
    let app = app_with(MockCompletion::ok());
    let request = Request::builder()
        .method(Method::POST)
        .uri("/ask")
        .body(Body::from(json!({"message": "hi"}).to_string()))
        .unwrap();

    let (status, _) = send(app, request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_timeout_is_still_ok() {
    let app = app_with(MockCompletion::slow(Duration::from_millis(500)));
    let (status, body) = send(app, post("/ask", json!({"message": "hello"}).to_string())).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["reply"], FALLBACK_REPLY);
}

#[tokio::test]
async fn test_internal_failure_is_apology() {
    let app = app_with(MockCompletion::failing(AppError::Internal("bug".to_string())));
    let (status, body) = send(app, post("/ask", json!({"message": "hello"}).to_string())).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["reply"], "Internal error. Please try again.");
}

#[tokio::test]
async fn test_banner_and_health() {
    let app = app_with(MockCompletion::ok());
    let response = app
        .clone()
        .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let text = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&text[..], b"NeuroGen backend running.");

    let (status, body) = send(
        app,
        Request::builder().uri("/health").body(Body::empty()).unwrap(),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
    assert!(body["uptime"].as_f64().is_some());
    assert!(body["timestamp"].as_str().is_some());
}
