//! End-to-end tests for the webhook endpoint and the EventHub facade.

use std::{
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    time::Duration,
};

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
};
use fanout_api::{create_router, AppState, EventHub};
use fanout_core::CallbackRegistry;
use fanout_sns::{DispatcherConfig, NotificationDispatcher, MESSAGE_TYPE_HEADER};
use tower::ServiceExt;

fn test_router(registry: Arc<CallbackRegistry>) -> axum::Router {
    let router = Arc::new(fanout_core::EventRouter::new(registry));
    let dispatcher = NotificationDispatcher::new(router, DispatcherConfig {
        verify_signatures: false,
        ..DispatcherConfig::default()
    })
    .expect("dispatcher builds");

    create_router(AppState { dispatcher: Arc::new(dispatcher) }, Duration::from_secs(5))
}

async fn body_json(response: axum::response::Response) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.expect("body reads");
    serde_json::from_slice(&bytes).expect("body is JSON")
}

#[tokio::test]
async fn notification_post_routes_to_registered_callback() {
    let registry = Arc::new(CallbackRegistry::new());

    let invocations = Arc::new(AtomicUsize::new(0));
    let sources = Arc::new(Mutex::new(Vec::new()));
    let counter = invocations.clone();
    let seen = sources.clone();
    registry.add_event_fn("X", "handler", move |_, source| {
        counter.fetch_add(1, Ordering::SeqCst);
        seen.lock().unwrap().push(source.to_string());
        Ok(())
    });

    let app = test_router(registry);

    let body = serde_json::json!({
        "Type": "Notification",
        "MessageId": "165545c9-2a5c-472c-8df2-7ff2be2b3b1b",
        "TopicArn": "arn:aws:sns:us-east-1:123456789012:events",
        "Message": "{\"event\":\"X\"}",
        "Timestamp": "2012-04-26T20:45:04.751Z",
    });

    let request = Request::builder()
        .method("POST")
        .uri("/events/sns")
        .header("content-type", "application/json")
        .header(MESSAGE_TYPE_HEADER, "Notification")
        .body(Body::from(body.to_string()))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("request completes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await, serde_json::json!({}));
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(*sources.lock().unwrap(), vec!["sns"]);
}

#[tokio::test]
async fn message_type_header_is_case_insensitive_by_name() {
    let registry = Arc::new(CallbackRegistry::new());
    let invocations = Arc::new(AtomicUsize::new(0));
    let counter = invocations.clone();
    registry.add_event_fn("X", "handler", move |_, _| {
        counter.fetch_add(1, Ordering::SeqCst);
        Ok(())
    });

    let app = test_router(registry);

    let request = Request::builder()
        .method("POST")
        .uri("/events/sns")
        .header("X-Amz-Sns-Message-Type", "Notification")
        .body(Body::from(r#"{"Type":"Notification","Message":"{\"event\":\"X\"}"}"#))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("request completes");

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(invocations.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn malformed_body_is_a_client_error() {
    let app = test_router(Arc::new(CallbackRegistry::new()));

    let request = Request::builder()
        .method("POST")
        .uri("/events/sns")
        .header(MESSAGE_TYPE_HEADER, "Notification")
        .body(Body::from("not json at all"))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("request completes");

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert!(body["error"].is_string());
}

#[tokio::test]
async fn unhandled_message_type_is_a_server_error() {
    let app = test_router(Arc::new(CallbackRegistry::new()));

    let request = Request::builder()
        .method("POST")
        .uri("/events/sns")
        .header(MESSAGE_TYPE_HEADER, "MysteryType")
        .body(Body::from(r#"{"Type":"MysteryType"}"#))
        .expect("request builds");

    let response = app.oneshot(request).await.expect("request completes");

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert_eq!(body["error"], "failed to handle event");
}

#[tokio::test]
async fn responses_carry_a_request_id() {
    let app = test_router(Arc::new(CallbackRegistry::new()));

    let request =
        Request::builder().uri("/health").body(Body::empty()).expect("request builds");
    let response = app.oneshot(request).await.expect("request completes");

    assert_eq!(response.status(), StatusCode::OK);
    assert!(response.headers().contains_key("X-Request-Id"));
}

#[tokio::test]
async fn health_endpoints_respond() {
    for uri in ["/health", "/ready", "/live"] {
        let app = test_router(Arc::new(CallbackRegistry::new()));
        let request = Request::builder().uri(uri).body(Body::empty()).expect("request builds");
        let response = app.oneshot(request).await.expect("request completes");
        assert_eq!(response.status(), StatusCode::OK, "{uri} should be OK");
    }
}

#[tokio::test]
async fn hub_send_event_routes_with_local_source() {
    let invocations = Arc::new(AtomicUsize::new(0));
    let sources = Arc::new(Mutex::new(Vec::new()));

    let counter = invocations.clone();
    let seen = sources.clone();
    let hub = EventHub::new("test-app").add_event_fn(
        "ServerCreated",
        "create",
        move |payload, source| {
            counter.fetch_add(1, Ordering::SeqCst);
            assert_eq!(payload["data"]["server_id"], "x");
            seen.lock().unwrap().push(source.to_string());
            Ok(())
        },
    );

    hub.send_event(r#"{"event":"ServerCreated","data":{"server_id":"x"}}"#)
        .await
        .expect("send succeeds");

    assert_eq!(invocations.load(Ordering::SeqCst), 1);
    assert_eq!(*sources.lock().unwrap(), vec!["local"]);
}

#[tokio::test]
async fn hub_remove_event_requires_existing_bucket() {
    let hub = EventHub::new("test-app").add_event_fn("Known", "cb", |_, _| Ok(()));

    assert!(hub.remove_event("Known", "cb").is_ok());
    assert!(hub.remove_event("Unknown", "cb").is_err());
}
