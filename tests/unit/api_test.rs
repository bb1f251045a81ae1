use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceExt;

use bot_detection_service::api;
use bot_detection_service::service::BotDetectionService;

use crate::test_utils::{classifier_with, FailingLookup, FixedLookup};

fn app_with(service: BotDetectionService) -> Router {
    api::router(service, Duration::from_secs(5))
}

fn offline_service() -> BotDetectionService {
    let classifier = classifier_with(Arc::new(FixedLookup("Comcast Cable")), Arc::new(FixedLookup("Canada")));
    BotDetectionService::new(Arc::new(classifier), Duration::from_secs(60))
}

fn detect_request(body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/api/detect_bot")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

async fn json_body(response: axum::response::Response) -> Value {
    let bytes = hyper::body::to_bytes(response.into_body()).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_detect_bot_returns_wire_schema() {
    let response = app_with(offline_service())
        .oneshot(detect_request(r#"{"user_agent":"Mozilla/5.0 Googlebot/2.1","ip":"8.8.8.8"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        json_body(response).await,
        json!({
            "is_bot": true,
            "country": "Canada",
            "details": {
                "bot_user_agent": true,
                "scraper_isp": false,
                "suspicious_traffic": false
            }
        })
    );
}

#[tokio::test]
async fn test_missing_fields_default_to_empty() {
    let response = app_with(offline_service())
        .oneshot(detect_request("{}"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["is_bot"], json!(false));
    assert_eq!(body["country"], json!("Unknown"));
}

#[tokio::test]
async fn test_malformed_body_is_a_client_error() {
    let response = app_with(offline_service())
        .oneshot(detect_request("{not json"))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(json_body(response).await["error"].is_string());
}

#[tokio::test]
async fn test_lookup_failures_never_produce_server_errors() {
    let classifier = classifier_with(Arc::new(FailingLookup), Arc::new(FailingLookup));
    let service = BotDetectionService::new(Arc::new(classifier), Duration::from_secs(60));

    let response = app_with(service)
        .oneshot(detect_request(r#"{"user_agent":"Mozilla/5.0","ip":"203.0.113.1"}"#))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_body(response).await;
    assert_eq!(body["details"]["scraper_isp"], json!(false));
    assert_eq!(body["country"], json!("Unknown"));
}

#[tokio::test]
async fn test_traffic_state_is_shared_across_requests() {
    let app = app_with(offline_service());

    for call in 1..=15 {
        let response = app
            .clone()
            .oneshot(detect_request(r#"{"user_agent":"normal-browser","ip":"1.2.3.4"}"#))
            .await
            .unwrap();
        let body = json_body(response).await;
        assert_eq!(body["details"]["suspicious_traffic"], json!(call > 10), "call {call}");
        assert_eq!(body["is_bot"], json!(call > 10), "call {call}");
    }
}

#[tokio::test]
async fn test_health() {
    let response = app_with(offline_service())
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_body(response).await, json!({ "status": "ok" }));
}
