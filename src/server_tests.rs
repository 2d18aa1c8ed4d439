use std::path::PathBuf;
use std::sync::Arc;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, StatusCode, header};
use tower::ServiceExt;

use super::create_router;
use crate::config::ServiceConfig;
use crate::coordinator::RequestCoordinator;

/// Router whose coordinator can never launch a browser; requests that get
/// past validation fail fast with a launch error.
fn test_router() -> Router {
    let config = ServiceConfig {
        chrome_path: PathBuf::from("/definitely/not/chrome"),
        ..ServiceConfig::default()
    };
    create_router(Arc::new(RequestCoordinator::new(config)))
}

async fn body_string(body: Body) -> String {
    let bytes = to_bytes(body, usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

#[tokio::test]
async fn test_missing_url_returns_400_json() {
    let response = test_router()
        .oneshot(Request::get("/").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body: serde_json::Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert_eq!(body["error"], "URL parameter is required");
}

#[tokio::test]
async fn test_empty_url_returns_400() {
    let response = test_router()
        .oneshot(Request::get("/?url=").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_path_returns_404_plain_text() {
    let response = test_router()
        .oneshot(Request::get("/render").body(Body::empty()).unwrap())
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(body_string(response.into_body()).await, "Not found\n");
}

#[tokio::test]
async fn test_non_get_method_returns_404() {
    let response = test_router()
        .oneshot(
            Request::post("/?url=https%3A%2F%2Fexample.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_internal_failure_returns_500_json_error() {
    let response = test_router()
        .oneshot(
            Request::get("/?url=https%3A%2F%2Fexample.com")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(
        response.headers()[header::CONTENT_TYPE],
        "application/json"
    );
    let body: serde_json::Value =
        serde_json::from_str(&body_string(response.into_body()).await).unwrap();
    assert!(
        body["error"]
            .as_str()
            .unwrap()
            .contains("Browser initialization failed")
    );
}
