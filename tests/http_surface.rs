use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use printshop_api::{
    adapters::{blob::LocalBlobStore, identity::InMemoryIdentityProvider},
    app::build_router,
    config::AppConfig,
    state::AppState,
};
use sea_orm::DatabaseConnection;
use serde_json::Value;
use tower::ServiceExt;

// No database behind it: enough for routing, auth header checks and readiness failures.
async fn app(storage: &std::path::Path) -> Router {
    let config = AppConfig {
        database_url: "postgres://unused".into(),
        host: "127.0.0.1".into(),
        port: 0,
        jwt_secret: "surface-secret".into(),
        storage_base_path: storage.to_path_buf(),
        price_per_page: 10,
        currency: "EUR".into(),
        pickup_code_max_attempts: 10,
    };
    let state = AppState::new(
        DatabaseConnection::Disconnected,
        config,
        Arc::new(InMemoryIdentityProvider::new()),
        Arc::new(LocalBlobStore::new(storage).await.expect("blob store")),
    );
    build_router(state)
}

async fn send(request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let storage = tempfile::tempdir().expect("tempdir");
    let response = app(storage.path())
        .await
        .oneshot(request)
        .await
        .expect("router is infallible");
    let status = response.status();
    let request_id = response
        .headers()
        .get("x-request-id")
        .and_then(|value| value.to_str().ok())
        .map(str::to_owned);
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .expect("body");
    let json = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, request_id, json)
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).expect("request")
}

#[tokio::test]
async fn liveness_is_served_with_a_request_id() {
    let (status, request_id, body) = send(get("/health")).await;

    assert_eq!(status, StatusCode::OK);
    assert!(request_id.is_some_and(|id| !id.is_empty()));
    assert_eq!(body["data"]["status"], "ok");
}

#[tokio::test]
async fn caller_request_id_is_propagated() {
    let request = Request::builder()
        .uri("/health")
        .header("x-request-id", "abc-123")
        .body(Body::empty())
        .expect("request");

    let (_, request_id, _) = send(request).await;
    assert_eq!(request_id.as_deref(), Some("abc-123"));
}

#[tokio::test]
async fn readiness_fails_without_database() {
    let (status, _, body) = send(get("/health/ready")).await;

    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(body["message"], "Not ready");
    assert_eq!(body["data"]["status"], "database unreachable");
}

#[tokio::test]
async fn unknown_routes_get_a_json_404() {
    let (status, _, body) = send(get("/no/such/route")).await;

    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["data"]["path"], "/no/such/route");
}

#[tokio::test]
async fn protected_routes_reject_missing_or_bad_tokens() {
    let (status, _, _) = send(get("/api/users/me")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let request = Request::builder()
        .uri("/api/orders/00000000-0000-0000-0000-000000000000")
        .header(header::AUTHORIZATION, "Bearer not-a-jwt")
        .body(Body::empty())
        .expect("request");
    let (status, _, body) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["data"]["kind"], "INVALID_ARGUMENT");
    assert!(
        body["message"]
            .as_str()
            .is_some_and(|msg| msg.contains("Invalid or expired token"))
    );

    let request = Request::builder()
        .uri("/api/users/me")
        .header(header::AUTHORIZATION, "Basic Zm9vOmJhcg==")
        .body(Body::empty())
        .expect("request");
    let (status, _, _) = send(request).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn status_filtered_center_listing_requires_a_token() {
    let (status, _, _) = send(get("/api/admin/centers?status=pending")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _, _) = send(get("/api/admin/users/someone")).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}
