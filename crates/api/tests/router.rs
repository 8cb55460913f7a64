//! Router-level tests that exercise routing and the auth gate without a
//! database.

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode, header::AUTHORIZATION};
use http_body_util::BodyExt;
use tower::ServiceExt;

use redress_api::{AppState, create_router};
use redress_core::lifecycle::LifecycleEngine;
use redress_shared::{JwtConfig, JwtService};

fn test_state() -> AppState {
    AppState {
        db: Arc::new(sea_orm::SqlxPostgresConnector::from_sqlx_postgres_pool(
            sqlx::postgres::PgPoolOptions::new()
                .connect_lazy("postgres://unreachable.invalid/none")
                .unwrap(),
        )),
        jwt_service: Arc::new(JwtService::new(JwtConfig {
            secret: "test-secret".to_string(),
            token_expires_secs: 3600,
        })),
        engine: LifecycleEngine::default(),
    }
}

#[tokio::test]
async fn health_endpoint_is_public() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["status"], "healthy");
}

#[tokio::test]
async fn protected_routes_require_token() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/complaints")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "missing_token");
}

#[tokio::test]
async fn active_tenant_listing_skips_the_auth_gate() {
    let app = create_router(test_state());

    // No token: the request must reach the handler instead of the gate.
    // Without a database it fails later, but never with 401.
    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/tenants/active")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_ne!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn malformed_token_is_rejected() {
    let app = create_router(test_state());

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/complaints")
                .header(AUTHORIZATION, "Bearer not-a-real-token")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let body = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&body).unwrap();
    assert_eq!(json["error"], "invalid_token");
}

#[tokio::test]
async fn token_from_another_secret_is_rejected() {
    let app = create_router(test_state());

    let other = JwtService::new(JwtConfig {
        secret: "different-secret".to_string(),
        token_expires_secs: 3600,
    });
    let token = other
        .generate_token(uuid::Uuid::new_v4(), "consumer", None)
        .unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/api/v1/complaints")
                .header(AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}
