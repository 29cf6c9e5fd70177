//! HTTP API layer with Axum routes and middleware.
//!
//! This crate provides:
//! - REST API routes for accounts, transactions, invoices, reports and settings
//! - Bearer token authentication middleware
//! - Request extractors that validate bodies
//! - The JSON response envelope and error mapping

pub mod error;
pub mod extractors;
pub mod middleware;
pub mod response;
pub mod routes;

use axum::Router;
use sea_orm::DatabaseConnection;
use std::sync::Arc;
use tally_core::storage::StorageService;
use tally_shared::JwtService;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use error::ApiError;
pub use response::ApiResponse;

/// Application state shared across handlers.
#[derive(Clone)]
pub struct AppState {
    /// Database connection pool.
    pub db: Arc<DatabaseConnection>,
    /// JWT service for token validation.
    pub jwt_service: Arc<JwtService>,
    /// Storage service for transaction attachments.
    pub storage: Arc<StorageService>,
}

/// Creates the main application router.
pub fn create_router(state: AppState) -> Router {
    Router::new()
        .nest("/api/v1", routes::api_routes_with_state(state.clone()))
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{
        body::Body,
        http::{Request, StatusCode, header},
    };
    use http_body_util::BodyExt;
    use tally_core::storage::{StorageConfig, StorageProvider};
    use tower::ServiceExt;
    use uuid::Uuid;

    const SECRET: &str = "router-test-secret-at-least-32-bytes!";

    fn test_state() -> AppState {
        let storage = StorageService::from_config(StorageConfig::new(StorageProvider::Memory))
            .expect("memory storage");
        AppState {
            db: Arc::new(DatabaseConnection::default()),
            jwt_service: Arc::new(JwtService::new(SECRET, 3600)),
            storage: Arc::new(storage),
        }
    }

    fn bearer(state: &AppState) -> String {
        let token = state
            .jwt_service
            .generate_access_token(Uuid::new_v4())
            .expect("token");
        format!("Bearer {token}")
    }

    async fn send(request: Request<Body>) -> (StatusCode, serde_json::Value) {
        let response = create_router(test_state()).oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[tokio::test]
    async fn test_health_is_public() {
        let (status, json) = send(
            Request::get("/api/v1/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["success"], true);
        assert_eq!(json["data"]["status"], "healthy");
    }

    #[tokio::test]
    async fn test_missing_token_is_unauthenticated() {
        let (status, json) = send(
            Request::get("/api/v1/transactions")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["success"], false);
        assert_eq!(json["error"], "UNAUTHENTICATED");
    }

    #[tokio::test]
    async fn test_foreign_token_is_unauthenticated() {
        let other = JwtService::new("some-other-secret-of-sufficient-size", 3600);
        let token = other.generate_access_token(Uuid::new_v4()).unwrap();

        let (status, json) = send(
            Request::get("/api/v1/reports/trial-balance")
                .header(header::AUTHORIZATION, format!("Bearer {token}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["message"], "Authentication failed: Invalid or malformed token");
    }

    #[tokio::test]
    async fn test_invalid_body_is_rejected_before_database() {
        let state = test_state();
        let auth = bearer(&state);
        let body = serde_json::json!({
            "reference": "",
            "transaction_date": "2026-03-01",
            "type": "journal",
            "amount": "100.00",
            "items": []
        });

        let response = create_router(state)
            .oneshot(
                Request::post("/api/v1/transactions")
                    .header(header::AUTHORIZATION, auth)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_zero_amount_is_422_not_500() {
        let state = test_state();
        let auth = bearer(&state);
        let account = Uuid::new_v4();
        let body = serde_json::json!({
            "reference": "TXN-ZERO",
            "transaction_date": "2026-03-01",
            "type": "journal",
            "amount": "0",
            "items": [
                {"account_id": account, "type": "debit", "amount": "0"},
                {"account_id": account, "type": "credit", "amount": "0"}
            ]
        });

        let response = create_router(state)
            .oneshot(
                Request::post("/api/v1/transactions")
                    .header(header::AUTHORIZATION, auth)
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from(body.to_string()))
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
        assert_eq!(json["error"], "VALIDATION_ERROR");
    }

    #[tokio::test]
    async fn test_period_routes_require_auth() {
        let (status, json) = send(
            Request::post(format!("/api/v1/periods/{}/close", Uuid::new_v4()))
                .body(Body::empty())
                .unwrap(),
        )
        .await;

        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(json["error"], "UNAUTHENTICATED");

        let (status, _) = send(
            Request::get("/api/v1/subsidiary-accounts")
                .body(Body::empty())
                .unwrap(),
        )
        .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
    }

    #[tokio::test]
    async fn test_database_fault_is_masked() {
        let state = test_state();
        let auth = bearer(&state);

        let response = create_router(state)
            .oneshot(
                Request::get("/api/v1/accounts")
                    .header(header::AUTHORIZATION, auth)
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["success"], false);
        assert_eq!(json["message"], "An internal error occurred");
    }
}
