//! Liveness check; the only route outside the auth layer.

use axum::{Router, routing::get};
use serde::Serialize;

use crate::{AppState, response::ApiResponse};

/// Health check payload.
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    /// Always `healthy` while the process serves requests.
    pub status: &'static str,
    /// Crate version.
    pub version: &'static str,
}

async fn health_check() -> ApiResponse<HealthStatus> {
    ApiResponse::ok(HealthStatus {
        status: "healthy",
        version: env!("CARGO_PKG_VERSION"),
    })
}

/// Creates health check routes.
pub fn routes() -> Router<AppState> {
    Router::new().route("/health", get(health_check))
}
