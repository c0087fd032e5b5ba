use axum::{extract::State, http::StatusCode, Json};
use serde::Serialize;
use std::sync::Arc;

use crate::app::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub services: ServiceHealth,
}

#[derive(Serialize)]
pub struct ServiceHealth {
    /// `postgres` or `memory`
    pub storage: String,
    pub database: String,
}

/// Health check endpoint - public
pub async fn health_check(
    State(state): State<Arc<AppState>>,
) -> (StatusCode, Json<HealthResponse>) {
    let result = state.store.health_check().await;
    if let Err(e) = &result {
        tracing::error!(error = ?e, "Storage health check failed");
    }

    let (status, status_code) = if result.is_ok() {
        ("healthy", StatusCode::OK)
    } else {
        ("unhealthy", StatusCode::SERVICE_UNAVAILABLE)
    };
    let storage = if state.settings.database_url.is_some() {
        "postgres"
    } else {
        "memory"
    };

    (
        status_code,
        Json(HealthResponse {
            status: status.to_string(),
            version: env!("CARGO_PKG_VERSION").to_string(),
            services: ServiceHealth {
                storage: storage.to_string(),
                database: if result.is_ok() { "ok" } else { "error" }.to_string(),
            },
        }),
    )
}
