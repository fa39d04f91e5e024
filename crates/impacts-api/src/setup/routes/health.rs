//! Health check handlers and response types.

use crate::state::AppState;
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;
use std::time::Duration;

const CHECK_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(serde::Serialize)]
pub(super) struct HealthCheckResponse {
    pub status: String,
    pub storage: String,
    pub database: String,
    pub version: &'static str,
}

/// Ping the database, or report the in-memory backend as always up.
async fn database_status(state: &AppState) -> Result<&'static str, String> {
    let Some(pool) = &state.pool else {
        return Ok("not_configured");
    };
    match tokio::time::timeout(CHECK_TIMEOUT, sqlx::query("SELECT 1").execute(pool)).await {
        Ok(Ok(_)) => Ok("healthy"),
        Ok(Err(e)) => {
            tracing::error!(error = %e, "Database health check failed");
            Err(format!("unhealthy: {}", e))
        }
        Err(_) => {
            tracing::error!("Database health check timed out");
            Err("timeout".to_string())
        }
    }
}

/// Liveness probe - process is running.
pub async fn liveness_check() -> impl IntoResponse {
    (
        StatusCode::OK,
        Json(serde_json::json!({ "status": "alive" })),
    )
}

/// Readiness probe - storage backend reachable.
pub async fn readiness_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    match database_status(&state).await {
        Ok(database) => (
            StatusCode::OK,
            Json(serde_json::json!({ "status": "ready", "database": database })),
        ),
        Err(database) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(serde_json::json!({ "status": "not_ready", "database": database })),
        ),
    }
}

pub async fn health_check(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let storage = state.config.storage_backend().to_string();
    let (status_code, status, database) = match database_status(&state).await {
        Ok(database) => (StatusCode::OK, "healthy", database.to_string()),
        Err(database) => (StatusCode::SERVICE_UNAVAILABLE, "unhealthy", database),
    };
    (
        status_code,
        Json(HealthCheckResponse {
            status: status.to_string(),
            storage,
            database,
            version: env!("CARGO_PKG_VERSION"),
        }),
    )
}
