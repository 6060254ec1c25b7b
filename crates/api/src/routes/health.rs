//! Health check endpoint handlers.

use axum::{extract::State, Extension, Json};
use persistence::db::ping;
use serde::Serialize;
use std::time::Instant;

use crate::app::AppState;
use crate::error::ApiError;
use crate::middleware::SharedRequestDb;

/// Health check response.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
    pub database: DatabaseHealth,
    pub email: EmailHealth,
}

/// Database health status.
#[derive(Debug, Serialize)]
#[serde(rename_all = "snake_case")]
pub struct DatabaseHealth {
    pub connected: bool,
    pub latency_ms: u64,
}

/// Email service status.
#[derive(Debug, Serialize)]
pub struct EmailHealth {
    pub provider: String,
}

/// Simple status response for liveness and readiness checks.
#[derive(Debug, Serialize)]
pub struct StatusResponse {
    pub status: String,
}

fn database_unavailable() -> ApiError {
    ApiError::ServiceUnavailable("Database unavailable".into())
}

/// Runs `SELECT 1` on the request connection, opening it if needed.
async fn database_reachable(db: &SharedRequestDb) -> bool {
    let mut db = db.lock().await;
    match db.get_connection().await {
        Ok(connection) => ping(connection).await.is_ok(),
        Err(e) => {
            tracing::warn!(error = %e, "Database unreachable");
            false
        }
    }
}

/// Full health check endpoint.
///
/// Returns 503 when the database cannot be reached.
pub async fn health_check(
    State(state): State<AppState>,
    Extension(db): Extension<SharedRequestDb>,
) -> Result<Json<HealthResponse>, ApiError> {
    let start = Instant::now();
    if !database_reachable(&db).await {
        return Err(database_unavailable());
    }
    let latency_ms = start.elapsed().as_millis() as u64;

    Ok(Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        database: DatabaseHealth {
            connected: true,
            latency_ms,
        },
        email: EmailHealth {
            provider: state.email.provider().to_string(),
        },
    }))
}

/// Liveness endpoint.
///
/// Returns 200 OK if the process is running.
pub async fn live() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "alive".to_string(),
    })
}

/// Readiness endpoint.
///
/// Returns 200 OK if the service can accept traffic (database connected).
pub async fn ready(
    Extension(db): Extension<SharedRequestDb>,
) -> Result<Json<StatusResponse>, ApiError> {
    if !database_reachable(&db).await {
        return Err(database_unavailable());
    }
    Ok(Json(StatusResponse {
        status: "ready".to_string(),
    }))
}
