/**
 * Health check endpoints
 */
use std::time::Instant;

use axum::{extract::State, http::StatusCode, response::Json};
use chrono::Utc;
use serde::Serialize;

use crate::api::state::AppState;

#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: String,
    pub version: String,
    pub store: StoreStatus,
    pub timestamp: String,
}

#[derive(Debug, Serialize)]
pub struct StoreStatus {
    pub connected: bool,
    pub latency_ms: Option<u64>,
}

/// Comprehensive health check: reports the backing store's reachability
/// alongside version/timestamp info.
pub async fn health_check(State(state): State<AppState>) -> Json<HealthStatus> {
    let start = Instant::now();
    let store = match state.coordinator.store_health_check().await {
        Ok(()) => StoreStatus {
            connected: true,
            latency_ms: Some(start.elapsed().as_millis() as u64),
        },
        Err(err) => {
            tracing::warn!(error = %err, "store health check failed");
            StoreStatus {
                connected: false,
                latency_ms: None,
            }
        }
    };

    let status = if store.connected { "healthy" } else { "degraded" };

    Json(HealthStatus {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        store,
        timestamp: Utc::now().to_rfc3339(),
    })
}

/// Simple readiness probe
pub async fn readiness() -> Result<&'static str, StatusCode> {
    Ok("ready")
}

/// Simple liveness probe
pub async fn liveness() -> Result<&'static str, StatusCode> {
    Ok("alive")
}
