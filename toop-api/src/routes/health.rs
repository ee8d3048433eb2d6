//! Health Check Endpoints
//!
//! - /ping - Simple liveness check
//! - /ready - Reference data availability check

use axum::{extract::State, http::StatusCode, response::IntoResponse, routing::get, Json, Router};
use serde::{Deserialize, Serialize};

use crate::state::AppState;

// ============================================================================
// TYPES
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ReadyResponse {
    pub status: HealthStatus,
    /// Records in the current reference data snapshot.
    pub country_codes: usize,
    /// Organizations held in the lookup cache.
    pub cached_organizations: usize,
    pub version: String,
    pub uptime_seconds: u64,
}

// ============================================================================
// HANDLERS
// ============================================================================

/// GET /ping - Simple pong response
#[utoipa::path(
    get,
    path = "/ping",
    tag = "Health",
    responses(
        (status = 200, description = "Service is responding", body = String),
    ),
)]
pub async fn ping() -> impl IntoResponse {
    (StatusCode::OK, "pong")
}

/// GET /ready - Ready once reference data has been loaded.
///
/// Triggers a refresh when the snapshot is stale, so a cold gateway becomes
/// ready on the first request that reaches a working directory.
#[utoipa::path(
    get,
    path = "/ready",
    tag = "Health",
    responses(
        (status = 200, description = "Reference data is loaded", body = ReadyResponse),
        (status = 503, description = "Reference data is not available", body = ReadyResponse),
    ),
)]
pub async fn readiness(State(state): State<AppState>) -> impl IntoResponse {
    state.countries.refresh(false).await;

    let snapshot = state.countries.cache().snapshot();
    let status = if snapshot.is_empty() {
        HealthStatus::Unhealthy
    } else {
        HealthStatus::Healthy
    };

    let response = ReadyResponse {
        status,
        country_codes: snapshot.len(),
        cached_organizations: state.organizations.len(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        uptime_seconds: state.start_time.elapsed().as_secs(),
    };

    let status_code = match status {
        HealthStatus::Healthy => StatusCode::OK,
        HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
    };
    (status_code, Json(response))
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/ping", get(ping))
        .route("/ready", get(readiness))
}
