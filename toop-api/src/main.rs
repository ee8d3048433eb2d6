//! TOOP Gateway Server Entry Point
//!
//! Loads configuration, wires the gateway components, warms the reference
//! data and starts the Axum HTTP server.

use axum::Router;
use toop_api::telemetry::init_tracing;
use toop_api::{create_api_router, ApiConfig, ApiError, ApiResult, AppState};
use toop_core::GatewayConfig;

#[tokio::main]
async fn main() -> ApiResult<()> {
    let api_config = ApiConfig::from_env();
    init_tracing(api_config.log_format)?;

    let gateway_config = GatewayConfig::from_env();
    let state = AppState::from_config(&gateway_config, &api_config)?;

    // A failed warm-up is not fatal; /ready reports it and lookups retry
    // once the TTL window has passed.
    let outcome = state.countries.refresh(true).await;
    tracing::info!(?outcome, "initial reference data load");

    let app: Router = create_api_router(state);

    let addr = api_config.bind_addr()?;
    tracing::info!(%addr, "Starting TOOP gateway");

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .map_err(|e| ApiError::internal_error(format!("Failed to bind {}: {}", addr, e)))?;

    let server = axum::serve(listener, app);
    tokio::select! {
        result = server => {
            result.map_err(|e| ApiError::internal_error(format!("Server error: {}", e)))?;
        }
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("Shutdown signal received");
        }
    }

    Ok(())
}
