//! TOOP Gateway API - HTTP surface
//!
//! Axum routes over the gateway components, the connector transport
//! adapter, and process setup shared by the binary and the tests.

pub mod config;
pub mod error;
pub mod openapi;
pub mod routes;
pub mod state;
pub mod telemetry;
pub mod transport;

pub use config::{ApiConfig, LogFormat};
pub use error::{ApiError, ApiResult, ErrorCode};
pub use openapi::ApiDoc;
pub use routes::create_api_router;
pub use state::AppState;
pub use transport::ConnectorTransport;
