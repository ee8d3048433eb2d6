//! API Configuration Module
//!
//! Process-level settings for the HTTP server. Gateway behavior (TTLs,
//! capacities, timeouts, upstream URLs) lives in [`toop_core::GatewayConfig`].

use std::net::SocketAddr;

use crate::error::{ApiError, ApiResult};

pub const DEFAULT_BIND_HOST: &str = "0.0.0.0";
pub const DEFAULT_PORT: u16 = 8080;
pub const DEFAULT_CONNECTOR_URL: &str = "http://localhost:8090";

/// Output format of the tracing subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    #[default]
    Plain,
    Json,
}

impl LogFormat {
    fn parse(value: &str) -> Self {
        if value.eq_ignore_ascii_case("json") {
            LogFormat::Json
        } else {
            LogFormat::Plain
        }
    }
}

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_host: String,
    /// Kept as text so an invalid value is reported at bind time.
    pub port: String,
    /// Base URL of the connector that carries messages to other gateways.
    pub connector_url: String,
    pub log_format: LogFormat,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_host: DEFAULT_BIND_HOST.to_string(),
            port: DEFAULT_PORT.to_string(),
            connector_url: DEFAULT_CONNECTOR_URL.to_string(),
            log_format: LogFormat::Plain,
        }
    }
}

impl ApiConfig {
    /// Create ApiConfig from environment variables.
    ///
    /// Environment variables:
    /// - `TOOP_API_BIND`: bind host (default: 0.0.0.0)
    /// - `PORT` or `TOOP_API_PORT`: listen port (default: 8080)
    /// - `TOOP_CONNECTOR_URL`: connector base URL (default: http://localhost:8090)
    /// - `TOOP_LOG_FORMAT`: "json" for JSON log lines (default: plain)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            bind_host: std::env::var("TOOP_API_BIND").unwrap_or(defaults.bind_host),
            port: std::env::var("PORT")
                .ok()
                .or_else(|| std::env::var("TOOP_API_PORT").ok())
                .unwrap_or(defaults.port),
            connector_url: std::env::var("TOOP_CONNECTOR_URL")
                .ok()
                .filter(|url| !url.trim().is_empty())
                .unwrap_or(defaults.connector_url),
            log_format: std::env::var("TOOP_LOG_FORMAT")
                .map(|value| LogFormat::parse(&value))
                .unwrap_or_default(),
        }
    }

    pub fn bind_addr(&self) -> ApiResult<SocketAddr> {
        let port = self
            .port
            .parse::<u16>()
            .map_err(|_| ApiError::invalid_input(format!("Invalid port value: {}", self.port)))?;

        let addr = format!("{}:{}", self.bind_host, port);
        addr.parse::<SocketAddr>()
            .map_err(|e| ApiError::invalid_input(format!("Invalid bind address {}: {}", addr, e)))
    }
}
