use std::time::Duration;

use reqwest::Client;
use toop_core::ConfigError;

/// Shared reqwest client with the configured request timeout.
pub fn build_http_client(timeout: Duration) -> Result<Client, ConfigError> {
    Client::builder()
        .timeout(timeout)
        .user_agent(concat!("toop-gateway/", env!("CARGO_PKG_VERSION")))
        .build()
        .map_err(|e| ConfigError::InvalidValue {
            field: "http_timeout".to_string(),
            value: format!("{:?}", timeout),
            reason: format!("Failed to build HTTP client: {}", e),
        })
}
