//! Gateway configuration
//!
//! Loaded from `TOOP_*` environment variables with defaults suitable for the
//! acceptance environment. Every value can also be set with a `with_*` builder.

use crate::ConfigError;
use std::time::Duration;

/// Default reference data TTL (12 hours).
pub const DEFAULT_REFERENCE_TTL: Duration = Duration::from_secs(12 * 60 * 60);

/// Default number of organization records held in memory.
pub const DEFAULT_ORGANIZATION_CACHE_CAPACITY: usize = 1000;

/// Default wait for a correlated reply. Kept below common HTTP client timeouts
/// (30s) so callers get a clean gateway timeout instead of a dropped socket.
pub const DEFAULT_CORRELATION_TIMEOUT: Duration = Duration::from_secs(28);

/// Participant id this gateway is registered under in the directory.
pub const DEFAULT_OWN_PARTICIPANT_ID: &str = "9999:norway2";

pub const DEFAULT_DIRECTORY_URL: &str = "https://directory.acc.exchange.toop.eu";
pub const DEFAULT_REGISTRY_URL: &str = "https://data.brreg.no/enhetsregisteret/api";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayConfig {
    /// How long a reference data snapshot is considered fresh.
    pub reference_ttl: Duration,
    /// Maximum organization records kept by the per-key cache.
    pub organization_cache_capacity: usize,
    /// How long a lookup waits for its correlated reply.
    pub correlation_timeout: Duration,
    /// Participant id of this gateway.
    pub own_participant_id: String,
    /// Base URL of the reference directory search API.
    pub directory_base_url: String,
    /// Base URL of the business registry API.
    pub registry_base_url: String,
    /// Timeout for outbound HTTP calls to directory and registry.
    pub http_timeout: Duration,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            reference_ttl: DEFAULT_REFERENCE_TTL,
            organization_cache_capacity: DEFAULT_ORGANIZATION_CACHE_CAPACITY,
            correlation_timeout: DEFAULT_CORRELATION_TIMEOUT,
            own_participant_id: DEFAULT_OWN_PARTICIPANT_ID.to_string(),
            directory_base_url: DEFAULT_DIRECTORY_URL.to_string(),
            registry_base_url: DEFAULT_REGISTRY_URL.to_string(),
            http_timeout: Duration::from_secs(30),
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load configuration from environment variables.
    ///
    /// Unset or unparseable values fall back to their defaults; call
    /// [`GatewayConfig::validate`] to reject nonsensical combinations.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let reference_ttl = std::env::var("TOOP_REFERENCE_TTL_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.reference_ttl);

        let organization_cache_capacity = std::env::var("TOOP_ORG_CACHE_CAPACITY")
            .ok()
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.organization_cache_capacity);

        let correlation_timeout = std::env::var("TOOP_CORRELATION_TIMEOUT_MS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_millis)
            .unwrap_or(defaults.correlation_timeout);

        let own_participant_id = std::env::var("TOOP_OWN_PARTICIPANT_ID")
            .unwrap_or(defaults.own_participant_id);

        let directory_base_url = std::env::var("TOOP_DIRECTORY_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.directory_base_url);

        let registry_base_url = std::env::var("TOOP_REGISTRY_URL")
            .map(|s| s.trim_end_matches('/').to_string())
            .unwrap_or(defaults.registry_base_url);

        let http_timeout = std::env::var("TOOP_HTTP_TIMEOUT_SECS")
            .ok()
            .and_then(|s| s.parse().ok())
            .map(Duration::from_secs)
            .unwrap_or(defaults.http_timeout);

        Self {
            reference_ttl,
            organization_cache_capacity,
            correlation_timeout,
            own_participant_id,
            directory_base_url,
            registry_base_url,
            http_timeout,
        }
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.reference_ttl.is_zero() {
            return Err(invalid("reference_ttl", "0", "must be greater than zero"));
        }
        if self.organization_cache_capacity == 0 {
            return Err(invalid(
                "organization_cache_capacity",
                "0",
                "must be greater than zero",
            ));
        }
        if self.correlation_timeout.is_zero() {
            return Err(invalid("correlation_timeout", "0", "must be greater than zero"));
        }
        if self.own_participant_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired {
                field: "own_participant_id".to_string(),
            });
        }
        for (field, url) in [
            ("directory_base_url", &self.directory_base_url),
            ("registry_base_url", &self.registry_base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(invalid(field, url, "must be an http(s) URL"));
            }
        }
        Ok(())
    }

    pub fn with_reference_ttl(mut self, ttl: Duration) -> Self {
        self.reference_ttl = ttl;
        self
    }

    pub fn with_organization_cache_capacity(mut self, capacity: usize) -> Self {
        self.organization_cache_capacity = capacity;
        self
    }

    pub fn with_correlation_timeout(mut self, timeout: Duration) -> Self {
        self.correlation_timeout = timeout;
        self
    }

    pub fn with_own_participant_id(mut self, id: impl Into<String>) -> Self {
        self.own_participant_id = id.into();
        self
    }

    pub fn with_directory_base_url(mut self, url: impl Into<String>) -> Self {
        self.directory_base_url = url.into();
        self
    }

    pub fn with_registry_base_url(mut self, url: impl Into<String>) -> Self {
        self.registry_base_url = url.into();
        self
    }
}

fn invalid(field: &str, value: &str, reason: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: field.to_string(),
        value: value.to_string(),
        reason: reason.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = GatewayConfig::default();
        assert_eq!(config.reference_ttl, Duration::from_secs(43_200));
        assert_eq!(config.organization_cache_capacity, 1000);
        assert_eq!(config.correlation_timeout, Duration::from_secs(28));
        assert_eq!(config.own_participant_id, "9999:norway2");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_zero_capacity() {
        let config = GatewayConfig::default().with_organization_cache_capacity(0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "organization_cache_capacity"
        ));
    }

    #[test]
    fn test_validate_rejects_zero_timeout_and_bad_url() {
        let config = GatewayConfig::default().with_correlation_timeout(Duration::ZERO);
        assert!(config.validate().is_err());

        let config = GatewayConfig::default().with_registry_base_url("ftp://example");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::InvalidValue { ref field, .. }) if field == "registry_base_url"
        ));
    }

    #[test]
    fn test_validate_rejects_blank_participant() {
        let config = GatewayConfig::default().with_own_participant_id("  ");
        assert!(matches!(
            config.validate(),
            Err(ConfigError::MissingRequired { .. })
        ));
    }
}
