//! Error types for gateway operations

use std::time::Duration;
use thiserror::Error;

/// Failures submitting a message to the message transport.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum TransportError {
    #[error("Message submission failed: {reason}")]
    SubmitFailed { reason: String },

    #[error("Message rejected by connector with status {status}: {reason}")]
    Rejected { status: u16, reason: String },
}

/// Request/reply correlation errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum CorrelationError {
    #[error("Correlation id already pending: {id}")]
    DuplicateId { id: String },

    #[error("No reply for {id} within {waited:?}")]
    Timeout { id: String, waited: Duration },
}

/// Failures talking to an upstream HTTP service (directory or registry).
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum UpstreamError {
    #[error("Request to {service} failed with status {status}: {message}")]
    RequestFailed {
        service: String,
        status: u16,
        message: String,
    },

    #[error("Invalid response from {service}: {reason}")]
    InvalidResponse { service: String, reason: String },
}

/// Configuration errors.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required configuration field: {field}")]
    MissingRequired { field: String },

    #[error("Invalid value for {field}: {value} - {reason}")]
    InvalidValue {
        field: String,
        value: String,
        reason: String,
    },
}

/// Master error type for all gateway errors.
#[derive(Debug, Clone, Error)]
pub enum GatewayError {
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    #[error("Correlation error: {0}")]
    Correlation(#[from] CorrelationError),

    #[error("Upstream error: {0}")]
    Upstream(#[from] UpstreamError),

    #[error("Config error: {0}")]
    Config(#[from] ConfigError),

    #[error("Reference data missing: {code}")]
    ReferenceDataMissing { code: String },
}

/// Result type alias for gateway operations.
pub type GatewayResult<T> = Result<T, GatewayError>;

/// Shorthand for an upstream request failure.
pub fn request_failed(
    service: impl Into<String>,
    status: u16,
    message: impl Into<String>,
) -> UpstreamError {
    UpstreamError::RequestFailed {
        service: service.into(),
        status,
        message: message.into(),
    }
}

/// Shorthand for an unparseable upstream response.
pub fn invalid_response(service: impl Into<String>, reason: impl Into<String>) -> UpstreamError {
    UpstreamError::InvalidResponse {
        service: service.into(),
        reason: reason.into(),
    }
}

// =============================================================================
// TESTS
// =============================================================================
