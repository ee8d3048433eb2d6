//! Error Types for the Gateway API
//!
//! This module defines error handling for the HTTP layer:
//! - ApiError struct for structured error responses
//! - ErrorCode enum for categorizing errors
//! - IntoResponse implementation for Axum HTTP responses
//!
//! All errors are serialized as JSON with appropriate HTTP status codes.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};
use std::fmt;
use toop_core::{ConfigError, GatewayError, LookupStatus, TransportError};

// ============================================================================
// ERROR CODE ENUM
// ============================================================================

/// Error codes for API responses.
///
/// Each error code maps to a specific HTTP status code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ErrorCode {
    // ========================================================================
    // Validation Errors (400)
    // ========================================================================
    /// Request contains invalid input data
    InvalidInput,

    /// Field format is incorrect
    InvalidFormat,

    // ========================================================================
    // Not Found Errors (404)
    // ========================================================================
    /// Requested entity does not exist
    EntityNotFound,

    /// No reference data for the requested country
    CountryNotFound,

    // ========================================================================
    // Server Errors (500, 503, 504)
    // ========================================================================
    /// Internal server error
    InternalError,

    /// A dependency of the gateway is unavailable
    ServiceUnavailable,

    /// No reply arrived in time
    Timeout,
}

impl ErrorCode {
    /// Get the HTTP status code for this error code.
    pub fn status_code(&self) -> StatusCode {
        match self {
            ErrorCode::InvalidInput | ErrorCode::InvalidFormat => StatusCode::BAD_REQUEST,

            ErrorCode::EntityNotFound | ErrorCode::CountryNotFound => StatusCode::NOT_FOUND,

            ErrorCode::ServiceUnavailable => StatusCode::SERVICE_UNAVAILABLE,

            ErrorCode::Timeout => StatusCode::GATEWAY_TIMEOUT,

            ErrorCode::InternalError => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Get a default message for this error code.
    pub fn default_message(&self) -> &'static str {
        match self {
            ErrorCode::InvalidInput => "Invalid input data",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::EntityNotFound => "Entity not found",
            ErrorCode::CountryNotFound => "Country not found",
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::ServiceUnavailable => "Service temporarily unavailable",
            ErrorCode::Timeout => "Request timed out",
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:?}", self)
    }
}

impl From<LookupStatus> for ErrorCode {
    fn from(status: LookupStatus) -> Self {
        match status {
            LookupStatus::Ok => ErrorCode::InternalError,
            LookupStatus::NotFound => ErrorCode::EntityNotFound,
            LookupStatus::ServiceUnavailable => ErrorCode::ServiceUnavailable,
            LookupStatus::GatewayTimeout => ErrorCode::Timeout,
        }
    }
}

// ============================================================================
// API ERROR STRUCT
// ============================================================================

/// Structured error response for API operations.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ApiError {
    /// Error code categorizing the error
    pub code: ErrorCode,

    /// Human-readable error message
    pub message: String,

    /// Optional additional details
    #[serde(skip_serializing_if = "Option::is_none")]
    #[cfg_attr(feature = "openapi", schema(value_type = Option<Object>))]
    pub details: Option<serde_json::Value>,
}

impl ApiError {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Self {
            code,
            message: message.into(),
            details: None,
        }
    }

    pub fn from_code(code: ErrorCode) -> Self {
        Self {
            code,
            message: code.default_message().to_string(),
            details: None,
        }
    }

    pub fn with_details(mut self, details: serde_json::Value) -> Self {
        self.details = Some(details);
        self
    }

    pub fn status_code(&self) -> StatusCode {
        self.code.status_code()
    }

    // ========================================================================
    // Convenience constructors for common errors
    // ========================================================================

    pub fn invalid_input(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InvalidInput, message)
    }

    pub fn invalid_format(field: &str, expected: &str) -> Self {
        Self::new(
            ErrorCode::InvalidFormat,
            format!("Field '{}' has invalid format, expected {}", field, expected),
        )
        .with_details(serde_json::json!({ "field": field, "expected": expected }))
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::EntityNotFound, message)
    }

    pub fn country_not_found(code: impl fmt::Display) -> Self {
        Self::new(
            ErrorCode::CountryNotFound,
            format!("Could not find code \"{}\" in CountryCode cache", code),
        )
    }

    pub fn internal_error(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::InternalError, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::ServiceUnavailable, message)
    }

    pub fn timeout(message: impl Into<String>) -> Self {
        Self::new(ErrorCode::Timeout, message)
    }

    /// Error for a failed lookup; the message falls back to the code default.
    pub fn from_lookup(status: LookupStatus, message: Option<String>) -> Self {
        let code = ErrorCode::from(status);
        match message {
            Some(message) => Self::new(code, message),
            None => Self::from_code(code),
        }
    }
}

impl fmt::Display for ApiError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.code, self.message)
    }
}

impl std::error::Error for ApiError {}

/// Result type for API operations.
pub type ApiResult<T> = Result<T, ApiError>;

// ============================================================================
// AXUM INTEGRATION
// ============================================================================

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        let body = Json(self);
        (status, body).into_response()
    }
}

// ============================================================================
// CONVERSIONS FROM GATEWAY ERRORS
// ============================================================================

impl From<GatewayError> for ApiError {
    fn from(err: GatewayError) -> Self {
        match err {
            GatewayError::ReferenceDataMissing { code } => ApiError::country_not_found(code),
            GatewayError::Transport(e) => e.into(),
            GatewayError::Config(e) => e.into(),
            GatewayError::Correlation(e) => ApiError::service_unavailable(e.to_string()),
            GatewayError::Upstream(e) => {
                tracing::error!(error = %e, "upstream error");
                ApiError::service_unavailable(e.to_string())
            }
        }
    }
}

impl From<TransportError> for ApiError {
    fn from(err: TransportError) -> Self {
        ApiError::service_unavailable(err.to_string())
    }
}

impl From<ConfigError> for ApiError {
    fn from(err: ConfigError) -> Self {
        ApiError::internal_error(format!("Invalid configuration: {}", err))
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lookup_status_mapping() {
        assert_eq!(
            ErrorCode::from(LookupStatus::NotFound).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            ErrorCode::from(LookupStatus::ServiceUnavailable).status_code(),
            StatusCode::SERVICE_UNAVAILABLE
        );
        assert_eq!(
            ErrorCode::from(LookupStatus::GatewayTimeout).status_code(),
            StatusCode::GATEWAY_TIMEOUT
        );
    }

    #[test]
    fn test_from_lookup_uses_default_message() {
        let err = ApiError::from_lookup(LookupStatus::GatewayTimeout, None);
        assert_eq!(err.message, "Request timed out");

        let err = ApiError::from_lookup(LookupStatus::NotFound, Some("gone".to_string()));
        assert_eq!(err.message, "gone");
        assert_eq!(err.code, ErrorCode::EntityNotFound);
    }

    #[test]
    fn test_reference_data_missing_is_not_found() {
        let err: ApiError = GatewayError::ReferenceDataMissing {
            code: "FI".to_string(),
        }
        .into();
        assert_eq!(err.status_code(), StatusCode::NOT_FOUND);
        assert!(err.message.contains("\"FI\""));
    }

    #[test]
    fn test_error_serialization() {
        let err = ApiError::service_unavailable("connector down");
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["code"], "SERVICE_UNAVAILABLE");
        assert_eq!(json["message"], "connector down");
        assert!(json.get("details").is_none());
    }

    #[test]
    fn test_invalid_format_carries_field_details() {
        let err = ApiError::invalid_format("birthdate", "YYYY-MM-DD");
        assert_eq!(err.status_code(), StatusCode::BAD_REQUEST);
        let json = serde_json::to_value(&err).unwrap();
        assert_eq!(json["details"]["field"], "birthdate");
        assert_eq!(json["details"]["expected"], "YYYY-MM-DD");
    }
}
