//! Identifier types: correlation ids, participants and document types.

use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

// ============================================================================
// CORRELATION ID
// ============================================================================

/// Opaque identifier linking an outbound request to its eventual reply.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(transparent)]
pub struct CorrelationId(String);

impl CorrelationId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    /// Generate a fresh, timestamp-sortable id (UUIDv7).
    pub fn generate() -> Self {
        Self(Uuid::now_v7().to_string())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for CorrelationId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for CorrelationId {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for CorrelationId {
    fn from(value: String) -> Self {
        Self(value)
    }
}

// ============================================================================
// PARTICIPANTS
// ============================================================================

/// Identifier scheme used by every participant in the directory.
pub const PARTICIPANT_SCHEME: &str = "iso6523-actorid-upis";

/// A participant (sender or receiver endpoint) in the exchange network.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ParticipantId {
    pub scheme: String,
    pub value: String,
}

impl ParticipantId {
    /// Participant in the default `iso6523-actorid-upis` scheme.
    pub fn new(value: impl Into<String>) -> Self {
        Self {
            scheme: PARTICIPANT_SCHEME.to_string(),
            value: value.into(),
        }
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.scheme, self.value)
    }
}

// ============================================================================
// DOCUMENT TYPES
// ============================================================================

pub const DOCUMENT_TYPE_SCHEME: &str = "toop-doctypeid-qns";

const REGISTERED_ORGANIZATION_REQUEST: &str =
    "RegisteredOrganization::REGISTERED_ORGANIZATION_TYPE::CONCEPT##CCCEV::toop-edm:v2.1";
const EPROCUREMENT_REQUEST: &str =
    "PAYMENT_OF_TAXES::0e639e11-be3d-4f0e-9212-e7960b7177ab::UNSTRUCTURED::toop-edm:v2.1";
const QUERY_RESPONSE: &str = "QueryResponse::toop-edm:v2.1";

/// Scheme and value of the data query process all messages travel under.
pub const DATA_QUERY_PROCESS: (&str, &str) = ("toop-procid-agreement", "urn:eu.toop.process.dataquery");

/// Process document requests and their responses travel under.
pub const DOCUMENT_QUERY_PROCESS: (&str, &str) =
    ("toop-procid-agreement", "urn:eu.toop.process.documentquery");

/// Document type identifier; equal only when both scheme and value match.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DocumentType {
    pub scheme: String,
    pub value: String,
}

impl DocumentType {
    pub fn new(scheme: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            scheme: scheme.into(),
            value: value.into(),
        }
    }

    /// Registered-organization (GBM) concept request.
    pub fn registered_organization_request() -> Self {
        Self::new(DOCUMENT_TYPE_SCHEME, REGISTERED_ORGANIZATION_REQUEST)
    }

    /// eProcurement document request.
    pub fn eprocurement_request() -> Self {
        Self::new(DOCUMENT_TYPE_SCHEME, EPROCUREMENT_REQUEST)
    }

    /// Generic query response.
    pub fn query_response() -> Self {
        Self::new(DOCUMENT_TYPE_SCHEME, QUERY_RESPONSE)
    }

    /// `scheme::value`, the form used in directory queries and dispatch lookups.
    pub fn key(&self) -> String {
        format!("{}::{}", self.scheme, self.value)
    }
}

impl fmt::Display for DocumentType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}", self.scheme, self.value)
    }
}
