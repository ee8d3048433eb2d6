//! Message model exchanged with the transport.

use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use toop_core::{
    CorrelationId, DataSubject, DocumentType, Organization, ParticipantId, Timestamp,
    DATA_QUERY_PROCESS, DOCUMENT_QUERY_PROCESS,
};

/// Concepts requested from the receiving registry for a registered
/// organization query.
pub const REQUESTED_CONCEPTS: [&str; 11] = [
    "CompanyName",
    "RegistrationDate",
    "CompanyCode",
    "VATNumber",
    "FoundationDate",
    "CompanyType",
    "CountryName",
    "PostalCode",
    "Region",
    "StreetAddress",
    "NaceCode",
];

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ProcessId {
    pub scheme: String,
    pub value: String,
}

impl ProcessId {
    pub fn data_query() -> Self {
        Self {
            scheme: DATA_QUERY_PROCESS.0.to_string(),
            value: DATA_QUERY_PROCESS.1.to_string(),
        }
    }

    pub fn document_query() -> Self {
        Self {
            scheme: DOCUMENT_QUERY_PROCESS.0.to_string(),
            value: DOCUMENT_QUERY_PROCESS.1.to_string(),
        }
    }
}

/// Envelope addressing for one message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct RoutingInfo {
    pub sender: ParticipantId,
    pub receiver: ParticipantId,
    pub document_type: DocumentType,
    pub process: ProcessId,
}

impl RoutingInfo {
    pub fn new(sender: ParticipantId, receiver: ParticipantId, document_type: DocumentType) -> Self {
        Self {
            sender,
            receiver,
            document_type,
            process: ProcessId::data_query(),
        }
    }

    /// Routing for answering a message that arrived with this routing.
    pub fn reply_with(&self, document_type: DocumentType) -> Self {
        Self {
            sender: self.receiver.clone(),
            receiver: self.sender.clone(),
            document_type,
            process: self.process.clone(),
        }
    }

    pub fn with_process(mut self, process: ProcessId) -> Self {
        self.process = process;
        self
    }
}

/// How a document request wants its answer: a reference to the document
/// first, or the document itself.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ResponseOption {
    Reference,
    Inline,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QueryRequest {
    pub request_id: CorrelationId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub issued_at: Timestamp,
    /// Country code of the requesting gateway.
    pub requester_country: String,
    pub data_subject: DataSubject,
    #[serde(default)]
    pub concepts: Vec<String>,
    /// Set on document requests only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_option: Option<ResponseOption>,
    /// Document asked for in the second step of a document request.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub document_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct QueryResponse {
    pub response_id: CorrelationId,
    /// Correlation id of the request being answered.
    pub request_id: CorrelationId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub issued_at: Timestamp,
    pub organization: Organization,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorInfo {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct ErrorResponse {
    pub response_id: CorrelationId,
    pub request_id: CorrelationId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub issued_at: Timestamp,
    pub error: ErrorInfo,
}

// ============================================================================
// DOCUMENT RESPONSES
// ============================================================================

/// Metadata describing one evidence document.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Dataset {
    pub id: String,
    pub title: String,
    pub description: String,
    pub issued: NaiveDateTime,
    pub valid_from: NaiveDate,
    pub valid_to: NaiveDate,
    /// ISO 639 language code.
    pub language: String,
    pub creator: String,
    pub mime_type: String,
}

/// Document bytes carried alongside a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Attachment {
    pub content_id: String,
    pub mime_type: String,
    #[serde(with = "base64_bytes")]
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = Byte))]
    pub data: Vec<u8>,
}

/// Answer to a document request. Without an attachment it only references
/// the document by `registry_object_id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct DocumentResponse {
    pub response_id: CorrelationId,
    pub request_id: CorrelationId,
    #[cfg_attr(feature = "openapi", schema(value_type = String, format = "date-time"))]
    pub issued_at: Timestamp,
    pub registry_object_id: String,
    pub dataset: Dataset,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub attachment: Option<Attachment>,
}

impl DocumentResponse {
    pub fn is_reference(&self) -> bool {
        self.attachment.is_none()
    }
}

/// Anything this gateway hands to the transport.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundMessage {
    Request(QueryRequest),
    Response(QueryResponse),
    DocumentResponse(DocumentResponse),
    ErrorResponse(ErrorResponse),
}

impl OutboundMessage {
    /// Id the eventual reply is correlated by (the request id in all cases).
    pub fn correlation_id(&self) -> &CorrelationId {
        match self {
            OutboundMessage::Request(r) => &r.request_id,
            OutboundMessage::Response(r) => &r.request_id,
            OutboundMessage::DocumentResponse(r) => &r.request_id,
            OutboundMessage::ErrorResponse(r) => &r.request_id,
        }
    }
}

/// Events the transport delivers to the gateway.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum InboundEvent {
    Reply {
        routing: RoutingInfo,
        response: QueryResponse,
    },
    ErrorReply {
        routing: RoutingInfo,
        error: ErrorResponse,
    },
    Request {
        routing: RoutingInfo,
        request: QueryRequest,
    },
}

/// Outcome delivered to a waiting lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Reply {
    Success(Organization),
    Error(String),
}

// ============================================================================
// SERDE HELPERS
// ============================================================================

mod base64_bytes {
    use base64::{engine::general_purpose::STANDARD, Engine as _};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(data: &[u8], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&STANDARD.encode(data))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<u8>, D::Error> {
        let encoded = String::deserialize(deserializer)?;
        STANDARD.decode(encoded).map_err(serde::de::Error::custom)
    }
}
