//! OpenAPI Specification for the Gateway API
//!
//! Generated with utoipa from the route annotations and domain types.

use utoipa::OpenApi;

use crate::error::{ApiError, ErrorCode};
use crate::routes::health::{HealthStatus, ReadyResponse};
use crate::routes::{health, incoming, log, query, reference};

use toop_core::{
    Address, CodeDescription, CorrelationId, CountryCode, DataSubject, DocumentType,
    Organization, ParticipantId, QueryType,
};
use toop_gateway::{
    ActivityEntry, ErrorInfo, ErrorResponse, InboundEvent, ProcessId, QueryRequest,
    QueryResponse, RoutingInfo, Severity,
};

#[derive(OpenApi)]
#[openapi(
    info(
        title = "TOOP Lookup Gateway API",
        version = "0.4.0",
        description = "Synchronous organization lookups in other countries' business registries over the TOOP message exchange",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT"),
    ),
    servers(
        (url = "http://localhost:8080", description = "Local Development")
    ),
    tags(
        (name = "Health", description = "Liveness and readiness"),
        (name = "Reference data", description = "Participants and document types from the reference directory"),
        (name = "Query", description = "Lookups in remote registries"),
        (name = "Activity", description = "Recent gateway activity"),
        (name = "Connector", description = "Inbound events from the message connector"),
    ),
    paths(
        health::ping,
        health::readiness,
        reference::country_codes,
        reference::country_codes_for_query_type,
        reference::document_types,
        log::activity_log,
        query::legal_person,
        query::natural_person,
        incoming::incoming,
    ),
    components(schemas(
        ApiError,
        ErrorCode,
        HealthStatus,
        ReadyResponse,
        CountryCode,
        DocumentType,
        ParticipantId,
        QueryType,
        CorrelationId,
        Organization,
        CodeDescription,
        Address,
        DataSubject,
        ActivityEntry,
        Severity,
        InboundEvent,
        RoutingInfo,
        ProcessId,
        QueryRequest,
        QueryResponse,
        ErrorResponse,
        ErrorInfo,
    ))
)]
pub struct ApiDoc;

impl ApiDoc {
    pub fn to_json() -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(&Self::openapi())
    }
}
