//! Inbound event handling.
//!
//! Replies are matched to waiting lookups through the pending table. Remote
//! queries are answered from the local business registry and never touch
//! the pending table.

use std::sync::Arc;

use toop_core::{CorrelationId, DocumentType};
use toop_directory::OrganizationCache;

use crate::activity::ActivityLog;
use crate::dispatch::{DispatchTable, HandlerKind};
use crate::eprocurement::{self, SampleAnswer};
use crate::message::{
    ErrorInfo, ErrorResponse, InboundEvent, OutboundMessage, ProcessId, QueryRequest,
    QueryResponse, Reply, RoutingInfo,
};
use crate::pending::PendingRequestTable;
use crate::transport::MessageTransport;

/// Error code used when a requested element cannot be provided.
pub const ELEMENT_UNAVAILABLE: &str = "DP_ELE_001";
/// Error code used when a request asks for something this gateway does not hold.
pub const INVALID_REQUEST: &str = "DP_REQ_001";

/// What happened to one inbound event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundOutcome {
    /// A waiting lookup received the reply.
    Delivered,
    /// No lookup was waiting; the reply was dropped.
    Unmatched,
    /// A remote query was answered.
    Answered,
    /// The event was rejected and logged.
    Rejected(String),
}

pub struct InboundHandler {
    pending: Arc<PendingRequestTable<Reply>>,
    organizations: Arc<OrganizationCache>,
    transport: Arc<dyn MessageTransport>,
    dispatch: DispatchTable,
    activity: Arc<ActivityLog>,
}

impl InboundHandler {
    pub fn new(
        pending: Arc<PendingRequestTable<Reply>>,
        organizations: Arc<OrganizationCache>,
        transport: Arc<dyn MessageTransport>,
        activity: Arc<ActivityLog>,
    ) -> Self {
        Self {
            pending,
            organizations,
            transport,
            dispatch: DispatchTable::standard(),
            activity,
        }
    }

    pub async fn on_event(&self, event: InboundEvent) -> InboundOutcome {
        match event {
            InboundEvent::Reply { routing, response } => self.on_reply(&routing, response),
            InboundEvent::ErrorReply { routing, error } => self.on_error_reply(&routing, error),
            InboundEvent::Request { routing, request } => self.on_request(routing, request).await,
        }
    }

    pub fn on_reply(&self, routing: &RoutingInfo, response: QueryResponse) -> InboundOutcome {
        if let Some(rejected) = self.expect_kind(routing, HandlerKind::QueryResponse) {
            return rejected;
        }
        self.activity.info(format!(
            "Got incoming response for request {}",
            response.request_id
        ));
        self.deliver(&response.request_id, Reply::Success(response.organization))
    }

    /// Error replies are matched by request id alone, whatever document type
    /// they arrive under.
    pub fn on_error_reply(&self, routing: &RoutingInfo, error: ErrorResponse) -> InboundOutcome {
        self.activity.info(format!(
            "Got incoming error response for request {} from {}: {}",
            error.request_id, routing.sender.value, error.error.message
        ));
        self.deliver(&error.request_id, Reply::Error(error.error.message))
    }

    pub async fn on_request(&self, routing: RoutingInfo, request: QueryRequest) -> InboundOutcome {
        match self.dispatch.resolve(&routing.document_type) {
            Some(HandlerKind::RegisteredOrganization) => {
                self.answer_registered_organization(routing, request).await
            }
            Some(HandlerKind::EProcurement) => self.answer_document_request(routing, request).await,
            Some(HandlerKind::QueryResponse) | None => self.reject(format!(
                "No request handler for document type {}",
                routing.document_type
            )),
        }
    }

    async fn answer_registered_organization(
        &self,
        routing: RoutingInfo,
        request: QueryRequest,
    ) -> InboundOutcome {
        if !request.data_subject.is_legal_person() {
            return self.reject(format!(
                "Request {} is missing LegalPerson",
                request.request_id
            ));
        }
        let orgno = request.data_subject.local_identifier().to_string();
        if orgno.is_empty() {
            return self.reject(format!(
                "Request {} is missing LegalPerson",
                request.request_id
            ));
        }
        self.activity
            .info(format!("Got incoming request for {}", orgno));

        let reply_routing = routing.reply_with(DocumentType::query_response());
        let Some(organization) = self.organizations.get(&orgno).await else {
            let message = format!("Organization {} not found", orgno);
            return self
                .send_error(&reply_routing, &request.request_id, ELEMENT_UNAVAILABLE, message)
                .await;
        };

        let reply = OutboundMessage::Response(QueryResponse {
            response_id: CorrelationId::generate(),
            request_id: request.request_id,
            issued_at: toop_core::now(),
            organization,
        });
        self.send_reply(&reply_routing, reply).await
    }

    async fn answer_document_request(
        &self,
        routing: RoutingInfo,
        request: QueryRequest,
    ) -> InboundOutcome {
        self.activity.debug(format!(
            "Got incoming eProcurement request {} from {}",
            request.request_id, routing.sender.value
        ));
        let reply_routing = routing
            .reply_with(DocumentType::query_response())
            .with_process(ProcessId::document_query());

        match eprocurement::answer(&request) {
            SampleAnswer::Document(response) => {
                self.activity.info(format!(
                    "Sending eProcurement {} {} for request {}",
                    if response.is_reference() { "reference" } else { "document" },
                    response.registry_object_id,
                    response.request_id
                ));
                self.send_reply(&reply_routing, OutboundMessage::DocumentResponse(response))
                    .await
            }
            SampleAnswer::Unavailable(message) => {
                self.send_error(&reply_routing, &request.request_id, INVALID_REQUEST, message)
                    .await
            }
            SampleAnswer::Invalid(message) => self.reject(message),
        }
    }

    async fn send_error(
        &self,
        reply_routing: &RoutingInfo,
        request_id: &CorrelationId,
        code: &str,
        message: String,
    ) -> InboundOutcome {
        let reply = OutboundMessage::ErrorResponse(ErrorResponse {
            response_id: CorrelationId::generate(),
            request_id: request_id.clone(),
            issued_at: toop_core::now(),
            error: ErrorInfo {
                code: code.to_string(),
                message,
            },
        });
        self.send_reply(reply_routing, reply).await
    }

    async fn send_reply(
        &self,
        reply_routing: &RoutingInfo,
        reply: OutboundMessage,
    ) -> InboundOutcome {
        match self.transport.send(&reply, reply_routing).await {
            Ok(()) => InboundOutcome::Answered,
            Err(error) => self.reject(format!(
                "Failed to send reply for request {}: {}",
                reply.correlation_id(),
                error
            )),
        }
    }

    fn deliver(&self, id: &CorrelationId, reply: Reply) -> InboundOutcome {
        if self.pending.complete(id, reply) {
            InboundOutcome::Delivered
        } else {
            self.activity
                .debug(format!("No pending request for reply {}", id));
            InboundOutcome::Unmatched
        }
    }

    fn expect_kind(&self, routing: &RoutingInfo, expected: HandlerKind) -> Option<InboundOutcome> {
        match self.dispatch.resolve(&routing.document_type) {
            Some(kind) if kind == expected => None,
            _ => Some(self.reject(format!(
                "Unexpected document type {} for a reply",
                routing.document_type
            ))),
        }
    }

    fn reject(&self, message: String) -> InboundOutcome {
        self.activity.error(message.clone());
        InboundOutcome::Rejected(message)
    }
}

impl std::fmt::Debug for InboundHandler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("InboundHandler")
            .field("dispatch", &self.dispatch)
            .field("pending", &self.pending)
            .finish()
    }
}
