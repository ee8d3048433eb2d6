//! Synchronous lookups over the asynchronous exchange.

use std::sync::Arc;
use std::time::Duration;

use toop_core::{
    CorrelationError, CorrelationId, DataSubject, DocumentType, GatewayConfig, GatewayError,
    LookupResponse, ParticipantId, SubjectAttributes,
};
use toop_directory::CountryDirectory;

use crate::activity::ActivityLog;
use crate::message::{OutboundMessage, QueryRequest, Reply, RoutingInfo, REQUESTED_CONCEPTS};
use crate::pending::{PendingRequestTable, WaitOutcome};
use crate::transport::MessageTransport;

/// Resolves the receiving participant, sends the query, and waits for the
/// correlated reply.
pub struct RequestCorrelator {
    countries: Arc<CountryDirectory>,
    transport: Arc<dyn MessageTransport>,
    pending: Arc<PendingRequestTable<Reply>>,
    activity: Arc<ActivityLog>,
    own_participant_id: String,
    timeout: Duration,
}

impl RequestCorrelator {
    pub fn new(
        countries: Arc<CountryDirectory>,
        transport: Arc<dyn MessageTransport>,
        pending: Arc<PendingRequestTable<Reply>>,
        activity: Arc<ActivityLog>,
        config: &GatewayConfig,
    ) -> Self {
        Self {
            countries,
            transport,
            pending,
            activity,
            own_participant_id: config.own_participant_id.clone(),
            timeout: config.correlation_timeout,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Look up `identifier` in the registry of `country_code`.
    ///
    /// Never fails past its boundary; every outcome is a [`LookupResponse`]:
    ///
    /// - own participant missing from reference data: `ServiceUnavailable`
    /// - no participant in `country_code` accepts the query: `NotFound`,
    ///   nothing is sent
    /// - transport refuses the message: `ServiceUnavailable`, not retried
    /// - correlated error reply: `NotFound`
    /// - no reply before the deadline: `GatewayTimeout`
    pub async fn lookup_by_identifier(
        &self,
        country_code: &str,
        identifier: &str,
        attributes: &SubjectAttributes,
        is_legal_person: bool,
    ) -> LookupResponse {
        let Some(own) = self.countries.by_participant_id(&self.own_participant_id).await else {
            return self.failed(LookupResponse::service_unavailable(format!(
                "Could not find own participant {} in reference data",
                self.own_participant_id
            )));
        };

        let doc_type = DocumentType::registered_organization_request();
        let Some(receiver) = self
            .countries
            .participants_for(country_code, &doc_type)
            .await
            .into_iter()
            .next()
        else {
            let error = GatewayError::ReferenceDataMissing {
                code: country_code.to_string(),
            };
            return self.failed(LookupResponse::not_found(error.to_string()));
        };

        let request_id = CorrelationId::generate();
        let qualified_id = format!("{}/{}/{}", own.code, receiver.code, identifier);
        let message = OutboundMessage::Request(QueryRequest {
            request_id: request_id.clone(),
            issued_at: toop_core::now(),
            requester_country: own.code.clone(),
            data_subject: DataSubject::from_identifier(qualified_id, attributes, is_legal_person),
            concepts: REQUESTED_CONCEPTS.iter().map(|c| c.to_string()).collect(),
            response_option: None,
            document_id: None,
        });
        let routing = RoutingInfo::new(
            ParticipantId::new(own.id.clone()),
            ParticipantId::new(receiver.id.clone()),
            doc_type,
        );

        // Registered before sending so a fast reply always finds its entry.
        let handle = match self.pending.register(request_id.clone()) {
            Ok(handle) => handle,
            Err(error) => {
                return self.failed(LookupResponse::service_unavailable(error.to_string()));
            }
        };
        let mut discard = DiscardOnDrop {
            pending: &self.pending,
            id: &request_id,
            armed: true,
        };

        self.activity.info(format!(
            "Sending request {} for {} to {}",
            request_id, identifier, receiver.id
        ));
        if let Err(error) = self.transport.send(&message, &routing).await {
            // `discard` drops here and removes the entry.
            return self.failed(LookupResponse::service_unavailable(format!(
                "Failed to send request {}: {}",
                request_id, error
            )));
        }
        discard.armed = false;

        match self.pending.wait(handle, self.timeout).await {
            WaitOutcome::Completed(Reply::Success(organization)) => {
                self.activity
                    .info(format!("Got response for request {}", request_id));
                LookupResponse::ok(organization)
            }
            WaitOutcome::Completed(Reply::Error(message)) => {
                self.failed(LookupResponse::not_found(message))
            }
            WaitOutcome::TimedOut => {
                let error = CorrelationError::Timeout {
                    id: request_id.to_string(),
                    waited: self.timeout,
                };
                self.failed(LookupResponse::gateway_timeout(error.to_string()))
            }
        }
    }

    fn failed(&self, response: LookupResponse) -> LookupResponse {
        if let Some(message) = response.error_message.as_deref() {
            self.activity.error(message);
        }
        response
    }
}

impl std::fmt::Debug for RequestCorrelator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RequestCorrelator")
            .field("own_participant_id", &self.own_participant_id)
            .field("timeout", &self.timeout)
            .field("pending", &self.pending)
            .finish()
    }
}

/// Removes a registered entry if the lookup ends before reaching `wait`.
struct DiscardOnDrop<'a> {
    pending: &'a PendingRequestTable<Reply>,
    id: &'a CorrelationId,
    armed: bool,
}

impl Drop for DiscardOnDrop<'_> {
    fn drop(&mut self) {
        if self.armed {
            self.pending.discard(self.id);
        }
    }
}
