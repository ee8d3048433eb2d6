//! TOOP Test Utilities
//!
//! Shared test infrastructure for the gateway workspace:
//! - Mock transport with scripted or loopback delivery
//! - Static upstream fetchers with call counters
//! - Fixtures for reference data, organizations and a wired gateway
//! - Proptest generators

pub use toop_core::{
    CorrelationId, CountryCode, DocumentType, GatewayConfig, LookupResponse, LookupStatus,
    Organization, QueryType, SubjectAttributes, TransportError, UpstreamError,
};
pub use toop_gateway::{
    ActivityLog, InboundEvent, InboundHandler, MessageTransport, OutboundMessage,
    PendingRequestTable, QueryResponse, Reply, RequestCorrelator, RoutingInfo,
};

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex, PoisonError, Weak};
use std::time::Duration;
use toop_cache::{ListFetcher, RecordFetcher};
use toop_directory::{CountryDirectory, OrganizationCache};
use toop_gateway::{ErrorInfo, ErrorResponse};

// ============================================================================
// MOCK TRANSPORT
// ============================================================================

/// How [`MockTransport`] treats an outbound message.
#[derive(Debug, Clone)]
pub enum MockBehavior {
    /// Accept and do nothing; nothing ever replies.
    Accept,
    /// Refuse every message.
    Fail(String),
    /// Answer requests with this organization after `delay`.
    Reply { organization: Organization, delay: Duration },
    /// Answer requests with an error reply after `delay`.
    ErrorReply { message: String, delay: Duration },
    /// Feed every message back into the attached handler as if the peer
    /// were this same gateway: requests arrive as inbound requests and
    /// responses arrive as replies.
    Loopback,
}

/// In-memory transport that records every message it is asked to send.
pub struct MockTransport {
    behavior: Mutex<MockBehavior>,
    sent: Mutex<Vec<(OutboundMessage, RoutingInfo)>>,
    handler: Mutex<Weak<InboundHandler>>,
}

impl MockTransport {
    pub fn new(behavior: MockBehavior) -> Self {
        Self {
            behavior: Mutex::new(behavior),
            sent: Mutex::new(Vec::new()),
            handler: Mutex::new(Weak::new()),
        }
    }

    pub fn accepting() -> Self {
        Self::new(MockBehavior::Accept)
    }

    pub fn failing(reason: impl Into<String>) -> Self {
        Self::new(MockBehavior::Fail(reason.into()))
    }

    /// Handler that scripted replies are delivered to.
    pub fn attach(&self, handler: &Arc<InboundHandler>) {
        *self.handler.lock().unwrap_or_else(PoisonError::into_inner) = Arc::downgrade(handler);
    }

    pub fn set_behavior(&self, behavior: MockBehavior) {
        *self.behavior.lock().unwrap_or_else(PoisonError::into_inner) = behavior;
    }

    pub fn sent(&self) -> Vec<(OutboundMessage, RoutingInfo)> {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).clone()
    }

    pub fn sent_count(&self) -> usize {
        self.sent.lock().unwrap_or_else(PoisonError::into_inner).len()
    }

    fn deliver_later(&self, event: InboundEvent, delay: Duration) {
        let handler = self.handler.lock().unwrap_or_else(PoisonError::into_inner).clone();
        tokio::spawn(async move {
            if !delay.is_zero() {
                tokio::time::sleep(delay).await;
            }
            if let Some(handler) = handler.upgrade() {
                handler.on_event(event).await;
            }
        });
    }
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport")
            .field("sent", &self.sent_count())
            .finish()
    }
}

#[async_trait]
impl MessageTransport for MockTransport {
    async fn send(
        &self,
        message: &OutboundMessage,
        routing: &RoutingInfo,
    ) -> Result<(), TransportError> {
        let behavior = self.behavior.lock().unwrap_or_else(PoisonError::into_inner).clone();
        if let MockBehavior::Fail(reason) = &behavior {
            return Err(TransportError::SubmitFailed {
                reason: reason.clone(),
            });
        }
        self.sent
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push((message.clone(), routing.clone()));

        let reply_routing = routing.reply_with(DocumentType::query_response());
        match (behavior, message) {
            (MockBehavior::Reply { organization, delay }, OutboundMessage::Request(request)) => {
                let response = QueryResponse {
                    response_id: CorrelationId::generate(),
                    request_id: request.request_id.clone(),
                    issued_at: toop_core::now(),
                    organization,
                };
                self.deliver_later(
                    InboundEvent::Reply {
                        routing: reply_routing,
                        response,
                    },
                    delay,
                );
            }
            (MockBehavior::ErrorReply { message, delay }, OutboundMessage::Request(request)) => {
                let error = ErrorResponse {
                    response_id: CorrelationId::generate(),
                    request_id: request.request_id.clone(),
                    issued_at: toop_core::now(),
                    error: ErrorInfo {
                        code: "DP_ELE_001".to_string(),
                        message,
                    },
                };
                self.deliver_later(
                    InboundEvent::ErrorReply {
                        routing: reply_routing,
                        error,
                    },
                    delay,
                );
            }
            (MockBehavior::Loopback, outbound) => {
                let event = match outbound {
                    OutboundMessage::Request(request) => Some(InboundEvent::Request {
                        routing: routing.clone(),
                        request: request.clone(),
                    }),
                    OutboundMessage::Response(response) => Some(InboundEvent::Reply {
                        routing: routing.clone(),
                        response: response.clone(),
                    }),
                    OutboundMessage::ErrorResponse(error) => Some(InboundEvent::ErrorReply {
                        routing: routing.clone(),
                        error: error.clone(),
                    }),
                    // Document responses are only recorded; nothing here consumes them.
                    OutboundMessage::DocumentResponse(_) => None,
                };
                if let Some(event) = event {
                    self.deliver_later(event, Duration::ZERO);
                }
            }
            _ => {}
        }
        Ok(())
    }
}

// ============================================================================
// STATIC FETCHERS
// ============================================================================

/// List fetcher returning a fixed record set, counting calls.
#[derive(Debug)]
pub struct StaticListFetcher<R> {
    records: Mutex<Vec<R>>,
    failing: Mutex<bool>,
    delay: Duration,
    calls: AtomicUsize,
}

impl<R: Clone + Send + Sync> StaticListFetcher<R> {
    pub fn new(records: Vec<R>) -> Self {
        Self {
            records: Mutex::new(records),
            failing: Mutex::new(false),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    /// Every fetch sleeps for `delay` before answering.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_records(&self, records: Vec<R>) {
        *self.records.lock().unwrap_or_else(PoisonError::into_inner) = records;
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl<R: Clone + Send + Sync> ListFetcher<R> for StaticListFetcher<R> {
    async fn fetch_all(&self) -> Result<Vec<R>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(toop_core::request_failed("directory", 503, "unavailable"));
        }
        Ok(self.records.lock().unwrap_or_else(PoisonError::into_inner).clone())
    }
}

/// Record fetcher backed by a map keyed like the cached records.
#[derive(Debug, Default)]
pub struct StaticRecordFetcher {
    records: HashMap<String, Organization>,
    failing: Mutex<bool>,
    delay: Duration,
    calls: AtomicUsize,
}

impl StaticRecordFetcher {
    pub fn new(organizations: Vec<Organization>) -> Self {
        Self {
            records: organizations
                .into_iter()
                .map(|o| (o.organization_number.clone(), o))
                .collect(),
            failing: Mutex::new(false),
            delay: Duration::ZERO,
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().unwrap_or_else(PoisonError::into_inner) = failing;
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl RecordFetcher<String, Organization> for StaticRecordFetcher {
    async fn fetch_one(&self, key: &String) -> Result<Option<Organization>, UpstreamError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
        if *self.failing.lock().unwrap_or_else(PoisonError::into_inner) {
            return Err(toop_core::request_failed("registry", 500, "internal error"));
        }
        Ok(self.records.get(key).cloned())
    }
}

// ============================================================================
// FIXTURES
// ============================================================================

pub mod fixtures {
    //! Reference data and a fully wired in-memory gateway.

    use super::*;
    use toop_core::{Address, CodeDescription};

    pub const OWN_PARTICIPANT: &str = "9999:norway2";

    /// This gateway: Norway, able to serve and receive every query type.
    pub fn norway() -> CountryCode {
        CountryCode::new(OWN_PARTICIPANT, "NO", "Brønnøysund Register Centre").with_doc_types(vec![
            QueryType::Gbm.request_document_type(),
            QueryType::EProcurement.request_document_type(),
            DocumentType::query_response(),
        ])
    }

    pub fn sweden() -> CountryCode {
        CountryCode::new("9999:sweden", "SE", "Bolagsverket").with_doc_types(vec![
            QueryType::Gbm.request_document_type(),
            DocumentType::query_response(),
        ])
    }

    /// A participant that only answers document requests.
    pub fn denmark_eprocurement() -> CountryCode {
        CountryCode::new("9999:denmark", "DK", "Erhvervsstyrelsen")
            .with_doc_types(vec![QueryType::EProcurement.request_document_type()])
    }

    pub fn reference_data() -> Vec<CountryCode> {
        vec![norway(), sweden(), denmark_eprocurement()]
    }

    pub fn sample_organization() -> Organization {
        let mut org = Organization::new("974760673", "REGISTERENHETEN I BRØNNØYSUND");
        org.organization_form = Some(CodeDescription {
            code: "ORGL".to_string(),
            description: "Organisasjonsledd".to_string(),
        });
        org.registration_date = Some("1995-08-09".to_string());
        org.vat_registered = true;
        org.industry_code = Some(CodeDescription {
            code: "84.110".to_string(),
            description: "Generell offentlig administrasjon".to_string(),
        });
        org.business_address = Some(Address {
            lines: vec!["Havnegata 48".to_string()],
            postal_code: Some("8900".to_string()),
            postal_place: Some("BRØNNØYSUND".to_string()),
            municipality: Some("BRØNNØY".to_string()),
            country: Some("Norge".to_string()),
            country_code: Some("NO".to_string()),
        });
        org
    }

    pub fn test_config() -> GatewayConfig {
        GatewayConfig::default()
            .with_own_participant_id(OWN_PARTICIPANT)
            .with_correlation_timeout(Duration::from_millis(200))
    }

    /// All gateway components wired over in-memory upstreams.
    pub struct TestGateway {
        pub config: GatewayConfig,
        pub directory_fetcher: Arc<StaticListFetcher<CountryCode>>,
        pub registry: Arc<StaticRecordFetcher>,
        pub countries: Arc<CountryDirectory>,
        pub organizations: Arc<OrganizationCache>,
        pub transport: Arc<MockTransport>,
        pub pending: Arc<PendingRequestTable<Reply>>,
        pub activity: Arc<ActivityLog>,
        pub handler: Arc<InboundHandler>,
        pub correlator: RequestCorrelator,
    }

    impl TestGateway {
        pub fn new(behavior: MockBehavior) -> Self {
            Self::with_config(test_config(), behavior)
        }

        pub fn with_config(config: GatewayConfig, behavior: MockBehavior) -> Self {
            let directory_fetcher = Arc::new(StaticListFetcher::new(reference_data()));
            let registry = Arc::new(StaticRecordFetcher::new(vec![sample_organization()]));
            let countries = Arc::new(CountryDirectory::new(
                directory_fetcher.clone(),
                config.reference_ttl,
            ));
            let organizations = Arc::new(OrganizationCache::new(
                registry.clone(),
                config.organization_cache_capacity,
            ));
            let transport = Arc::new(MockTransport::new(behavior));
            let pending = Arc::new(PendingRequestTable::new());
            let activity = Arc::new(ActivityLog::default());
            let handler = Arc::new(InboundHandler::new(
                pending.clone(),
                organizations.clone(),
                transport.clone(),
                activity.clone(),
            ));
            transport.attach(&handler);
            let correlator = RequestCorrelator::new(
                countries.clone(),
                transport.clone(),
                pending.clone(),
                activity.clone(),
                &config,
            );
            Self {
                config,
                directory_fetcher,
                registry,
                countries,
                organizations,
                transport,
                pending,
                activity,
                handler,
                correlator,
            }
        }

        pub async fn lookup_legal(&self, country: &str, identifier: &str) -> LookupResponse {
            self.correlator
                .lookup_by_identifier(country, identifier, &SubjectAttributes::default(), true)
                .await
        }
    }
}

// ============================================================================
// PROPTEST GENERATORS
// ============================================================================

pub mod generators {
    //! Proptest strategies for gateway types.

    use super::*;
    use chrono::NaiveDate;
    use proptest::prelude::*;

    pub fn arb_correlation_id() -> impl Strategy<Value = CorrelationId> {
        "[a-f0-9]{8}-[a-f0-9]{4}".prop_map(CorrelationId::new)
    }

    pub fn arb_country() -> impl Strategy<Value = String> {
        "[A-Z]{2}".prop_map(|s| s)
    }

    pub fn arb_organization_number() -> impl Strategy<Value = String> {
        "[0-9]{9}".prop_map(|s| s)
    }

    pub fn arb_organization() -> impl Strategy<Value = Organization> {
        (
            arb_organization_number(),
            "[A-Z ]{1,40}".prop_map(|s| s),
            any::<bool>(),
        )
            .prop_map(|(number, name, vat)| {
                let mut org = Organization::new(number, name);
                org.vat_registered = vat;
                org
            })
    }

    pub fn arb_subject_attributes() -> impl Strategy<Value = SubjectAttributes> {
        (
            prop::option::of("[A-Za-z]{1,20}".prop_map(|s| s)),
            prop::option::of("[A-Za-z]{1,20}".prop_map(|s| s)),
            prop::option::of((1900i32..2020, 1u32..13, 1u32..29)),
        )
            .prop_map(|(first_name, last_name, date)| SubjectAttributes {
                first_name,
                last_name,
                birth_date: date.and_then(|(y, m, d)| NaiveDate::from_ymd_opt(y, m, d)),
            })
    }

    pub fn arb_country_code() -> impl Strategy<Value = CountryCode> {
        (
            "[0-9]{4}:[a-z]{3,10}".prop_map(|s| s),
            arb_country(),
            "[A-Za-z ]{1,30}".prop_map(|s| s),
            prop::sample::subsequence(
                vec![
                    QueryType::Gbm.request_document_type(),
                    QueryType::EProcurement.request_document_type(),
                    DocumentType::query_response(),
                ],
                0..=3,
            ),
        )
            .prop_map(|(id, code, name, doc_types)| {
                CountryCode::new(id, code, name).with_doc_types(doc_types)
            })
    }
}
