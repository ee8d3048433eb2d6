//! Router tests driven through `tower::ServiceExt::oneshot`.

use std::sync::Arc;
use std::time::Duration;

use axum::body::Body;
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use tower::ServiceExt;

use toop_api::{create_api_router, AppState};
use toop_core::{CountryCode, DataSubject, DocumentType, ParticipantId};
use toop_directory::{CountryDirectory, OrganizationCache};
use toop_gateway::{QueryRequest, RoutingInfo};
use toop_test_utils::fixtures::{reference_data, sample_organization, test_config};
use toop_test_utils::{MockBehavior, MockTransport, StaticListFetcher, StaticRecordFetcher};

struct Harness {
    app: Router,
    transport: Arc<MockTransport>,
    directory: Arc<StaticListFetcher<CountryCode>>,
    registry: Arc<StaticRecordFetcher>,
    organizations: Arc<OrganizationCache>,
}

fn harness_with(records: Vec<CountryCode>, behavior: MockBehavior) -> Harness {
    harness_over(
        records,
        StaticRecordFetcher::new(vec![sample_organization()]),
        behavior,
    )
}

fn harness_over(
    records: Vec<CountryCode>,
    registry: StaticRecordFetcher,
    behavior: MockBehavior,
) -> Harness {
    let config = test_config();
    let directory = Arc::new(StaticListFetcher::new(records));
    let registry = Arc::new(registry);
    let countries = Arc::new(CountryDirectory::new(directory.clone(), config.reference_ttl));
    let organizations = Arc::new(OrganizationCache::new(
        registry.clone(),
        config.organization_cache_capacity,
    ));
    let transport = Arc::new(MockTransport::new(behavior));

    let state = AppState::new(&config, countries, organizations.clone(), transport.clone());
    transport.attach(&state.inbound);

    Harness {
        app: create_api_router(state),
        transport,
        directory,
        registry,
        organizations,
    }
}

fn harness(behavior: MockBehavior) -> Harness {
    harness_with(reference_data(), behavior)
}

async fn get(app: &Router, uri: &str) -> (StatusCode, Vec<u8>) {
    let response = app
        .clone()
        .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    (status, body.to_vec())
}

fn json(body: &[u8]) -> serde_json::Value {
    serde_json::from_slice(body).unwrap()
}

// ============================================================================
// HEALTH
// ============================================================================

#[tokio::test]
async fn test_ping() {
    let h = harness(MockBehavior::Accept);
    let (status, body) = get(&h.app, "/ping").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, b"pong");
}

#[tokio::test]
async fn test_ready_loads_reference_data() {
    let h = harness(MockBehavior::Accept);
    let (status, body) = get(&h.app, "/ready").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["country_codes"], 3);
    assert_eq!(h.directory.calls(), 1);
}

#[tokio::test]
async fn test_ready_answers_during_slow_registry_fetch() {
    let h = harness_over(
        reference_data(),
        StaticRecordFetcher::new(vec![sample_organization()]).with_delay(Duration::from_secs(30)),
        MockBehavior::Accept,
    );

    let lookup = {
        let organizations = h.organizations.clone();
        tokio::spawn(async move { organizations.get("974760673").await })
    };
    while h.registry.calls() == 0 {
        tokio::task::yield_now().await;
    }

    let (status, body) = tokio::time::timeout(Duration::from_secs(2), get(&h.app, "/ready"))
        .await
        .expect("/ready blocked behind the registry fetch");
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body)["cached_organizations"], 0);
    lookup.abort();
}

#[tokio::test]
async fn test_not_ready_without_reference_data() {
    let h = harness_with(vec![], MockBehavior::Accept);
    let (status, body) = get(&h.app, "/ready").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json(&body)["status"], "unhealthy");
}

// ============================================================================
// REFERENCE DATA
// ============================================================================

#[tokio::test]
async fn test_country_codes() {
    let h = harness(MockBehavior::Accept);
    let (status, body) = get(&h.app, "/countrycodes").await;
    assert_eq!(status, StatusCode::OK);
    let codes = json(&body);
    assert_eq!(codes.as_array().unwrap().len(), 3);
    assert_eq!(codes[0]["code"], "NO");
    assert_eq!(codes[0]["id"], "9999:norway2");
}

#[tokio::test]
async fn test_country_codes_empty_is_no_content() {
    let h = harness_with(vec![], MockBehavior::Accept);
    let (status, body) = get(&h.app, "/countrycodes").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_empty());
}

#[tokio::test]
async fn test_country_codes_by_query_type() {
    let h = harness(MockBehavior::Accept);

    let (status, body) = get(&h.app, "/countrycodes/eprocurement").await;
    assert_eq!(status, StatusCode::OK);
    let codes: Vec<String> = json(&body)
        .as_array()
        .unwrap()
        .iter()
        .map(|c| c["code"].as_str().unwrap().to_string())
        .collect();
    assert_eq!(codes, vec!["NO", "DK"]);

    let (status, _) = get(&h.app, "/countrycodes/weather").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_document_types() {
    let h = harness(MockBehavior::Accept);

    let (status, body) = get(&h.app, "/documenttypes/se").await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json(&body).as_array().unwrap().len(), 2);

    let (status, _) = get(&h.app, "/documenttypes/FI").await;
    assert_eq!(status, StatusCode::NO_CONTENT);
}

// ============================================================================
// QUERY
// ============================================================================

#[tokio::test]
async fn test_legal_person_lookup() {
    let h = harness(MockBehavior::Reply {
        organization: sample_organization(),
        delay: Duration::from_millis(5),
    });

    let (status, body) = get(&h.app, "/query/SE/legalperson/5560000000").await;
    assert_eq!(status, StatusCode::OK);
    let org = json(&body);
    assert_eq!(org["organisasjonsnummer"], "974760673");
    assert_eq!(org["navn"], "REGISTERENHETEN I BRØNNØYSUND");
    assert_eq!(h.transport.sent_count(), 1);
}

#[tokio::test]
async fn test_lookup_in_unknown_country() {
    let h = harness(MockBehavior::Accept);

    let (status, body) = get(&h.app, "/query/FI/legalperson/1234567-8").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["code"], "ENTITY_NOT_FOUND");
    assert_eq!(h.transport.sent_count(), 0);
}

#[tokio::test]
async fn test_error_reply_maps_to_not_found() {
    let h = harness(MockBehavior::ErrorReply {
        message: "Organization 5560000000 not found".to_string(),
        delay: Duration::ZERO,
    });

    let (status, body) = get(&h.app, "/query/SE/legalperson/5560000000").await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json(&body)["message"], "Organization 5560000000 not found");
}

#[tokio::test]
async fn test_transport_failure_maps_to_service_unavailable() {
    let h = harness(MockBehavior::Fail("connector down".to_string()));

    let (status, body) = get(&h.app, "/query/SE/legalperson/5560000000").await;
    assert_eq!(status, StatusCode::SERVICE_UNAVAILABLE);
    assert_eq!(json(&body)["code"], "SERVICE_UNAVAILABLE");
}

#[tokio::test(start_paused = true)]
async fn test_no_reply_maps_to_gateway_timeout() {
    let h = harness(MockBehavior::Accept);

    let (status, body) = get(&h.app, "/query/SE/legalperson/5560000000").await;
    assert_eq!(status, StatusCode::GATEWAY_TIMEOUT);
    assert_eq!(json(&body)["code"], "TIMEOUT");
}

#[tokio::test]
async fn test_natural_person_lookup_passes_attributes() {
    let h = harness(MockBehavior::Reply {
        organization: sample_organization(),
        delay: Duration::ZERO,
    });

    let (status, _) = get(
        &h.app,
        "/query/SE/naturalperson/19800101-1234?firstname=Kari&lastname=Nordmann&birthdate=1980-01-01",
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let (message, _) = h.transport.sent().remove(0);
    let toop_gateway::OutboundMessage::Request(request) = message else {
        panic!("expected a request");
    };
    match request.data_subject {
        DataSubject::NaturalPerson {
            first_name,
            family_name,
            birth_date,
            ..
        } => {
            assert_eq!(first_name, "Kari");
            assert_eq!(family_name, "Nordmann");
            assert_eq!(birth_date.to_string(), "1980-01-01");
        }
        other => panic!("expected a natural person, got {:?}", other),
    }
}

#[tokio::test]
async fn test_natural_person_bad_birthdate() {
    let h = harness(MockBehavior::Accept);

    let (status, body) = get(&h.app, "/query/SE/naturalperson/1?birthdate=1980").await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json(&body)["code"], "INVALID_FORMAT");
    assert_eq!(h.transport.sent_count(), 0);
}

// ============================================================================
// LOG AND INCOMING
// ============================================================================

#[tokio::test]
async fn test_log_empty_then_populated() {
    let h = harness(MockBehavior::Accept);

    let (status, _) = get(&h.app, "/log").await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    get(&h.app, "/query/FI/legalperson/1").await;

    let (status, body) = get(&h.app, "/log").await;
    assert_eq!(status, StatusCode::OK);
    let entries = json(&body);
    assert!(entries
        .as_array()
        .unwrap()
        .iter()
        .any(|e| e["severity"] == "ERROR"));
}

#[tokio::test]
async fn test_incoming_request_is_answered() {
    let h = harness(MockBehavior::Accept);

    let routing = RoutingInfo::new(
        ParticipantId::new("9999:sweden"),
        ParticipantId::new("9999:norway2"),
        DocumentType::registered_organization_request(),
    );
    let request = QueryRequest {
        request_id: toop_core::CorrelationId::new("se-42"),
        issued_at: toop_core::now(),
        requester_country: "SE".to_string(),
        data_subject: DataSubject::LegalPerson {
            legal_id: "SE/NO/974760673".to_string(),
        },
        concepts: vec![],
        response_option: None,
        document_id: None,
    };
    let body = serde_json::json!({
        "event": "request",
        "routing": routing,
        "request": request,
    });

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/incoming")
                .header("content-type", "application/json")
                .body(Body::from(serde_json::to_vec(&body).unwrap()))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::ACCEPTED);

    let sent = h.transport.sent();
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].1.receiver.value, "9999:sweden");
    match &sent[0].0 {
        toop_gateway::OutboundMessage::Response(response) => {
            assert_eq!(response.request_id.as_str(), "se-42");
            assert_eq!(response.organization, sample_organization());
        }
        other => panic!("expected a response, got {:?}", other),
    }
}

#[tokio::test]
async fn test_incoming_malformed_event() {
    let h = harness(MockBehavior::Accept);

    let response = h
        .app
        .clone()
        .oneshot(
            Request::builder()
                .method(Method::POST)
                .uri("/incoming")
                .header("content-type", "application/json")
                .body(Body::from(r#"{"event":"gossip"}"#))
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
}

#[tokio::test]
async fn test_openapi_document() {
    let h = harness(MockBehavior::Accept);
    let (status, body) = get(&h.app, "/openapi.json").await;
    assert_eq!(status, StatusCode::OK);
    assert!(json(&body)["paths"]
        .as_object()
        .unwrap()
        .contains_key("/query/{countrycode}/naturalperson/{id}"));
}
