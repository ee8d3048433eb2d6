//! Reference directory search client.

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use toop_cache::ListFetcher;
use toop_core::{
    invalid_response, request_failed, CountryCode, DocumentType, ParticipantId, QueryType,
    UpstreamError, PARTICIPANT_SCHEME,
};

const SERVICE: &str = "directory";

// ============================================================================
// WIRE TYPES
// ============================================================================

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SearchResult {
    #[serde(default)]
    pub matches: Vec<SearchMatch>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchMatch {
    #[serde(rename = "participantID")]
    pub participant_id: Option<ParticipantId>,
    #[serde(default, rename = "docTypes")]
    pub doc_types: Vec<DocumentType>,
    #[serde(default)]
    pub entities: Vec<SearchEntity>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchEntity {
    #[serde(default)]
    pub name: Vec<SearchName>,
    #[serde(default, rename = "countryCode")]
    pub country_code: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchName {
    #[serde(default)]
    pub name: Option<String>,
    #[serde(default)]
    pub language: Option<String>,
}

impl SearchResult {
    /// Country codes found in this result, for participants registered in
    /// the standard scheme with a named, country-bound entity. Every record
    /// carries the queried document type plus whatever the match declares.
    pub fn country_codes(&self, queried: &DocumentType) -> Vec<CountryCode> {
        let mut codes = Vec::new();
        for search_match in &self.matches {
            let Some(participant) = search_match.participant_id.as_ref() else {
                continue;
            };
            if participant.scheme != PARTICIPANT_SCHEME || participant.value.is_empty() {
                continue;
            }

            let mut doc_types = vec![queried.clone()];
            for doc_type in &search_match.doc_types {
                if !doc_types.contains(doc_type) {
                    doc_types.push(doc_type.clone());
                }
            }

            for entity in &search_match.entities {
                let code = entity.country_code.as_deref().unwrap_or_default();
                let name = entity
                    .name
                    .first()
                    .and_then(|n| n.name.as_deref())
                    .unwrap_or_default();
                if code.is_empty() || name.is_empty() {
                    continue;
                }
                codes.push(
                    CountryCode::new(participant.value.clone(), code, name)
                        .with_doc_types(doc_types.clone()),
                );
            }
        }
        codes
    }
}

// ============================================================================
// CLIENT
// ============================================================================

/// Searches the reference directory once per supported document type.
#[derive(Debug, Clone)]
pub struct DirectoryClient {
    client: Client,
    base_url: String,
    doc_types: Vec<DocumentType>,
}

impl DirectoryClient {
    pub fn new(client: Client, base_url: impl Into<String>, doc_types: Vec<DocumentType>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            doc_types,
        }
    }

    /// Request document types of every supported query type.
    pub fn default_document_types() -> Vec<DocumentType> {
        QueryType::ALL
            .iter()
            .map(QueryType::request_document_type)
            .collect()
    }

    fn search_url(&self, doc_type: &DocumentType) -> String {
        format!(
            "{}/search/1.0/json?doctype={}",
            self.base_url,
            urlencoding::encode(&doc_type.key())
        )
    }

    /// Run one directory search for a single document type.
    pub async fn search(&self, doc_type: &DocumentType) -> Result<SearchResult, UpstreamError> {
        let url = self.search_url(doc_type);
        tracing::debug!(%url, "searching reference directory");

        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| request_failed(SERVICE, 0, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(request_failed(SERVICE, status.as_u16(), body));
        }

        response
            .json()
            .await
            .map_err(|e| invalid_response(SERVICE, format!("Failed to parse response: {}", e)))
    }
}

#[async_trait]
impl ListFetcher<CountryCode> for DirectoryClient {
    /// Search every configured document type and merge the results.
    ///
    /// Entries for the same participant and country are merged into one
    /// record holding the union of document types, in first-seen order.
    async fn fetch_all(&self) -> Result<Vec<CountryCode>, UpstreamError> {
        let mut merged: Vec<CountryCode> = Vec::new();
        for doc_type in &self.doc_types {
            let result = self.search(doc_type).await?;
            for code in result.country_codes(doc_type) {
                match merged
                    .iter_mut()
                    .find(|existing| existing.id == code.id && existing.code == code.code)
                {
                    Some(existing) => {
                        for doc_type in code.doc_types {
                            if !existing.doc_types.contains(&doc_type) {
                                existing.doc_types.push(doc_type);
                            }
                        }
                    }
                    None => {
                        tracing::info!(id = %code.id, code = %code.code, name = %code.name, "found country");
                        merged.push(code);
                    }
                }
            }
        }
        Ok(merged)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Query, routing::get, Json, Router};
    use std::collections::HashMap;
    use toop_core::QueryType;

    fn sample() -> serde_json::Value {
        serde_json::json!({
            "total-result-count": 4,
            "matches": [
                {
                    "participantID": { "scheme": "iso6523-actorid-upis", "value": "9999:norway2" },
                    "docTypes": [],
                    "entities": [
                        { "name": [ { "name": "Brønnøysundregistrene", "language": "no" } ], "countryCode": "NO" }
                    ]
                },
                {
                    "participantID": { "scheme": "other-scheme", "value": "9999:ignored" },
                    "entities": [ { "name": [ { "name": "Ignored" } ], "countryCode": "XX" } ]
                },
                {
                    "participantID": { "scheme": "iso6523-actorid-upis", "value": "9999:sweden" },
                    "entities": [
                        { "name": [], "countryCode": "SE" },
                        { "name": [ { "name": "Bolagsverket" } ], "countryCode": "SE" },
                        { "name": [ { "name": "No country" } ] }
                    ]
                },
                {
                    "participantID": { "scheme": "iso6523-actorid-upis", "value": "" },
                    "entities": [ { "name": [ { "name": "Blank" } ], "countryCode": "DK" } ]
                }
            ]
        })
    }

    #[test]
    fn test_country_codes_filters_incomplete_matches() {
        let result: SearchResult = serde_json::from_value(sample()).unwrap();
        let gbm = QueryType::Gbm.request_document_type();
        let codes = result.country_codes(&gbm);

        assert_eq!(codes.len(), 2);
        assert_eq!(codes[0].id, "9999:norway2");
        assert_eq!(codes[0].code, "NO");
        assert_eq!(codes[0].name, "Brønnøysundregistrene");
        assert_eq!(codes[0].doc_types, vec![gbm.clone()]);
        assert_eq!(codes[1].code, "SE");
        assert_eq!(codes[1].name, "Bolagsverket");
    }

    #[test]
    fn test_search_url_encodes_document_type() {
        let client = DirectoryClient::new(Client::new(), "https://dir.example/", vec![]);
        let url = client.search_url(&DocumentType::query_response());
        assert_eq!(
            url,
            "https://dir.example/search/1.0/json?doctype=toop-doctypeid-qns%3A%3AQueryResponse%3A%3Atoop-edm%3Av2.1"
        );
    }

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_fetch_all_merges_document_types() {
        let router = Router::new().route(
            "/search/1.0/json",
            get(|Query(params): Query<HashMap<String, String>>| async move {
                assert!(params.contains_key("doctype"));
                Json(serde_json::json!({
                    "matches": [{
                        "participantID": { "scheme": "iso6523-actorid-upis", "value": "9999:norway2" },
                        "entities": [ { "name": [ { "name": "Brreg" } ], "countryCode": "NO" } ]
                    }]
                }))
            }),
        );
        let base = serve(router).await;

        let gbm = QueryType::Gbm.request_document_type();
        let eproc = QueryType::EProcurement.request_document_type();
        let client = DirectoryClient::new(Client::new(), base, vec![gbm.clone(), eproc.clone()]);

        let codes = client.fetch_all().await.unwrap();
        assert_eq!(codes.len(), 1);
        assert_eq!(codes[0].doc_types, vec![gbm, eproc]);
    }

    #[tokio::test]
    async fn test_fetch_all_surfaces_http_errors() {
        let router = Router::new().route(
            "/search/1.0/json",
            get(|| async { (axum::http::StatusCode::BAD_GATEWAY, "upstream down") }),
        );
        let base = serve(router).await;
        let client = DirectoryClient::new(
            Client::new(),
            base,
            vec![QueryType::Gbm.request_document_type()],
        );

        let err = client.fetch_all().await.unwrap_err();
        assert!(matches!(
            err,
            UpstreamError::RequestFailed { status: 502, .. }
        ));
    }
}
