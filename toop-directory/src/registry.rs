//! Business registry lookup client.

use async_trait::async_trait;
use reqwest::{Client, StatusCode};
use toop_cache::RecordFetcher;
use toop_core::{invalid_response, request_failed, Organization, UpstreamError};

const SERVICE: &str = "registry";

/// Main units first, then sub-units.
const UNIT_PATHS: [&str; 2] = ["enheter", "underenheter"];

#[derive(Debug, Clone)]
pub struct RegistryClient {
    client: Client,
    base_url: String,
}

impl RegistryClient {
    pub fn new(client: Client, base_url: impl Into<String>) -> Self {
        Self {
            client,
            base_url: base_url.into().trim_end_matches('/').to_string(),
        }
    }

    /// Fetch one organization by number.
    ///
    /// Returns `Ok(None)` when neither the main-unit nor the sub-unit register
    /// knows the number.
    pub async fn fetch_organization(
        &self,
        organization_number: &str,
    ) -> Result<Option<Organization>, UpstreamError> {
        let number = organization_number.trim();
        if number.is_empty() || !number.chars().all(|c| c.is_ascii_digit()) {
            tracing::debug!(organization_number, "not a registry number, skipping lookup");
            return Ok(None);
        }

        for path in UNIT_PATHS {
            if let Some(organization) = self.fetch_from(path, number).await? {
                return Ok(Some(organization));
            }
        }
        Ok(None)
    }

    async fn fetch_from(
        &self,
        path: &str,
        organization_number: &str,
    ) -> Result<Option<Organization>, UpstreamError> {
        let url = format!("{}/{}/{}", self.base_url, path, organization_number);
        let response = self
            .client
            .get(&url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| request_failed(SERVICE, 0, format!("HTTP request failed: {}", e)))?;

        let status = response.status();
        match status {
            s if s.is_success() => response
                .json()
                .await
                .map(Some)
                .map_err(|e| invalid_response(SERVICE, format!("Failed to parse response: {}", e))),
            StatusCode::NOT_FOUND | StatusCode::GONE => Ok(None),
            _ => {
                let body = response.text().await.unwrap_or_default();
                Err(request_failed(SERVICE, status.as_u16(), body))
            }
        }
    }
}

#[async_trait]
impl RecordFetcher<String, Organization> for RegistryClient {
    async fn fetch_one(&self, key: &String) -> Result<Option<Organization>, UpstreamError> {
        self.fetch_organization(key).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{extract::Path, http::StatusCode as AxumStatus, routing::get, Json, Router};

    async fn serve(router: Router) -> String {
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, router).await.unwrap();
        });
        format!("http://{}", addr)
    }

    fn registry() -> Router {
        Router::new()
            .route(
                "/enheter/:orgno",
                get(|Path(orgno): Path<String>| async move {
                    if orgno == "974760673" {
                        Ok(Json(serde_json::json!({
                            "organisasjonsnummer": "974760673",
                            "navn": "REGISTERENHETEN I BRØNNØYSUND"
                        })))
                    } else if orgno == "500000000" {
                        Err(AxumStatus::INTERNAL_SERVER_ERROR)
                    } else {
                        Err(AxumStatus::NOT_FOUND)
                    }
                }),
            )
            .route(
                "/underenheter/:orgno",
                get(|Path(orgno): Path<String>| async move {
                    if orgno == "974760681" {
                        Ok(Json(serde_json::json!({
                            "organisasjonsnummer": "974760681",
                            "navn": "AVDELING BRØNNØYSUND"
                        })))
                    } else {
                        Err(AxumStatus::NOT_FOUND)
                    }
                }),
            )
    }

    #[tokio::test]
    async fn test_main_unit_lookup() {
        let client = RegistryClient::new(Client::new(), serve(registry()).await);
        let org = client.fetch_organization("974760673").await.unwrap().unwrap();
        assert_eq!(org.name, "REGISTERENHETEN I BRØNNØYSUND");
    }

    #[tokio::test]
    async fn test_falls_back_to_sub_units() {
        let client = RegistryClient::new(Client::new(), serve(registry()).await);
        let org = client.fetch_organization("974760681").await.unwrap().unwrap();
        assert_eq!(org.organization_number, "974760681");
    }

    #[tokio::test]
    async fn test_unknown_number_is_none() {
        let client = RegistryClient::new(Client::new(), serve(registry()).await);
        assert_eq!(client.fetch_organization("123456789").await.unwrap(), None);
        assert_eq!(client.fetch_organization("not-a-number").await.unwrap(), None);
    }

    #[tokio::test]
    async fn test_server_error_is_reported() {
        let client = RegistryClient::new(Client::new(), serve(registry()).await);
        let err = client.fetch_organization("500000000").await.unwrap_err();
        assert!(matches!(err, UpstreamError::RequestFailed { status: 500, .. }));
    }
}
