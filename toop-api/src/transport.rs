//! Connector transport adapter.
//!
//! Hands outbound messages to the connector over HTTP. The connector owns
//! delivery to the remote gateway and pushes inbound events back to
//! `POST /incoming`.

use async_trait::async_trait;
use serde::Serialize;
use toop_core::TransportError;
use toop_gateway::{MessageTransport, OutboundMessage, RoutingInfo};

#[derive(Debug, Serialize)]
struct OutgoingEnvelope<'a> {
    routing: &'a RoutingInfo,
    message: &'a OutboundMessage,
}

#[derive(Debug, Clone)]
pub struct ConnectorTransport {
    client: reqwest::Client,
    endpoint: String,
}

impl ConnectorTransport {
    pub fn new(client: reqwest::Client, connector_url: &str) -> Self {
        Self {
            client,
            endpoint: format!("{}/api/outgoing", connector_url.trim_end_matches('/')),
        }
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl MessageTransport for ConnectorTransport {
    async fn send(
        &self,
        message: &OutboundMessage,
        routing: &RoutingInfo,
    ) -> Result<(), TransportError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(&OutgoingEnvelope { routing, message })
            .send()
            .await
            .map_err(|e| TransportError::SubmitFailed {
                reason: e.to_string(),
            })?;

        let status = response.status();
        if !status.is_success() {
            let reason = response.text().await.unwrap_or_default();
            return Err(TransportError::Rejected {
                status: status.as_u16(),
                reason,
            });
        }

        tracing::debug!(
            id = %message.correlation_id(),
            receiver = %routing.receiver,
            "message handed to connector"
        );
        Ok(())
    }
}
