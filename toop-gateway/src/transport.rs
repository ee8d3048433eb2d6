use async_trait::async_trait;
use toop_core::TransportError;

use crate::message::{OutboundMessage, RoutingInfo};

/// Fire-and-forget submission to the message exchange.
///
/// `Ok(())` means the message was accepted for delivery, nothing more. Any
/// reply comes back later through [`crate::InboundHandler`].
#[async_trait]
pub trait MessageTransport: Send + Sync {
    async fn send(
        &self,
        message: &OutboundMessage,
        routing: &RoutingInfo,
    ) -> Result<(), TransportError>;
}
