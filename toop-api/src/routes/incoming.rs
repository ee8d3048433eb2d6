//! Inbound events pushed by the connector.

use axum::{extract::State, http::StatusCode, routing::post, Json, Router};
use toop_gateway::{InboundEvent, InboundOutcome};

use crate::state::AppState;

/// POST /incoming - Deliver a reply, error reply, or remote request
///
/// Always acknowledged once processed; rejected events are recorded in the
/// activity log rather than reported back to the connector.
#[utoipa::path(
    post,
    path = "/incoming",
    tag = "Connector",
    request_body = InboundEvent,
    responses(
        (status = 202, description = "Event processed"),
        (status = 422, description = "Malformed event"),
    ),
)]
pub async fn incoming(State(state): State<AppState>, Json(event): Json<InboundEvent>) -> StatusCode {
    let outcome = state.inbound.on_event(event).await;
    if let InboundOutcome::Rejected(reason) = &outcome {
        tracing::warn!(%reason, "inbound event rejected");
    } else {
        tracing::debug!(?outcome, "inbound event processed");
    }
    StatusCode::ACCEPTED
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/incoming", post(incoming))
}
