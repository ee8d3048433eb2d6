//! Activity log endpoint.

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use toop_gateway::ActivityEntry;

use crate::state::AppState;

/// GET /log - Recent gateway activity, oldest first
#[utoipa::path(
    get,
    path = "/log",
    tag = "Activity",
    responses(
        (status = 200, description = "Recent activity", body = Vec<ActivityEntry>),
        (status = 204, description = "Nothing logged yet"),
    ),
)]
pub async fn activity_log(State(state): State<AppState>) -> Response {
    let entries = state.activity.entries();
    if entries.is_empty() {
        return StatusCode::NO_CONTENT.into_response();
    }
    Json(entries).into_response()
}

pub fn create_router() -> Router<AppState> {
    Router::new().route("/log", get(activity_log))
}
