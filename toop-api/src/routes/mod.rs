//! HTTP routes.

pub mod health;
pub mod incoming;
pub mod log;
pub mod query;
pub mod reference;

use axum::{response::IntoResponse, routing::get, Json, Router};
use tower_http::trace::TraceLayer;
use utoipa::OpenApi;

use crate::openapi::ApiDoc;
use crate::state::AppState;

/// Handler for /openapi.json endpoint.
async fn openapi_json() -> impl IntoResponse {
    Json(ApiDoc::openapi())
}

/// Build the full application router.
pub fn create_api_router(state: AppState) -> Router {
    #[allow(unused_mut)]
    let mut router = Router::new()
        .merge(health::create_router())
        .merge(reference::create_router())
        .merge(log::create_router())
        .merge(query::create_router())
        .merge(incoming::create_router())
        .route("/openapi.json", get(openapi_json));

    #[cfg(feature = "swagger-ui")]
    {
        use utoipa_swagger_ui::SwaggerUi;
        router = router.merge(
            SwaggerUi::new("/swagger-ui").url("/api-docs/openapi.json", ApiDoc::openapi()),
        );
    }

    router.layer(TraceLayer::new_for_http()).with_state(state)
}
