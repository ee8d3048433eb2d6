//! Reference data endpoints: country codes and document types.

use axum::{
    extract::{Path, State},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::get,
    Json, Router,
};
use serde::Serialize;
use toop_core::{CountryCode, DocumentType, QueryType};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// JSON list, or `204 No Content` when there is nothing to list.
fn list_or_no_content<T: Serialize>(items: Vec<T>) -> Response {
    if items.is_empty() {
        StatusCode::NO_CONTENT.into_response()
    } else {
        Json(items).into_response()
    }
}

/// GET /countrycodes - Every participant known to the reference directory
#[utoipa::path(
    get,
    path = "/countrycodes",
    tag = "Reference data",
    responses(
        (status = 200, description = "Known participants", body = Vec<CountryCode>),
        (status = 204, description = "Reference data not loaded"),
    ),
)]
pub async fn country_codes(State(state): State<AppState>) -> Response {
    list_or_no_content(state.countries.country_codes().await)
}

/// GET /countrycodes/{querytype} - One participant per country for a query type
#[utoipa::path(
    get,
    path = "/countrycodes/{querytype}",
    tag = "Reference data",
    params(
        ("querytype" = String, Path, description = "Query type: gbm or eprocurement"),
    ),
    responses(
        (status = 200, description = "Countries able to answer the query", body = Vec<CountryCode>),
        (status = 204, description = "No country answers this query type"),
        (status = 400, description = "Unknown query type", body = ApiError),
    ),
)]
pub async fn country_codes_for_query_type(
    State(state): State<AppState>,
    Path(query_type): Path<String>,
) -> ApiResult<Response> {
    let query_type = query_type
        .parse::<QueryType>()
        .map_err(ApiError::invalid_input)?;
    Ok(list_or_no_content(
        state.countries.country_codes_for(query_type).await,
    ))
}

/// GET /documenttypes/{countrycode} - Document types accepted in a country
#[utoipa::path(
    get,
    path = "/documenttypes/{countrycode}",
    tag = "Reference data",
    params(
        ("countrycode" = String, Path, description = "ISO 3166 country code"),
    ),
    responses(
        (status = 200, description = "Accepted document types", body = Vec<DocumentType>),
        (status = 204, description = "No participant in this country"),
    ),
)]
pub async fn document_types(
    State(state): State<AppState>,
    Path(country_code): Path<String>,
) -> Response {
    list_or_no_content(state.countries.document_types(&country_code).await)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/countrycodes", get(country_codes))
        .route("/countrycodes/:querytype", get(country_codes_for_query_type))
        .route("/documenttypes/:countrycode", get(document_types))
}
