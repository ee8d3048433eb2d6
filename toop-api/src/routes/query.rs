//! Synchronous organization lookups in other countries' registries.

use axum::{
    extract::{Path, Query, State},
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;
use serde::Deserialize;
use toop_core::{LookupResponse, Organization, SubjectAttributes};

use crate::error::{ApiError, ApiResult};
use crate::state::AppState;

/// Optional natural person attributes, passed through to the remote registry.
#[derive(Debug, Clone, Default, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::IntoParams))]
#[cfg_attr(feature = "openapi", into_params(parameter_in = Query))]
pub struct NaturalPersonParams {
    pub firstname: Option<String>,
    pub lastname: Option<String>,
    /// `YYYY-MM-DD`
    pub birthdate: Option<String>,
}

impl NaturalPersonParams {
    fn into_attributes(self) -> ApiResult<SubjectAttributes> {
        let birth_date = match self.birthdate.as_deref().filter(|d| !d.is_empty()) {
            Some(date) => Some(
                NaiveDate::parse_from_str(date, "%Y-%m-%d")
                    .map_err(|_| ApiError::invalid_format("birthdate", "YYYY-MM-DD"))?,
            ),
            None => None,
        };
        Ok(SubjectAttributes {
            first_name: self.firstname.filter(|n| !n.is_empty()),
            last_name: self.lastname.filter(|n| !n.is_empty()),
            birth_date,
        })
    }
}

fn into_result(response: LookupResponse) -> ApiResult<Json<Organization>> {
    match response.organization {
        Some(organization) if response.is_ok() => Ok(Json(organization)),
        _ => Err(ApiError::from_lookup(response.status, response.error_message)),
    }
}

/// GET /query/{countrycode}/legalperson/{id} - Look up a registered organization
#[utoipa::path(
    get,
    path = "/query/{countrycode}/legalperson/{id}",
    tag = "Query",
    params(
        ("countrycode" = String, Path, description = "Country whose registry is asked"),
        ("id" = String, Path, description = "Organization identifier in that registry"),
    ),
    responses(
        (status = 200, description = "Organization found", body = Organization),
        (status = 404, description = "Unknown country or organization", body = ApiError),
        (status = 503, description = "Reference data or transport unavailable", body = ApiError),
        (status = 504, description = "No reply in time", body = ApiError),
    ),
)]
pub async fn legal_person(
    State(state): State<AppState>,
    Path((country_code, id)): Path<(String, String)>,
) -> ApiResult<Json<Organization>> {
    let response = state
        .correlator
        .lookup_by_identifier(&country_code, &id, &SubjectAttributes::default(), true)
        .await;
    into_result(response)
}

/// GET /query/{countrycode}/naturalperson/{id} - Look up by a natural person
#[utoipa::path(
    get,
    path = "/query/{countrycode}/naturalperson/{id}",
    tag = "Query",
    params(
        ("countrycode" = String, Path, description = "Country whose registry is asked"),
        ("id" = String, Path, description = "Person identifier in that registry"),
        NaturalPersonParams,
    ),
    responses(
        (status = 200, description = "Organization found", body = Organization),
        (status = 400, description = "Malformed birth date", body = ApiError),
        (status = 404, description = "Unknown country or person", body = ApiError),
        (status = 503, description = "Reference data or transport unavailable", body = ApiError),
        (status = 504, description = "No reply in time", body = ApiError),
    ),
)]
pub async fn natural_person(
    State(state): State<AppState>,
    Path((country_code, id)): Path<(String, String)>,
    Query(params): Query<NaturalPersonParams>,
) -> ApiResult<Json<Organization>> {
    let attributes = params.into_attributes()?;
    let response = state
        .correlator
        .lookup_by_identifier(&country_code, &id, &attributes, false)
        .await;
    into_result(response)
}

pub fn create_router() -> Router<AppState> {
    Router::new()
        .route("/query/:countrycode/legalperson/:id", get(legal_person))
        .route("/query/:countrycode/naturalperson/:id", get(natural_person))
}
