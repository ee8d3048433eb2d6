//! Lookup request subjects and outcomes.

use crate::Organization;
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// Placeholder used for natural-person name fields the caller did not supply.
pub const UNKNOWN_NAME: &str = "Any";

/// Birth date used for natural persons when the caller did not supply one.
pub fn default_birth_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(1970, 1, 1).unwrap_or_default()
}

/// Optional attributes qualifying a lookup (natural-person details).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct SubjectAttributes {
    #[serde(default, rename = "firstname")]
    pub first_name: Option<String>,
    #[serde(default, rename = "lastname")]
    pub last_name: Option<String>,
    #[serde(default, rename = "birthdate")]
    pub birth_date: Option<NaiveDate>,
}

/// Who a query is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum DataSubject {
    LegalPerson {
        legal_id: String,
    },
    NaturalPerson {
        person_id: String,
        first_name: String,
        family_name: String,
        birth_date: NaiveDate,
    },
}

impl DataSubject {
    /// Build a subject from a fully qualified identifier (`NO/SE/123`).
    pub fn from_identifier(
        qualified_id: String,
        attributes: &SubjectAttributes,
        is_legal_person: bool,
    ) -> Self {
        if is_legal_person {
            DataSubject::LegalPerson {
                legal_id: qualified_id,
            }
        } else {
            DataSubject::NaturalPerson {
                person_id: qualified_id,
                first_name: attributes
                    .first_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                family_name: attributes
                    .last_name
                    .clone()
                    .unwrap_or_else(|| UNKNOWN_NAME.to_string()),
                birth_date: attributes.birth_date.unwrap_or_else(default_birth_date),
            }
        }
    }

    /// Identifier the subject is known by in the target registry: the last
    /// `/`-separated segment of the qualified id.
    pub fn local_identifier(&self) -> &str {
        let id = match self {
            DataSubject::LegalPerson { legal_id } => legal_id,
            DataSubject::NaturalPerson { person_id, .. } => person_id,
        };
        id.rsplit('/').next().unwrap_or(id)
    }

    pub fn is_legal_person(&self) -> bool {
        matches!(self, DataSubject::LegalPerson { .. })
    }
}

/// Outcome category of a synchronous lookup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum LookupStatus {
    Ok,
    NotFound,
    ServiceUnavailable,
    GatewayTimeout,
}

/// Result of `lookup_by_identifier`: status plus payload or error message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct LookupResponse {
    pub status: LookupStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub organization: Option<Organization>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_message: Option<String>,
}

impl LookupResponse {
    pub fn ok(organization: Organization) -> Self {
        Self {
            status: LookupStatus::Ok,
            organization: Some(organization),
            error_message: None,
        }
    }

    pub fn failure(status: LookupStatus, message: impl Into<String>) -> Self {
        Self {
            status,
            organization: None,
            error_message: Some(message.into()),
        }
    }

    pub fn not_found(message: impl Into<String>) -> Self {
        Self::failure(LookupStatus::NotFound, message)
    }

    pub fn service_unavailable(message: impl Into<String>) -> Self {
        Self::failure(LookupStatus::ServiceUnavailable, message)
    }

    pub fn gateway_timeout(message: impl Into<String>) -> Self {
        Self::failure(LookupStatus::GatewayTimeout, message)
    }

    pub fn is_ok(&self) -> bool {
        self.status == LookupStatus::Ok
    }
}
