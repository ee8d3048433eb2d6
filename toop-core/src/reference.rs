//! Reference data: participant/country codes and the query types they serve.

use crate::{DocumentType, Keyed};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// One participant entry from the reference directory, bound to the country
/// it serves and the document types it accepts.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CountryCode {
    /// Participant identifier value, e.g. `9999:norway2`.
    pub id: String,
    /// ISO 3166 country code, e.g. `NO`.
    pub code: String,
    /// Display name of the registering entity.
    pub name: String,
    #[serde(default, rename = "docTypes")]
    pub doc_types: Vec<DocumentType>,
}

impl CountryCode {
    pub fn new(id: impl Into<String>, code: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            code: code.into(),
            name: name.into(),
            doc_types: Vec::new(),
        }
    }

    pub fn with_doc_types(mut self, doc_types: Vec<DocumentType>) -> Self {
        self.doc_types = doc_types;
        self
    }

    pub fn supports(&self, doc_type: &DocumentType) -> bool {
        self.doc_types.iter().any(|d| d == doc_type)
    }

    pub fn is_country(&self, country: &str) -> bool {
        self.code.eq_ignore_ascii_case(country)
    }
}

impl Keyed for CountryCode {
    fn cache_key(&self) -> String {
        self.code.to_ascii_uppercase()
    }
}

/// Kind of query a country can be asked, each bound to one request document type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
#[serde(rename_all = "lowercase")]
pub enum QueryType {
    /// Registered organization lookup.
    Gbm,
    EProcurement,
}

impl QueryType {
    pub const ALL: [QueryType; 2] = [QueryType::Gbm, QueryType::EProcurement];

    pub fn request_document_type(&self) -> DocumentType {
        match self {
            QueryType::Gbm => DocumentType::registered_organization_request(),
            QueryType::EProcurement => DocumentType::eprocurement_request(),
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            QueryType::Gbm => "gbm",
            QueryType::EProcurement => "eprocurement",
        }
    }
}

impl fmt::Display for QueryType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for QueryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "gbm" => Ok(QueryType::Gbm),
            "eprocurement" => Ok(QueryType::EProcurement),
            other => Err(format!("Unknown query type: {}", other)),
        }
    }
}
