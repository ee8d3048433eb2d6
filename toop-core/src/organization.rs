//! Organization records as served by the national business registry.
//!
//! Field names follow the registry's JSON so records deserialize directly
//! from the lookup service and round-trip unchanged through the gateway.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Organization {
    #[serde(rename = "organisasjonsnummer")]
    pub organization_number: String,
    #[serde(rename = "navn")]
    pub name: String,
    #[serde(rename = "organisasjonsform", default, skip_serializing_if = "Option::is_none")]
    pub organization_form: Option<CodeDescription>,
    #[serde(
        rename = "registreringsdatoEnhetsregisteret",
        default,
        skip_serializing_if = "Option::is_none"
    )]
    pub registration_date: Option<String>,
    #[serde(rename = "registrertIMvaregisteret", default)]
    pub vat_registered: bool,
    #[serde(rename = "stiftelsesdato", default, skip_serializing_if = "Option::is_none")]
    pub foundation_date: Option<String>,
    #[serde(rename = "naeringskode1", default, skip_serializing_if = "Option::is_none")]
    pub industry_code: Option<CodeDescription>,
    #[serde(rename = "forretningsadresse", default, skip_serializing_if = "Option::is_none")]
    pub business_address: Option<Address>,
}

impl Organization {
    pub fn new(organization_number: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            organization_number: organization_number.into(),
            name: name.into(),
            organization_form: None,
            registration_date: None,
            vat_registered: false,
            foundation_date: None,
            industry_code: None,
            business_address: None,
        }
    }

    /// VAT number as published by the registry (`<orgno>MVA`), if registered.
    pub fn vat_number(&self) -> Option<String> {
        self.vat_registered
            .then(|| format!("{}MVA", self.organization_number))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct CodeDescription {
    #[serde(rename = "kode")]
    pub code: String,
    #[serde(rename = "beskrivelse", default)]
    pub description: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "openapi", derive(utoipa::ToSchema))]
pub struct Address {
    #[serde(rename = "adresse", default)]
    pub lines: Vec<String>,
    #[serde(rename = "postnummer", default, skip_serializing_if = "Option::is_none")]
    pub postal_code: Option<String>,
    #[serde(rename = "poststed", default, skip_serializing_if = "Option::is_none")]
    pub postal_place: Option<String>,
    #[serde(rename = "kommune", default, skip_serializing_if = "Option::is_none")]
    pub municipality: Option<String>,
    #[serde(rename = "land", default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(rename = "landkode", default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
}
