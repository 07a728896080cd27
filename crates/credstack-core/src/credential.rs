//! # Credentials
//!
//! Issuance option bags sent to the core service's `/credentials`
//! endpoint and the credential records it returns.
//!
//! Credential `data` is free-form JSON. Its shape is governed by the
//! credential type's schema, which lives in `credstack-schema`.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::CredentialVerificationMethod;
use crate::identity::BrandUuid;
use crate::temporal::{self, EpochMillis};

/// One credential to issue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDataOptions {
    #[serde(rename = "type")]
    pub credential_type: String,
    pub data: Map<String, Value>,
    /// Numeric on the wire, unlike record timestamps.
    #[serde(
        default,
        with = "temporal::as_number",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<EpochMillis>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_method: Option<CredentialVerificationMethod>,
}

/// Options for issuing credentials to a user identified by email or phone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub credentials: Vec<CredentialDataOptions>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub partner_uuid: Option<BrandUuid>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

/// Returned by the core service after issuing credentials.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialsResult {
    pub credentials: Vec<CredentialDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tracking_id: Option<String>,
}

/// A credential record returned from the core service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialDto {
    pub id: String,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub issuance_date: EpochMillis,
    pub expiration_date: Option<EpochMillis>,
    pub data: Map<String, Value>,
    /// The issuing brand.
    pub issuer_uuid: BrandUuid,
}

impl CredentialDto {
    /// Whether the credential has expired at `now`. Credentials without
    /// an expiration date never expire.
    pub fn is_expired_at(&self, now: EpochMillis) -> bool {
        self.expiration_date.is_some_and(|exp| exp.is_past_at(now))
    }
}
