//! # Presentation Requests and Presentations
//!
//! A brand publishes a presentation request listing the credential types
//! it wants; the user answers with a presentation that shares a selection
//! of their credentials. One-click requests let the user answer through a
//! pre-provisioned session instead of naming the request.

use serde::{Deserialize, Serialize};

use crate::account::UserDto;
use crate::brand::BrandDto;
use crate::credential::CredentialDto;
use crate::enums::Mandatory;
use crate::identity::{BrandUuid, OneClickUuid, PresentationRequestUuid, PresentationUuid, UserUuid};
use crate::temporal::EpochMillis;
use crate::wire::present_or_null;

/// A single credential type requested by a presentation request.
///
/// `children` nests alternative or supporting credential types under the
/// parent request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialRequestDto {
    #[serde(rename = "type")]
    pub credential_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub issuers: Option<Vec<String>>,
    /// Superseded by `mandatory`; still sent by older request authors.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub required: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mandatory: Option<Mandatory>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub allow_user_input: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<CredentialRequestDto>>,
}

impl CredentialRequestDto {
    /// The tri-state requirement for this request.
    ///
    /// `mandatory` wins when present. Otherwise the deprecated `required`
    /// flag is mapped, and a request carrying neither is optional.
    pub fn effective_mandatory(&self) -> Mandatory {
        match (self.mandatory, self.required) {
            (Some(m), _) => m,
            (None, Some(required)) => Mandatory::from_legacy_required(required),
            (None, None) => Mandatory::No,
        }
    }

    /// Whether credentials from `issuer` satisfy this request. A request
    /// with no issuer list accepts any issuer.
    pub fn accepts_issuer(&self, issuer: &str) -> bool {
        match &self.issuers {
            Some(issuers) if !issuers.is_empty() => issuers.iter().any(|i| i == issuer),
            _ => true,
        }
    }

    /// This request followed by all of its descendants, depth first.
    pub fn flatten(&self) -> Vec<&CredentialRequestDto> {
        let mut out = vec![self];
        for child in self.children.iter().flatten() {
            out.extend(child.flatten());
        }
        out
    }
}

/// A presentation request record returned from the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequestDto {
    pub uuid: PresentationRequestUuid,
    pub id: String,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub credential_requests: Vec<CredentialRequestDto>,
    pub expiration_date: Option<EpochMillis>,
    pub requesting_brand: BrandDto,
    pub brand: BrandDto,
    pub issuing_brands: Vec<BrandDto>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub description: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub title: Option<Option<String>>,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub redirect_url: Option<Option<String>>,
    #[serde(default)]
    pub is_one_click: bool,
}

impl PresentationRequestDto {
    /// Credential types the holder must share, including nested requests.
    pub fn blocking_credential_types(&self) -> Vec<&str> {
        self.credential_requests
            .iter()
            .flat_map(|r| r.flatten())
            .filter(|r| r.effective_mandatory().is_blocking())
            .map(|r| r.credential_type.as_str())
            .collect()
    }

    /// Whether the request has expired at `now`.
    pub fn is_expired_at(&self, now: EpochMillis) -> bool {
        self.expiration_date.is_some_and(|exp| exp.is_past_at(now))
    }
}

/// Non-sensitive metadata about a presentation request, readable
/// without authentication.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequestMetadataDto {
    pub uuid: PresentationRequestUuid,
    pub id: String,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub expiration_date: Option<EpochMillis>,
    pub requesting_brand: BrandDto,
    pub issuing_brands: Vec<BrandDto>,
}

impl From<&PresentationRequestDto> for PresentationRequestMetadataDto {
    fn from(req: &PresentationRequestDto) -> Self {
        Self {
            uuid: req.uuid,
            id: req.id.clone(),
            created_at: req.created_at,
            updated_at: req.updated_at,
            expiration_date: req.expiration_date,
            requesting_brand: req.requesting_brand.clone(),
            issuing_brands: req.issuing_brands.clone(),
        }
    }
}

/// A credential selected for sharing in a presentation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationCredentialOption {
    pub id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub children: Option<Vec<PresentationCredentialOption>>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub credential_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_new_credential: Option<bool>,
}

/// Options for creating a presentation.
///
/// The user is inferred from the auth token and the brand from the
/// presentation request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationOptions {
    pub credentials: Vec<PresentationCredentialOption>,
    pub presentation_request_uuid: PresentationRequestUuid,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<Option<EpochMillis>>,
    /// Conversion tracking value; named after the `verified` query param.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_tracking_param: Option<String>,
}

/// Options for creating a presentation through a one-click session.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationOneClickOptions {
    pub credentials: Vec<PresentationCredentialOption>,
    pub one_click_uuid: OneClickUuid,
    #[serde(
        default,
        deserialize_with = "present_or_null",
        skip_serializing_if = "Option::is_none"
    )]
    pub expiration_date: Option<Option<EpochMillis>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_tracking_param: Option<String>,
}

/// A presentation record returned from the core service.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationDto {
    pub uuid: PresentationUuid,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub user_uuid: UserUuid,
    pub brand_uuid: BrandUuid,
    pub presentation_request_uuid: PresentationRequestUuid,
    pub credential_ids: Vec<String>,
    pub expiration_date: Option<EpochMillis>,
    pub brand: BrandDto,
    pub user: UserDto,
    pub presentation_request: PresentationRequestDto,
    pub credentials: Vec<CredentialDto>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_tracking_param: Option<String>,
}

impl PresentationDto {
    /// Blocking credential types of the request that this presentation
    /// did not share.
    pub fn missing_blocking_types(&self) -> Vec<&str> {
        self.presentation_request
            .blocking_credential_types()
            .into_iter()
            .filter(|t| !self.credentials.iter().any(|c| c.credential_type == *t))
            .collect()
    }
}
