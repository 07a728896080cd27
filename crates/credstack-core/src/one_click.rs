//! # User Identifiers and One-Click Sessions
//!
//! A one-click session lets a brand pre-provision a presentation for a
//! user reachable at a known phone number or email address. The session
//! carries the credential values to be issued and shared in one step.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::enums::{OneClickStatus, UserIdentifierType};
use crate::identity::{
    CredentialUuid, OneClickUuid, PresentationRequestUuid, PresentationUuid, UserIdentifierUuid,
    UserUuid,
};
use crate::presentation::PresentationRequestDto;
use crate::temporal::EpochMillis;

/// An email address or phone number registered to a user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserIdentifierDto {
    pub uuid: UserIdentifierUuid,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    #[serde(rename = "type")]
    pub identifier_type: UserIdentifierType,
    pub value: String,
    pub user_uuid: UserUuid,
    /// The credential issued for this identifier, once there is one.
    pub credential_uuid: Option<CredentialUuid>,
    pub is_issued: bool,
    pub is_verified: bool,
    pub issued_phone_carrier_credentials: Option<bool>,
}

/// How the one-click user is reached: exactly one of phone or email.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OneClickIdentifier {
    Phone(String),
    Email(String),
}

impl OneClickIdentifier {
    /// The identifier kind this value would be stored as.
    pub fn identifier_type(&self) -> UserIdentifierType {
        match self {
            Self::Phone(_) => UserIdentifierType::Phone,
            Self::Email(_) => UserIdentifierType::Email,
        }
    }

    /// The phone number or email address.
    pub fn value(&self) -> &str {
        match self {
            Self::Phone(v) | Self::Email(v) => v,
        }
    }
}

/// Verification metadata attached to the session's identifiers.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneClickIdentifierMetadata {
    pub verification_method: Map<String, Value>,
}

/// Per-credential-type metadata for the values in a one-click session.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneClickMetadata {
    pub id: Map<String, Value>,
    pub verification_method: Map<String, Value>,
    pub status: Map<String, Value>,
    pub expiration_date: Map<String, Value>,
    pub issuance_date: Map<String, Value>,
    pub issuer_uuid: Map<String, Value>,
    pub identifiers: OneClickIdentifierMetadata,
}

/// The body used to provision a one-click session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OneClickDto {
    pub identifiers: OneClickIdentifier,
    pub credentials: Map<String, Value>,
    pub metadata: OneClickMetadata,
}

/// A one-click session as stored by the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OneClickDbDto {
    pub uuid: OneClickUuid,
    pub id: String,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub user_identifier_uuid: UserIdentifierUuid,
    pub presentation_request_uuid: PresentationRequestUuid,
    pub presentation_uuid: Option<PresentationUuid>,
    pub status: OneClickStatus,
    pub presentation_request: PresentationRequestDto,
    pub user_identifier: UserIdentifierDto,
}

impl OneClickDbDto {
    /// Whether the session has reached a terminal status.
    pub fn is_settled(&self) -> bool {
        !matches!(self.status, OneClickStatus::Created)
    }
}
