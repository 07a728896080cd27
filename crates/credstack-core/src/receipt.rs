//! # Receipts
//!
//! Receipts are the audit trail of platform events. The `type` field
//! selects exactly one payload shape for `data`, so [`ReceiptData`] is
//! an adjacently tagged enum: on the wire the tag sits next to `data`
//! at the top level of the receipt, and decoding never has to guess
//! between structurally overlapping payloads.

use serde::{Deserialize, Serialize};

use crate::enums::ReceiptType;
use crate::identity::{BrandUuid, CredentialUuid, PresentationRequestUuid, PresentationUuid, ReceiptUuid, UserUuid};
use crate::temporal::EpochMillis;

/// A credential referenced by a presentation receipt.
///
/// Both the storage `uuid` and the wallet-facing `id` are kept; the `id`
/// is what the wallet uses everywhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReceiptCredentialRef {
    pub uuid: CredentialUuid,
    pub id: String,
    #[serde(rename = "type")]
    pub credential_type: String,
    pub issuer: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialCreatedReceiptData {
    pub credential_uuid: CredentialUuid,
    pub credential_id: String,
    pub credential_type: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationRequestCreatedReceiptData {
    /// Whether the requesting user already holds matching credentials.
    #[serde(rename = "match")]
    pub is_match: bool,
    pub request_id: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PresentationRequestSharedReceiptData {
    pub id: String,
    pub uuid: PresentationRequestUuid,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationCreatedReceiptData {
    pub uuid: PresentationUuid,
    pub presentation_request_uuid: PresentationRequestUuid,
    pub credentials: Vec<ReceiptCredentialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_tracking_param: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PresentationSharedReceiptData {
    pub uuid: PresentationUuid,
    pub credentials: Vec<ReceiptCredentialRef>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verified_tracking_param: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CredentialStatusUpdatedReceiptData {
    pub credential_id: String,
    pub status: String,
}

/// Receipt payload, one shape per [`ReceiptType`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", content = "data")]
pub enum ReceiptData {
    CredentialCreated(CredentialCreatedReceiptData),
    PresentationRequestCreated(PresentationRequestCreatedReceiptData),
    PresentationRequestShared(PresentationRequestSharedReceiptData),
    PresentationCreated(PresentationCreatedReceiptData),
    PresentationShared(PresentationSharedReceiptData),
    CredentialStatusUpdated(CredentialStatusUpdatedReceiptData),
}

impl ReceiptData {
    /// The tag this payload is written under.
    pub fn receipt_type(&self) -> ReceiptType {
        match self {
            Self::CredentialCreated(_) => ReceiptType::CredentialCreated,
            Self::PresentationRequestCreated(_) => ReceiptType::PresentationRequestCreated,
            Self::PresentationRequestShared(_) => ReceiptType::PresentationRequestShared,
            Self::PresentationCreated(_) => ReceiptType::PresentationCreated,
            Self::PresentationShared(_) => ReceiptType::PresentationShared,
            Self::CredentialStatusUpdated(_) => ReceiptType::CredentialStatusUpdated,
        }
    }

    /// Credentials referenced by a presentation receipt; empty for other kinds.
    pub fn shared_credentials(&self) -> &[ReceiptCredentialRef] {
        match self {
            Self::PresentationCreated(d) => &d.credentials,
            Self::PresentationShared(d) => &d.credentials,
            _ => &[],
        }
    }
}

/// A receipt record returned from the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReceiptDto {
    pub uuid: ReceiptUuid,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub user_uuid: UserUuid,
    pub brand_uuid: BrandUuid,
    #[serde(flatten)]
    pub data: ReceiptData,
}

impl ReceiptDto {
    pub fn receipt_type(&self) -> ReceiptType {
        self.data.receipt_type()
    }
}
