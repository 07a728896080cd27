//! # Customers, Brands, Cards and Offers
//!
//! A customer owns brands; a brand issues credentials and requests
//! presentations. Cards and offers are the wallet-facing views of the
//! brands a user has a relationship with.

use serde::{Deserialize, Serialize};

use crate::credential::CredentialDto;
use crate::identity::{BrandUuid, CustomerUuid, OfferUuid};
use crate::presentation::PresentationRequestDto;
use crate::temporal::EpochMillis;

/// The customer record returned from the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CustomerDto {
    pub uuid: CustomerUuid,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub name: String,
}

/// The brand record returned from the core service.
///
/// Nullable URLs serialize as explicit `null`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BrandDto {
    pub uuid: BrandUuid,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub issuer_name: String,
    pub receiver_name: String,
    pub card_image_url: String,
    pub logo_image_url: Option<String>,
    pub homepage_url: Option<String>,
    pub terms_url: Option<String>,
    pub privacy_url: Option<String>,
    pub customer: CustomerDto,
    pub client_url: Option<String>,
    pub is_concierge_enabled: bool,
    pub is_partner_enabled: bool,
    #[serde(default)]
    pub primary_color: Option<String>,
    #[serde(default)]
    pub created_by: Option<String>,
}

impl BrandDto {
    /// The wallet card summarizing this brand as an issuer.
    pub fn to_card(&self) -> CardDto {
        CardDto {
            issuer_uuid: self.uuid,
            issuer_name: self.issuer_name.clone(),
            card_image_url: self.card_image_url.clone(),
        }
    }
}

/// A brand that has issued one or more credentials to the user.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDto {
    pub issuer_uuid: BrandUuid,
    pub issuer_name: String,
    pub card_image_url: String,
}

/// An offer made through a brand relationship.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PartnerOfferDto {
    pub reward: String,
    pub description: String,
    pub presentation_request_id: String,
    pub receiver_brand: BrandDto,
}

/// Everything one brand has issued to the user.
///
/// `createdAt` is the first issuance by the brand; `updatedAt` the most
/// recent credential update.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CardDetailsDto {
    pub issuer_uuid: BrandUuid,
    pub issuer_name: String,
    pub card_image_url: String,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub credentials: Vec<CredentialDto>,
    pub offers: Vec<PartnerOfferDto>,
}

/// An offer record as stored by the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct OfferDto {
    pub uuid: OfferUuid,
    pub id: String,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub reward: Option<String>,
    pub description: Option<String>,
    pub is_active_offer: bool,
    pub receiver_brand: BrandDto,
    pub presentation_request: PresentationRequestDto,
}
