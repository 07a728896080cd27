//! # Data-Tokenization Service Records

use serde::{Deserialize, Serialize};

use crate::identity::TokenUuid;

/// Opaque tokenized value.
pub type TokenData = String;

/// A tokenized value and the UUID it is stored under.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TokenDto {
    pub value: TokenData,
    pub uuid: TokenUuid,
}

/// A shortened text (typically a link) issued by the core service.
///
/// Unlike most core records, `expiresAt` is a JSON number here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MinifiedText {
    pub text: String,
    pub uuid: String,
    pub expires_at: i64,
}
