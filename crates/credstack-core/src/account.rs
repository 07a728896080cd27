//! # Users, Authentication and Verification Codes
//!
//! Records describing a wallet user and the result of authenticating
//! one against the core service, plus the option bags used to request
//! verification codes by email or SMS.

use serde::{Deserialize, Serialize};

use crate::identity::UserUuid;
use crate::temporal::EpochMillis;

/// Options for creating a verification code.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCodeOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
}

/// Options for sending a verification code message.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VerificationCodeMessageOptions {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    /// Query string appended to the verification link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub verification_link_params: Option<String>,
}

/// A wallet user as returned by the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserDto {
    pub uuid: UserUuid,
    pub created_at: EpochMillis,
    pub updated_at: EpochMillis,
    pub phone_numbers: Vec<String>,
    pub email_addresses: Vec<String>,
}

/// Generic acknowledgement for endpoints with nothing else to return.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SuccessDto {
    pub success: bool,
}

/// Claims carried in the access token issued on authentication.
///
/// `iat` and `exp` are Unix seconds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JwtPayload {
    pub iat: i64,
    pub exp: i64,
    pub sub: String,
    pub jti: String,
}

impl JwtPayload {
    /// Whether the token has expired at `now_secs` (Unix seconds).
    pub fn is_expired_at(&self, now_secs: i64) -> bool {
        now_secs >= self.exp
    }
}

/// The strategy and claims behind an access token.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AuthenticationInfo {
    pub strategy: String,
    pub payload: JwtPayload,
}

/// The result of authenticating a user with the core service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AuthenticationResult {
    pub access_token: String,
    pub authentication: AuthenticationInfo,
    pub user: UserDto,
}
