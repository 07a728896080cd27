//! # credstack-core — Wire Types for the Wallet Platform
//!
//! Shared contract crate for every service that talks to the credstack
//! core, tokenization, and schema-resolver services. It contains only
//! data shapes and the small amount of logic that belongs with them
//! (tri-state requirement mapping, expiry checks, receipt tagging).
//!
//! ## Key Design Principles
//!
//! 1. **Closed enumerations.** Every string-enumerated wire field decodes
//!    into an exhaustive Rust enum (`enums`). Unknown literals are errors.
//!
//! 2. **Identifier newtypes.** UUID references are typed by what they
//!    point at (`identity`), so a `BrandUuid` cannot be passed where a
//!    `UserUuid` is expected.
//!
//! 3. **One shape per entity.** The core service's records evolved over
//!    several releases. Each DTO here is the latest superset shape;
//!    fields added late are defaulted on decode so older payloads still
//!    parse.
//!
//! 4. **Tagged receipts.** `ReceiptDto` carries an adjacently tagged
//!    `ReceiptData` keyed by `ReceiptType`, never a structural union.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `credstack-*` crates (leaf of the DAG).
//! - No `unsafe` code, no `.unwrap()` outside tests.
//! - All DTOs derive `Debug`, `Clone`, `Serialize`, `Deserialize`.

pub mod account;
pub mod brand;
pub mod credential;
pub mod enums;
pub mod error;
pub mod identity;
pub mod one_click;
pub mod presentation;
pub mod receipt;
pub mod temporal;
pub mod token;
pub mod wire;

// Re-export primary types for ergonomic imports.
pub use account::{
    AuthenticationInfo, AuthenticationResult, JwtPayload, SuccessDto, UserDto,
    VerificationCodeMessageOptions, VerificationCodeOptions,
};
pub use brand::{BrandDto, CardDetailsDto, CardDto, CustomerDto, OfferDto, PartnerOfferDto};
pub use credential::{CredentialDataOptions, CredentialDto, CredentialsOptions, CredentialsResult};
pub use enums::{
    CredentialVerificationMethod, DisplayFormat, InputFormat, Mandatory, OneClickStatus,
    ReceiptType, UserIdentifierType,
};
pub use error::CoreError;
pub use identity::{
    BrandUuid, CredentialUuid, CustomerUuid, OfferUuid, OneClickUuid, PresentationRequestUuid,
    PresentationUuid, ReceiptUuid, TokenUuid, UserIdentifierUuid, UserUuid,
};
pub use one_click::{
    OneClickDbDto, OneClickDto, OneClickIdentifier, OneClickIdentifierMetadata, OneClickMetadata,
    UserIdentifierDto,
};
pub use presentation::{
    CredentialRequestDto, PresentationCredentialOption, PresentationDto,
    PresentationOneClickOptions, PresentationOptions, PresentationRequestDto,
    PresentationRequestMetadataDto,
};
pub use receipt::{
    CredentialCreatedReceiptData, CredentialStatusUpdatedReceiptData,
    PresentationCreatedReceiptData, PresentationRequestCreatedReceiptData,
    PresentationRequestSharedReceiptData, PresentationSharedReceiptData, ReceiptCredentialRef,
    ReceiptData, ReceiptDto,
};
pub use temporal::EpochMillis;
pub use token::{MinifiedText, TokenData, TokenDto};
