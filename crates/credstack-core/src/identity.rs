//! # Identifier Newtypes
//!
//! UUID-keyed records on the core service reference each other by UUID
//! string. Each kind of reference gets its own newtype so a brand UUID
//! cannot be passed where a user UUID is expected.
//!
//! All newtypes serialize as the bare hyphenated UUID string. Human-facing
//! `id` fields (credential ids, presentation request ids) are not UUIDs
//! and stay plain `String`s on the DTOs.

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::CoreError;

macro_rules! uuid_newtype {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub struct $name(Uuid);

        impl $name {
            /// Create a new random identifier.
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wrap an existing UUID.
            pub fn from_uuid(id: Uuid) -> Self {
                Self(id)
            }

            /// Access the underlying UUID.
            pub fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl From<Uuid> for $name {
            fn from(id: Uuid) -> Self {
                Self(id)
            }
        }

        impl std::fmt::Display for $name {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.0)
            }
        }

        impl std::str::FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s)
                    .map(Self)
                    .map_err(|e| CoreError::InvalidIdentifier {
                        kind: stringify!($name),
                        value: s.to_string(),
                        reason: e.to_string(),
                    })
            }
        }
    };
}

uuid_newtype! {
    /// A wallet user.
    UserUuid
}

uuid_newtype! {
    /// A paying customer that owns one or more brands.
    CustomerUuid
}

uuid_newtype! {
    /// A brand: the issuing or requesting party in every flow.
    BrandUuid
}

uuid_newtype! {
    /// The storage identity of a credential (distinct from its `id`).
    CredentialUuid
}

uuid_newtype! {
    /// A presentation request.
    PresentationRequestUuid
}

uuid_newtype! {
    /// A presentation created in response to a request.
    PresentationUuid
}

uuid_newtype! {
    /// An audit receipt.
    ReceiptUuid
}

uuid_newtype! {
    /// A partner offer.
    OfferUuid
}

uuid_newtype! {
    /// An email or phone identifier registered to a user.
    UserIdentifierUuid
}

uuid_newtype! {
    /// A one-click presentation session.
    OneClickUuid
}

uuid_newtype! {
    /// A tokenized value held by the data-tokenization service.
    TokenUuid
}
