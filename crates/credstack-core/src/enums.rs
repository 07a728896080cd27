//! # Closed Value Sets
//!
//! Every string-enumerated field on the wire has exactly one Rust enum
//! here. Each enum is closed: decoding an unknown literal fails rather
//! than falling back to a catch-all, and every `match` over one of these
//! enums must be exhaustive.
//!
//! Wire literals are not uniform across the platform. `Mandatory` and
//! `CredentialVerificationMethod` use lowercase snake case,
//! `UserIdentifierType` and `OneClickStatus` use UPPER_SNAKE, and the
//! schema-facing enums use PascalCase (with `SSN` as the one acronym).
//! The literal for each variant is declared next to it and is the single
//! source for serde, [`Display`](std::fmt::Display) and
//! [`FromStr`](std::str::FromStr).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Declares a closed enum whose variants map one-to-one onto wire
/// literals, with `all()`, `as_str()`, `Display` and `FromStr`.
macro_rules! closed_enum {
    (
        $(#[$meta:meta])*
        pub enum $name:ident {
            $(
                $(#[$vmeta:meta])*
                $variant:ident => $wire:literal
            ),+ $(,)?
        }
    ) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        pub enum $name {
            $(
                $(#[$vmeta])*
                #[serde(rename = $wire)]
                $variant,
            )+
        }

        impl $name {
            /// Every variant, in declaration order.
            pub fn all() -> &'static [$name] {
                &[$(Self::$variant),+]
            }

            /// The wire literal for this variant.
            pub fn as_str(&self) -> &'static str {
                match self {
                    $(Self::$variant => $wire,)+
                }
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.as_str())
            }
        }

        impl FromStr for $name {
            type Err = CoreError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($wire => Ok(Self::$variant),)+
                    other => Err(CoreError::UnknownEnumValue {
                        kind: stringify!($name),
                        value: other.to_string(),
                    }),
                }
            }
        }
    };
}

closed_enum! {
    /// Whether a credential request must be satisfied.
    ///
    /// A tri-state rather than a boolean: `IfAvailable` asks the holder to
    /// share the credential when they have it without blocking the
    /// presentation when they don't.
    pub enum Mandatory {
        /// The presentation cannot be created without this credential.
        Yes => "yes",
        /// The credential is optional.
        No => "no",
        /// Share it if the holder has it; never block on it.
        IfAvailable => "if_available",
    }
}

impl Mandatory {
    /// Map the deprecated boolean `required` flag onto the tri-state.
    pub fn from_legacy_required(required: bool) -> Self {
        if required {
            Self::Yes
        } else {
            Self::No
        }
    }

    /// True only for [`Mandatory::Yes`]: the one state that blocks a
    /// presentation when the credential is missing.
    pub fn is_blocking(&self) -> bool {
        matches!(self, Self::Yes)
    }
}

closed_enum! {
    /// How a credential value is rendered to a viewer.
    pub enum DisplayFormat {
        /// Base64 or URL image.
        Image => "Image",
        /// Phone number.
        Phone => "Phone",
        /// US Social Security Number.
        Ssn => "SSN",
        /// Calendar date.
        Date => "Date",
        /// Postal address.
        Address => "Address",
        /// A low/high currency range.
        CurrencyRange => "CurrencyRange",
        /// Plain text.
        String => "String",
        /// US state.
        State => "State",
        /// Plain number.
        Number => "Number",
        /// A single currency amount.
        CurrencyAmount => "CurrencyAmount",
    }
}

closed_enum! {
    /// The input control used to collect a credential value from a user.
    pub enum InputFormat {
        /// Free text.
        Text => "Text",
        /// Date picker.
        Date => "Date",
        /// Pick one of a fixed option list.
        Select => "Select",
        /// Email address.
        Email => "Email",
        /// Phone number.
        Phone => "Phone",
        /// Social Security Number.
        Ssn => "SSN",
        /// Image upload.
        Image => "Image",
    }
}

impl InputFormat {
    /// Whether this input kind can only be rendered with an option list.
    pub fn requires_options(&self) -> bool {
        matches!(self, Self::Select)
    }
}

closed_enum! {
    /// How the data inside a credential was verified at issuance.
    pub enum CredentialVerificationMethod {
        SelfAttested => "self_attested",
        PhoneCarrier => "phone_carrier",
        Otp => "otp",
        Mixed => "mixed",
        CreditBureau => "credit_bureau",
    }
}

closed_enum! {
    /// Kind of contact identifier attached to a user.
    pub enum UserIdentifierType {
        Email => "EMAIL",
        Phone => "PHONE",
    }
}

closed_enum! {
    /// Platform event recorded by a receipt.
    pub enum ReceiptType {
        CredentialCreated => "CredentialCreated",
        PresentationRequestCreated => "PresentationRequestCreated",
        PresentationRequestShared => "PresentationRequestShared",
        PresentationCreated => "PresentationCreated",
        PresentationShared => "PresentationShared",
        CredentialStatusUpdated => "CredentialStatusUpdated",
    }
}

closed_enum! {
    /// Progress of a one-click presentation flow.
    pub enum OneClickStatus {
        Created => "CREATED",
        UserOptedOut => "USER_OPTED_OUT",
        SharedCredentials => "SHARED_CREDENTIALS",
    }
}
