//! # Error Types
//!
//! Errors raised while constructing or parsing core wire values. All
//! errors use `thiserror` for derive-based `Display` and `Error`.
//!
//! Parsing failures name the offending input so callers can surface
//! it directly to whoever produced the payload.

use thiserror::Error;

/// Top-level error type for `credstack-core`.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CoreError {
    /// A string did not name any member of a closed enumeration.
    #[error("unknown {kind} value: {value:?}")]
    UnknownEnumValue {
        /// Name of the enumeration (e.g. `"DisplayFormat"`).
        kind: &'static str,
        /// The rejected input.
        value: String,
    },

    /// A timestamp was not a decimal count of epoch milliseconds.
    #[error("invalid epoch-millisecond timestamp {value:?}: {reason}")]
    InvalidTimestamp {
        /// The rejected input.
        value: String,
        /// Why it was rejected.
        reason: String,
    },

    /// An identifier was not a valid UUID.
    #[error("invalid {kind} identifier {value:?}: {reason}")]
    InvalidIdentifier {
        /// Name of the identifier type.
        kind: &'static str,
        /// The rejected input.
        value: String,
        /// Parser message.
        reason: String,
    },
}
