//! Serde helpers for the core service's field conventions.

use serde::{Deserialize, Deserializer};

/// Distinguishes an absent optional field from one sent as `null`.
///
/// Pair with `#[serde(default, skip_serializing_if = "Option::is_none")]`
/// on an `Option<Option<T>>`: absent decodes to `None`, `null` to
/// `Some(None)`, and both encode back the way they arrived.
pub fn present_or_null<'de, T, D>(deserializer: D) -> Result<Option<Option<T>>, D::Error>
where
    T: Deserialize<'de>,
    D: Deserializer<'de>,
{
    Option::<T>::deserialize(deserializer).map(Some)
}
