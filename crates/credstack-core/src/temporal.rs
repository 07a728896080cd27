//! # Epoch-Millisecond Timestamps
//!
//! The core service stamps every record with milliseconds since the Unix
//! epoch, rendered as a decimal string (`"1614812345678"`). A few request
//! option bags carry the same quantity as a JSON number instead.
//!
//! [`EpochMillis`] always serializes as the string form. Decoding accepts
//! either form, so a value read from an option bag can be written back
//! into a record without conversion. Fields that must stay numeric on the
//! wire use [`as_number`] via `#[serde(with = ...)]`.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::de::{self, Visitor};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use crate::error::CoreError;

/// Milliseconds since 1970-01-01T00:00:00Z.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EpochMillis(i64);

impl EpochMillis {
    /// Wrap a raw millisecond count.
    pub fn from_millis(millis: i64) -> Self {
        Self(millis)
    }

    /// The current time.
    pub fn now() -> Self {
        Self(Utc::now().timestamp_millis())
    }

    /// Convert from a `chrono` UTC datetime, truncating below milliseconds.
    pub fn from_datetime(dt: DateTime<Utc>) -> Self {
        Self(dt.timestamp_millis())
    }

    /// The raw millisecond count.
    pub fn as_millis(&self) -> i64 {
        self.0
    }

    /// Convert to a `chrono` UTC datetime.
    ///
    /// Returns `None` when the count falls outside the range `chrono`
    /// can represent.
    pub fn to_datetime(&self) -> Option<DateTime<Utc>> {
        DateTime::from_timestamp_millis(self.0)
    }

    /// Whether this instant has been reached by `now`.
    pub fn is_past_at(&self, now: EpochMillis) -> bool {
        self.0 <= now.0
    }
}

impl fmt::Display for EpochMillis {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for EpochMillis {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|e| CoreError::InvalidTimestamp {
                value: s.to_string(),
                reason: e.to_string(),
            })
    }
}

impl From<DateTime<Utc>> for EpochMillis {
    fn from(dt: DateTime<Utc>) -> Self {
        Self::from_datetime(dt)
    }
}

impl Serialize for EpochMillis {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

struct EpochMillisVisitor;

impl<'de> Visitor<'de> for EpochMillisVisitor {
    type Value = EpochMillis;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("epoch milliseconds as a decimal string or an integer")
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Self::Value, E> {
        Ok(EpochMillis(v))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Self::Value, E> {
        i64::try_from(v)
            .map(EpochMillis)
            .map_err(|_| E::custom(format!("epoch milliseconds out of range: {v}")))
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Self::Value, E> {
        v.parse().map_err(E::custom)
    }
}

impl<'de> Deserialize<'de> for EpochMillis {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(EpochMillisVisitor)
    }
}

/// Serde adapter for `Option<EpochMillis>` fields that travel as JSON
/// numbers (`number | null`) rather than strings.
pub mod as_number {
    use super::EpochMillis;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(
        value: &Option<EpochMillis>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        match value {
            Some(ts) => serializer.serialize_i64(ts.as_millis()),
            None => serializer.serialize_none(),
        }
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<EpochMillis>, D::Error> {
        Option::<EpochMillis>::deserialize(deserializer)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_serializes_as_string() {
        let ts = EpochMillis::from_millis(1_614_812_345_678);
        assert_eq!(serde_json::to_string(&ts).unwrap(), "\"1614812345678\"");
    }

    #[test]
    fn test_deserializes_string_and_number() {
        let a: EpochMillis = serde_json::from_str("\"1614812345678\"").unwrap();
        let b: EpochMillis = serde_json::from_str("1614812345678").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.as_millis(), 1_614_812_345_678);
    }

    #[test]
    fn test_rejects_non_numeric_string() {
        assert!(serde_json::from_str::<EpochMillis>("\"2021-03-03T00:00:00Z\"").is_err());
        assert!("".parse::<EpochMillis>().is_err());
    }

    #[test]
    fn test_rejects_fractional_number() {
        assert!(serde_json::from_str::<EpochMillis>("12.5").is_err());
    }

    #[test]
    fn test_datetime_conversion() {
        let dt = Utc.with_ymd_and_hms(2021, 3, 3, 12, 0, 0).unwrap();
        let ts = EpochMillis::from_datetime(dt);
        assert_eq!(ts.as_millis(), dt.timestamp_millis());
        assert_eq!(ts.to_datetime(), Some(dt));
    }

    #[test]
    fn test_ordering_and_is_past_at() {
        let earlier = EpochMillis::from_millis(1_000);
        let later = EpochMillis::from_millis(2_000);
        assert!(earlier < later);
        assert!(earlier.is_past_at(later));
        assert!(!later.is_past_at(earlier));
        assert!(earlier.is_past_at(earlier));
    }

    #[derive(Serialize, Deserialize, PartialEq, Debug)]
    struct Numeric {
        #[serde(with = "as_number")]
        at: Option<EpochMillis>,
    }

    #[test]
    fn test_as_number_adapter() {
        let v = Numeric { at: Some(EpochMillis::from_millis(42)) };
        assert_eq!(serde_json::to_string(&v).unwrap(), r#"{"at":42}"#);
        let none = Numeric { at: None };
        assert_eq!(serde_json::to_string(&none).unwrap(), r#"{"at":null}"#);
        let back: Numeric = serde_json::from_str(r#"{"at":"42"}"#).unwrap();
        assert_eq!(back, v);
    }
}
