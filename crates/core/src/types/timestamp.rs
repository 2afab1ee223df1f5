//! Deserialization helpers for document timestamps.
//!
//! Exported documents carry timestamps in two shapes: RFC 3339 strings
//! written by the API handlers, and `{ "_seconds": .., "_nanoseconds": .. }`
//! objects written by the storefront's client SDK. Both map to
//! `DateTime<Utc>`. Serialization always writes RFC 3339.
//!
//! ```
//! use chrono::{DateTime, Utc};
//! use serde::Deserialize;
//!
//! #[derive(Deserialize)]
//! struct Doc {
//!     #[serde(default, with = "sareine_core::timestamp::option")]
//!     created_at: Option<DateTime<Utc>>,
//! }
//!
//! let a: Doc = serde_json::from_str(r#"{"created_at":"2026-02-01T10:00:00Z"}"#).unwrap();
//! let b: Doc = serde_json::from_str(r#"{"created_at":{"_seconds":1769940000,"_nanoseconds":0}}"#).unwrap();
//! assert_eq!(a.created_at, b.created_at);
//! ```

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

#[derive(Deserialize)]
#[serde(untagged)]
enum RawTimestamp {
    Text(String),
    Seconds {
        #[serde(rename = "_seconds", alias = "seconds")]
        seconds: i64,
        #[serde(rename = "_nanoseconds", alias = "nanoseconds", default)]
        nanoseconds: u32,
    },
    Millis(i64),
}

impl RawTimestamp {
    fn into_utc(self) -> Result<DateTime<Utc>, String> {
        match self {
            Self::Text(text) => DateTime::parse_from_rfc3339(text.trim())
                .map(|dt| dt.with_timezone(&Utc))
                .map_err(|e| format!("invalid timestamp {text:?}: {e}")),
            Self::Seconds {
                seconds,
                nanoseconds,
            } => DateTime::from_timestamp(seconds, nanoseconds)
                .ok_or_else(|| format!("timestamp out of range: {seconds}s")),
            Self::Millis(ms) => DateTime::from_timestamp_millis(ms)
                .ok_or_else(|| format!("timestamp out of range: {ms}ms")),
        }
    }
}

/// Parse a required timestamp in any supported shape.
///
/// # Errors
///
/// Fails when the value is neither an RFC 3339 string, a seconds object,
/// nor epoch milliseconds.
pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<DateTime<Utc>, D::Error> {
    RawTimestamp::deserialize(deserializer)?
        .into_utc()
        .map_err(serde::de::Error::custom)
}

/// Write a timestamp as RFC 3339.
///
/// # Errors
///
/// Propagates serializer errors.
pub fn serialize<S: Serializer>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error> {
    value.serialize(serializer)
}

/// The same helpers for `Option<DateTime<Utc>>`; `null` maps to `None`.
pub mod option {
    use super::{DateTime, Deserialize, Deserializer, RawTimestamp, Serialize, Serializer, Utc};

    /// Parse an optional timestamp.
    ///
    /// # Errors
    ///
    /// Fails on a present but unparseable value.
    pub fn deserialize<'de, D: Deserializer<'de>>(
        deserializer: D,
    ) -> Result<Option<DateTime<Utc>>, D::Error> {
        Option::<RawTimestamp>::deserialize(deserializer)?
            .map(RawTimestamp::into_utc)
            .transpose()
            .map_err(serde::de::Error::custom)
    }

    /// Write an optional timestamp as RFC 3339 or `null`.
    ///
    /// # Errors
    ///
    /// Propagates serializer errors.
    pub fn serialize<S: Serializer>(
        value: &Option<DateTime<Utc>>,
        serializer: S,
    ) -> Result<S::Ok, S::Error> {
        value.serialize(serializer)
    }
}
