//! EVE event record model.
//!
//! The engine writes one JSON object per line to its structured log. Records
//! are self-describing: an `event_type` field discriminates the payload
//! (`alert`, `dns`, `tls`, `stats`, ...). Suriview never mutates a record
//! after decoding it; aggregators read the nested payload in place.

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A single decoded event from the engine's structured log.
///
/// Only `timestamp` and `event_type` are lifted out of the payload; the rest
/// of the object is kept as-is so that kind-specific fields like
/// `alert.signature` or `stats.capture` can be looked up without committing
/// to a schema for every event type the engine emits.
///
/// # Example
///
/// ```
/// use shared::models::EveRecord;
///
/// let line = r#"{"timestamp":"2024-05-01T12:00:00.000000+0000",
///                "event_type":"dns","dns":{"type":"query","rrname":"example.com"}}"#;
/// let record = EveRecord::decode(line).unwrap();
///
/// assert!(record.is_type("dns"));
/// assert_eq!(
///     record.nested(&["dns", "rrname"]).and_then(|v| v.as_str()),
///     Some("example.com")
/// );
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EveRecord {
    /// Event timestamp as written by the engine (ISO-8601, may be absent).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    /// Event type discriminator (`alert`, `dns`, `tls`, `stats`, ...).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub event_type: Option<String>,

    /// The remaining, kind-specific payload of the record.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl EveRecord {
    /// Decodes a raw log line into an event record.
    ///
    /// Returns `None` if the line is not a JSON object. Decode failures are
    /// logged at warning level and never abort the caller's scan: a single
    /// truncated or garbled line in the log must not take down an aggregate
    /// request or a live stream.
    #[must_use]
    pub fn decode(line: &str) -> Option<Self> {
        match serde_json::from_str::<Self>(line) {
            Ok(record) => Some(record),
            Err(error) => {
                tracing::warn!(%error, "Skipping undecodable log line");
                None
            }
        }
    }

    /// Returns `true` if this record's `event_type` equals `kind`.
    ///
    /// Records without an `event_type` match nothing.
    #[must_use]
    pub fn is_type(&self, kind: &str) -> bool {
        self.event_type.as_deref() == Some(kind)
    }

    /// Looks up a nested payload value by key path.
    ///
    /// Returns `None` if any segment is missing or a non-object is reached
    /// before the final segment.
    #[must_use]
    pub fn nested(&self, path: &[&str]) -> Option<&Value> {
        let (first, rest) = path.split_first()?;
        let mut current = self.payload.get(*first)?;
        for key in rest {
            current = current.as_object()?.get(*key)?;
        }
        Some(current)
    }

    /// Parses the record's timestamp.
    ///
    /// The engine writes timestamps like `2024-05-01T12:00:00.000000+0000`;
    /// RFC 3339 variants with a colon in the offset are accepted as well.
    #[must_use]
    pub fn parsed_timestamp(&self) -> Option<DateTime<FixedOffset>> {
        let raw = self.timestamp.as_deref()?;
        DateTime::parse_from_rfc3339(raw)
            .or_else(|_| DateTime::parse_from_str(raw, "%Y-%m-%dT%H:%M:%S%.f%z"))
            .ok()
    }
}
