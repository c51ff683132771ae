use std::fmt;

use chrono::{DateTime, Duration, Utc};
use serde::de::Error as _;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::tz::{self, TimeInput};

/// Reserved payload key marking a reference to another interval's payload.
///
/// The key is part of the wire contract and must not be used by callers in
/// literal payloads.
pub const REF_KEY: &str = "_ref";

/// Constructor injected into a timeline to build its intervals.
///
/// Receives already-normalized UTC bounds. The default is
/// [`Interval::with_bounds`].
pub type IntervalCtor = fn(DateTime<Utc>, Option<DateTime<Utc>>, Payload) -> Interval;

/// The value an interval carries: either literal data, or a reference to
/// the interval holding the authoritative literal payload.
#[derive(Debug, Clone, PartialEq)]
pub enum Payload {
    Literal(Map<String, Value>),
    Reference(Uuid),
}

impl Payload {
    pub fn literal(map: Map<String, Value>) -> Self {
        Payload::Literal(map)
    }

    pub fn reference(target: Uuid) -> Self {
        Payload::Reference(target)
    }

    pub fn is_reference(&self) -> bool {
        matches!(self, Payload::Reference(_))
    }

    pub fn as_literal(&self) -> Option<&Map<String, Value>> {
        match self {
            Payload::Literal(map) => Some(map),
            Payload::Reference(_) => None,
        }
    }

    /// The interval this payload defers to, when it is a reference.
    pub fn reference_target(&self) -> Option<Uuid> {
        match self {
            Payload::Reference(target) => Some(*target),
            Payload::Literal(_) => None,
        }
    }
}

impl Serialize for Payload {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Payload::Literal(map) => map.serialize(serializer),
            Payload::Reference(target) => {
                use serde::ser::SerializeMap;
                let mut map = serializer.serialize_map(Some(1))?;
                map.serialize_entry(REF_KEY, target)?;
                map.end()
            }
        }
    }
}

impl<'de> Deserialize<'de> for Payload {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let map = Map::<String, Value>::deserialize(deserializer)?;
        match map.get(REF_KEY) {
            Some(value) => {
                let raw = value
                    .as_str()
                    .ok_or_else(|| D::Error::custom("`_ref` must hold an interval id"))?;
                let target = Uuid::parse_str(raw)
                    .map_err(|err| D::Error::custom(format!("invalid `_ref` id: {err}")))?;
                Ok(Payload::Reference(target))
            }
            None => Ok(Payload::Literal(map)),
        }
    }
}

impl fmt::Display for Payload {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Payload::Literal(map) => {
                let rendered =
                    serde_json::to_string(map).unwrap_or_else(|_| "{unprintable}".to_string());
                f.write_str(&rendered)
            }
            Payload::Reference(target) => write!(f, "{{\"{REF_KEY}\": \"{target}\"}}"),
        }
    }
}

/// One time-bounded payload record owned by a [`crate::Timeline`].
///
/// Immutable once created, except that lineage edges may be appended to
/// `superseded_by` by the owning timeline.
#[derive(Debug, Clone)]
pub struct Interval {
    pub(crate) id: Uuid,
    pub(crate) start_at: DateTime<Utc>,
    pub(crate) end_at: Option<DateTime<Utc>>,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) updated_at: DateTime<Utc>,
    pub(crate) payload: Payload,
    pub(crate) superseded_by: Vec<Uuid>,
}

impl Interval {
    /// Builds an interval from caller-supplied timestamps, normalizing
    /// timezone-naive input to UTC.
    pub fn new(
        start_at: impl Into<TimeInput>,
        end_at: Option<TimeInput>,
        payload: Payload,
    ) -> Self {
        let start_at = tz::normalize(start_at.into(), "start_at");
        let end_at = end_at.map(|input| tz::normalize(input, "end_at"));
        Self::with_bounds(start_at, end_at, payload)
    }

    /// Builds an interval from already-normalized UTC bounds.
    ///
    /// This is the default [`IntervalCtor`].
    pub fn with_bounds(
        start_at: DateTime<Utc>,
        end_at: Option<DateTime<Utc>>,
        payload: Payload,
    ) -> Self {
        let now = Utc::now();
        Self {
            id: Uuid::new_v4(),
            start_at,
            end_at,
            created_at: now,
            updated_at: now,
            payload,
            superseded_by: Vec::new(),
        }
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn start_at(&self) -> DateTime<Utc> {
        self.start_at
    }

    pub fn end_at(&self) -> Option<DateTime<Utc>> {
        self.end_at
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn payload(&self) -> &Payload {
        &self.payload
    }

    /// Identifiers of the intervals that replaced this one, in the order
    /// the replacements happened.
    pub fn superseded_by(&self) -> &[Uuid] {
        &self.superseded_by
    }

    /// An interval with no recorded successors is currently in effect.
    pub fn is_active(&self) -> bool {
        self.superseded_by.is_empty()
    }

    /// The width of the interval.
    ///
    /// # Panics
    ///
    /// Panics when `end_at` is unset; calling `span` on an uncommitted
    /// interval is a programming error, not a recoverable failure.
    pub fn span(&self) -> Duration {
        let end_at = self
            .end_at
            .expect("span() called on an interval without end_at");
        end_at - self.start_at
    }

    pub(crate) fn record_successor(&mut self, successor: Uuid) {
        self.superseded_by.push(successor);
        self.updated_at = Utc::now();
    }
}

/// Equality between interval handles is identity on `id`, not structural
/// payload equality.
impl PartialEq for Interval {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for Interval {}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let id = self.id.to_string();
        let end = match self.end_at {
            Some(end) => end.to_rfc3339(),
            None => "open".to_string(),
        };
        write!(
            f,
            "<interval {} [{} .. {}) payload={} superseded_by={}>",
            &id[..8],
            self.start_at.to_rfc3339(),
            end,
            self.payload,
            self.superseded_by.len(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn start() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 10, 10, 0, 0, 0).unwrap()
    }

    fn literal(key: &str, value: &str) -> Payload {
        let mut map = Map::new();
        map.insert(key.to_string(), json!(value));
        Payload::Literal(map)
    }

    #[test]
    fn span_measures_the_bounds() {
        let interval = Interval::with_bounds(
            start(),
            Some(start() + Duration::days(365)),
            literal("key", "world"),
        );
        assert_eq!(interval.span(), Duration::days(365));
    }

    #[test]
    #[should_panic(expected = "span() called on an interval without end_at")]
    fn span_panics_on_open_intervals() {
        let interval = Interval::with_bounds(start(), None, literal("key", "world"));
        let _ = interval.span();
    }

    #[test]
    fn equality_is_identity_on_id() {
        let a = Interval::with_bounds(
            start(),
            Some(start() + Duration::days(1)),
            literal("key", "world"),
        );
        let b = Interval::with_bounds(
            start(),
            Some(start() + Duration::days(1)),
            literal("key", "world"),
        );
        assert_eq!(a, a.clone());
        assert_ne!(a, b);
    }

    #[test]
    fn naive_timestamps_are_assumed_utc() {
        let naive = chrono::NaiveDateTime::parse_from_str("2022-10-10T00:00:00", "%Y-%m-%dT%H:%M:%S")
            .expect("parse naive");
        let interval = Interval::new(naive, None, literal("key", "world"));
        assert_eq!(interval.start_at(), start());
    }

    #[test]
    fn payload_reference_round_trips() {
        let target = Uuid::new_v4();
        let encoded = serde_json::to_value(Payload::Reference(target)).expect("encode");
        assert_eq!(encoded, json!({ REF_KEY: target.to_string() }));

        let decoded: Payload = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded.reference_target(), Some(target));
    }

    #[test]
    fn payload_literal_round_trips() {
        let payload = literal("key", "world");
        let encoded = serde_json::to_value(&payload).expect("encode");
        let decoded: Payload = serde_json::from_value(encoded).expect("decode");
        assert_eq!(decoded, payload);
    }

    #[test]
    fn reserved_key_always_decodes_as_reference() {
        let target = Uuid::new_v4();
        let raw = json!({ REF_KEY: target.to_string(), "other": 1 });
        let decoded: Payload = serde_json::from_value(raw).expect("decode");
        assert_eq!(decoded.reference_target(), Some(target));
    }
}
