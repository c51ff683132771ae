use chrono::{DateTime, FixedOffset, NaiveDateTime, Utc};
use tracing::warn;

/// A caller-supplied timestamp, possibly missing timezone information.
///
/// Naive values are assumed to be UTC when normalized; the assumption is
/// reported through a `tracing` warning rather than treated as an error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeInput {
    Aware(DateTime<Utc>),
    Naive(NaiveDateTime),
}

impl From<DateTime<Utc>> for TimeInput {
    fn from(value: DateTime<Utc>) -> Self {
        TimeInput::Aware(value)
    }
}

impl From<DateTime<FixedOffset>> for TimeInput {
    fn from(value: DateTime<FixedOffset>) -> Self {
        TimeInput::Aware(value.with_timezone(&Utc))
    }
}

impl From<NaiveDateTime> for TimeInput {
    fn from(value: NaiveDateTime) -> Self {
        TimeInput::Naive(value)
    }
}

/// Normalizes a caller timestamp to UTC.
pub(crate) fn normalize(input: TimeInput, field: &str) -> DateTime<Utc> {
    match input {
        TimeInput::Aware(instant) => instant,
        TimeInput::Naive(naive) => {
            warn!(field, "received naive datetime, assuming UTC");
            naive.and_utc()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn aware_offsets_convert_to_the_same_instant() {
        let offset = FixedOffset::east_opt(2 * 3600).unwrap();
        let local = offset.with_ymd_and_hms(2022, 10, 10, 12, 0, 0).unwrap();
        let normalized = normalize(local.into(), "start_at");
        assert_eq!(
            normalized,
            Utc.with_ymd_and_hms(2022, 10, 10, 10, 0, 0).unwrap()
        );
    }

    #[test]
    fn naive_datetimes_are_assumed_utc() {
        let naive = NaiveDateTime::parse_from_str("2022-10-10T12:00:00", "%Y-%m-%dT%H:%M:%S")
            .expect("parse naive");
        let normalized = normalize(naive.into(), "start_at");
        assert_eq!(
            normalized,
            Utc.with_ymd_and_hms(2022, 10, 10, 12, 0, 0).unwrap()
        );
    }
}
