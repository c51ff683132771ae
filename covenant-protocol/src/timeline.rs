use std::cmp;
use std::ops::Index;
use std::slice;

use chrono::{DateTime, Duration, Utc};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::TimelineError;
use crate::interval::{Interval, IntervalCtor, Payload};
use crate::tz::{self, TimeInput};

/// Append-only, ordered owner of all intervals of one tracked value.
///
/// Created once via [`Timeline::initialize`] with a founding interval; every
/// subsequent [`Timeline::insert`] appends one to three intervals (the new
/// interval plus optional remnants) and appends lineage edges to the
/// intervals it displaced. Nothing is ever removed or reordered.
#[derive(Debug, Clone)]
pub struct Timeline {
    pub(crate) id: Uuid,
    pub(crate) created_at: DateTime<Utc>,
    pub(crate) metadata: Map<String, Value>,
    pub(crate) items: Vec<Interval>,
    pub(crate) ctor: IntervalCtor,
}

impl Timeline {
    /// Creates a timeline with its founding interval.
    pub fn initialize(
        start_at: impl Into<TimeInput>,
        end_at: impl Into<TimeInput>,
        payload: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> Result<Self, TimelineError> {
        Self::initialize_with(Interval::with_bounds, start_at, end_at, payload, metadata)
    }

    /// Like [`Timeline::initialize`], with a caller-supplied interval
    /// constructor used for the founding interval and every later insert.
    pub fn initialize_with(
        ctor: IntervalCtor,
        start_at: impl Into<TimeInput>,
        end_at: impl Into<TimeInput>,
        payload: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> Result<Self, TimelineError> {
        let start_at = tz::normalize(start_at.into(), "start_at");
        let end_at = tz::normalize(end_at.into(), "end_at");

        let founder = ctor(start_at, Some(end_at), Payload::Literal(payload));
        ensure_positive_span(&founder)?;

        Ok(Self {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            metadata,
            items: vec![founder],
            ctor,
        })
    }

    /// Used by the codec to rebuild a persisted timeline.
    pub(crate) fn from_parts(
        id: Uuid,
        created_at: DateTime<Utc>,
        metadata: Map<String, Value>,
        items: Vec<Interval>,
    ) -> Self {
        Self {
            id,
            created_at,
            metadata,
            items,
            ctor: Interval::with_bounds,
        }
    }

    /// Inserts a new interval, splitting whatever active intervals it
    /// overlaps.
    ///
    /// `start_at` must fall inside the envelope `[min_start, max_end]` of
    /// the currently active intervals (inclusive at both ends); `end_at`
    /// defaults to `max_end`. Each affected active interval contributes up
    /// to two remnants carrying its payload by reference, and records the
    /// fragments it was cut into in its `superseded_by` list. A pure
    /// chronological continuation (the new interval starts exactly where an
    /// active one ends, with zero overlap) displaces nothing: both intervals
    /// stay active.
    ///
    /// Fails atomically: on [`TimelineError::EmptySpan`] or
    /// [`TimelineError::OutOfBoundary`] the timeline is left untouched.
    pub fn insert(
        &mut self,
        payload: Map<String, Value>,
        start_at: impl Into<TimeInput>,
        end_at: Option<TimeInput>,
    ) -> Result<Interval, TimelineError> {
        let start_at = tz::normalize(start_at.into(), "start_at");
        let end_at = end_at.map(|input| tz::normalize(input, "end_at"));

        let active: Vec<usize> = (0..self.items.len())
            .filter(|&idx| self.items[idx].is_active())
            .collect();

        let min_start = active
            .iter()
            .map(|&idx| self.items[idx].start_at)
            .min()
            .expect("a timeline always holds at least one active interval");
        let max_end = active
            .iter()
            .map(|&idx| committed_end(&self.items[idx]))
            .max()
            .expect("a timeline always holds at least one active interval");

        if start_at < min_start || start_at > max_end {
            return Err(TimelineError::OutOfBoundary {
                start_at,
                min_start,
                max_end,
            });
        }

        let end_at = end_at.unwrap_or(max_end);
        let candidate = (self.ctor)(start_at, Some(end_at), Payload::Literal(payload));
        ensure_positive_span(&candidate)?;

        let mut appended = false;
        for idx in active {
            let a_start = self.items[idx].start_at;
            let a_end = committed_end(&self.items[idx]);
            let a_span = a_end - a_start;

            let overlap = cmp::max(
                Duration::zero(),
                cmp::min(a_end, end_at) - cmp::max(a_start, start_at),
            );
            let is_pure_adjacency = overlap == Duration::zero() && start_at == a_end;

            if overlap == Duration::zero() && !is_pure_adjacency {
                continue;
            }

            let left_delta = cmp::max(Duration::zero(), start_at - a_start);
            let right_delta = cmp::max(Duration::zero(), a_end - end_at);
            let mut carried: Option<Payload> = None;

            if left_delta > Duration::zero() && left_delta != a_span {
                let payload_ref = self.resolve_reference(idx);
                carried = Some(payload_ref.clone());
                let left = (self.ctor)(a_start, Some(a_start + left_delta), payload_ref);
                let left_id = left.id;
                self.items.push(left);
                self.items[idx].record_successor(left_id);
            }

            if !appended {
                self.items.push(candidate.clone());
                appended = true;
            }
            if !is_pure_adjacency {
                self.items[idx].record_successor(candidate.id);
            }

            if right_delta > Duration::zero() {
                let payload_ref = carried
                    .take()
                    .unwrap_or_else(|| self.resolve_reference(idx));
                let right = (self.ctor)(end_at, Some(a_end), payload_ref);
                let right_id = right.id;
                self.items.push(right);
                self.items[idx].record_successor(right_id);
            }
        }

        // Active intervals tile the envelope without gaps, so an in-bounds
        // insert always touches at least one of them.
        debug_assert!(appended, "insert affected no active interval");

        Ok(candidate)
    }

    /// Resolves the payload to carry into a remnant of `items[idx]`.
    ///
    /// Reference chains collapse: a reference-carrying interval resolves to
    /// the terminal literal-payload interval it points at, never to an
    /// intermediate remnant.
    fn resolve_reference(&self, idx: usize) -> Payload {
        match self.items[idx].payload {
            Payload::Reference(target) => {
                let root = self
                    .position(target)
                    .expect("reference target is owned by this timeline");
                self.resolve_reference(root)
            }
            Payload::Literal(_) => Payload::Reference(self.items[idx].id),
        }
    }

    /// The active interval whose `[start_at, end_at)` range contains `at`.
    ///
    /// # Panics
    ///
    /// Panics when more than one active interval contains `at`: the
    /// non-overlap invariant is broken and the data structure is corrupt.
    pub fn active_at(&self, at: impl Into<TimeInput>) -> Option<&Interval> {
        let at = tz::normalize(at.into(), "at");

        let mut found: Option<&Interval> = None;
        for item in self.items.iter().filter(|item| item.is_active()) {
            if item.start_at <= at && at < committed_end(item) {
                if let Some(previous) = found {
                    panic!(
                        "active intervals {} and {} both cover {at}; timeline {} is corrupt",
                        previous.id, item.id, self.id
                    );
                }
                found = Some(item);
            }
        }
        found
    }

    /// Whether this exact interval (by identity) is owned by the timeline,
    /// active or superseded.
    pub fn contains(&self, interval: &Interval) -> bool {
        self.contains_id(interval.id)
    }

    pub fn contains_id(&self, id: Uuid) -> bool {
        self.position(id).is_some()
    }

    pub fn by_id(&self, id: Uuid) -> Option<&Interval> {
        self.position(id).map(|idx| &self.items[idx])
    }

    fn position(&self, id: Uuid) -> Option<usize> {
        self.items.iter().position(|item| item.id == id)
    }

    pub fn id(&self) -> Uuid {
        self.id
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn metadata(&self) -> &Map<String, Value> {
        &self.metadata
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&Interval> {
        self.items.get(index)
    }

    /// Intervals in insertion order.
    pub fn iter(&self) -> slice::Iter<'_, Interval> {
        self.items.iter()
    }
}

impl Index<usize> for Timeline {
    type Output = Interval;

    fn index(&self, index: usize) -> &Interval {
        &self.items[index]
    }
}

impl<'a> IntoIterator for &'a Timeline {
    type Item = &'a Interval;
    type IntoIter = slice::Iter<'a, Interval>;

    fn into_iter(self) -> Self::IntoIter {
        self.items.iter()
    }
}

fn committed_end(interval: &Interval) -> DateTime<Utc> {
    interval
        .end_at
        .expect("committed intervals always carry an end")
}

fn ensure_positive_span(interval: &Interval) -> Result<(), TimelineError> {
    if interval.span() <= Duration::zero() {
        return Err(TimelineError::EmptySpan {
            start_at: interval.start_at,
            end_at: committed_end(interval),
        });
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use serde_json::json;

    fn day0() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2022, 10, 10, 0, 0, 0).unwrap()
    }

    fn payload(value: &str) -> Map<String, Value> {
        let mut map = Map::new();
        map.insert("key".to_string(), json!(value));
        map
    }

    fn year_timeline() -> Timeline {
        Timeline::initialize(day0(), day0() + Duration::days(365), payload("world"), Map::new())
            .expect("initialize")
    }

    #[test]
    fn end_defaults_to_the_active_envelope() {
        let mut timeline = year_timeline();
        let inserted = timeline
            .insert(payload("venus"), day0() + Duration::days(45), None)
            .expect("insert");
        assert_eq!(inserted.end_at(), Some(day0() + Duration::days(365)));
    }

    #[test]
    fn custom_interval_ctor_is_used_for_every_interval() {
        fn tagged(
            start_at: DateTime<Utc>,
            end_at: Option<DateTime<Utc>>,
            payload: Payload,
        ) -> Interval {
            let payload = match payload {
                Payload::Literal(mut map) => {
                    map.insert("source".to_string(), json!("factory"));
                    Payload::Literal(map)
                }
                reference => reference,
            };
            Interval::with_bounds(start_at, end_at, payload)
        }

        let mut timeline = Timeline::initialize_with(
            tagged,
            day0(),
            day0() + Duration::days(365),
            payload("world"),
            Map::new(),
        )
        .expect("initialize");

        let inserted = timeline
            .insert(payload("venus"), day0() + Duration::days(45), None)
            .expect("insert");

        for interval in [&timeline[0], &inserted] {
            let literal = interval.payload().as_literal().expect("literal payload");
            assert_eq!(literal.get("source"), Some(&json!("factory")));
        }
    }

    #[test]
    fn rejected_inserts_leave_the_timeline_untouched() {
        let mut timeline = year_timeline();

        let err = timeline
            .insert(payload("venus"), day0(), Some(TimeInput::from(day0())))
            .expect_err("zero span must be rejected");
        assert!(matches!(err, TimelineError::EmptySpan { .. }));

        assert_eq!(timeline.len(), 1);
        assert!(timeline[0].is_active());
    }
}
