//! Branching interval timelines for the Covenant platform.
//!
//! A [`Timeline`] owns an append-only list of [`Interval`]s, each valid for a
//! half-open `[start_at, end_at)` range of calendar time. Inserting an
//! interval that overlaps active ones splits them into remnants, records
//! which interval superseded which, and de-duplicates payloads through
//! reference chains that always collapse to the root literal-payload
//! interval. History is never discarded.

pub mod codec;
mod error;
mod interval;
mod stats;
mod timeline;
mod tz;

pub use error::TimelineError;
pub use interval::{Interval, IntervalCtor, Payload, REF_KEY};
pub use stats::TimelineStats;
pub use timeline::Timeline;
pub use tz::TimeInput;
