use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors produced by timeline operations and the wire codec.
#[derive(Debug, Error)]
pub enum TimelineError {
    /// The requested interval has a zero or negative span.
    #[error("interval from {start_at} to {end_at} spans nothing")]
    EmptySpan {
        start_at: DateTime<Utc>,
        end_at: DateTime<Utc>,
    },

    /// The requested start date falls outside the active envelope.
    #[error(
        "start date {start_at} is out of the boundary, the valid boundary is \
         between {min_start} and {max_end} (inclusively)"
    )]
    OutOfBoundary {
        start_at: DateTime<Utc>,
        min_start: DateTime<Utc>,
        max_end: DateTime<Utc>,
    },

    /// A persisted document could not be decoded.
    #[error("malformed timeline document: {0}")]
    Codec(String),
}
