use std::fmt::Write as _;

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

use crate::timeline::Timeline;

/// Aggregated statistics over one timeline.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct TimelineStats {
    pub total_intervals: u64,
    pub active_intervals: u64,
    pub superseded_intervals: u64,
    /// Sum of the spans of all active intervals, in seconds.
    pub active_span_seconds: i64,
    pub min_start: Option<DateTime<Utc>>,
    pub max_end: Option<DateTime<Utc>>,
}

impl Timeline {
    pub fn stats(&self) -> TimelineStats {
        let mut stats = TimelineStats::default();
        let mut active_span = Duration::zero();

        for item in &self.items {
            stats.total_intervals += 1;

            if item.is_active() {
                stats.active_intervals += 1;
                active_span = active_span + item.span();

                stats.min_start = Some(match stats.min_start {
                    Some(current) => current.min(item.start_at),
                    None => item.start_at,
                });
                let end = item.end_at.expect("committed intervals always carry an end");
                stats.max_end = Some(match stats.max_end {
                    Some(current) => current.max(end),
                    None => end,
                });
            } else {
                stats.superseded_intervals += 1;
            }
        }

        stats.active_span_seconds = active_span.num_seconds();
        stats
    }

    /// Renders a human-readable report of the whole history.
    pub fn describe(&self) -> String {
        let stats = self.stats();
        let mut out = String::new();

        let _ = writeln!(out, "All intervals:");
        for item in &self.items {
            let _ = writeln!(out, "  {item}");
        }

        let _ = writeln!(out, "Active intervals:");
        for item in self.items.iter().filter(|item| item.is_active()) {
            let _ = writeln!(out, "  {item}");
        }

        let _ = write!(
            out,
            "span={}s, count={}",
            stats.active_span_seconds, stats.total_intervals
        );
        out
    }
}
