//! JSON wire format for timelines and their intervals.
//!
//! Every serialized node carries a `type` discriminator:
//! [`TIMELINE_NODE`] for the timeline envelope and [`INTERVAL_NODE`] for
//! each of its items. The discriminator values and the reserved
//! [`crate::REF_KEY`] payload key are part of the wire contract and must
//! not be used as caller payload keys. Timestamps persist as RFC 3339 with
//! offset, which round-trips exact instants.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::error::TimelineError;
use crate::interval::{Interval, Payload};
use crate::timeline::Timeline;

/// Discriminator value for serialized intervals.
pub const INTERVAL_NODE: &str = "covenant.interval";
/// Discriminator value for serialized timelines.
pub const TIMELINE_NODE: &str = "covenant.timeline";

#[derive(Serialize, Deserialize)]
struct IntervalNode {
    #[serde(rename = "type")]
    kind: String,
    id: Uuid,
    start_at: DateTime<Utc>,
    end_at: Option<DateTime<Utc>>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    superseded_by: Vec<Uuid>,
    payload: Payload,
}

#[derive(Serialize, Deserialize)]
struct TimelineNode {
    #[serde(rename = "type")]
    kind: String,
    id: Uuid,
    created_at: DateTime<Utc>,
    metadata: Map<String, Value>,
    items: Vec<IntervalNode>,
}

impl From<&Interval> for IntervalNode {
    fn from(interval: &Interval) -> Self {
        Self {
            kind: INTERVAL_NODE.to_string(),
            id: interval.id,
            start_at: interval.start_at,
            end_at: interval.end_at,
            created_at: interval.created_at,
            updated_at: interval.updated_at,
            superseded_by: interval.superseded_by.clone(),
            payload: interval.payload.clone(),
        }
    }
}

impl From<&Timeline> for TimelineNode {
    fn from(timeline: &Timeline) -> Self {
        Self {
            kind: TIMELINE_NODE.to_string(),
            id: timeline.id,
            created_at: timeline.created_at,
            metadata: timeline.metadata.clone(),
            items: timeline.iter().map(IntervalNode::from).collect(),
        }
    }
}

fn interval_from_node(node: IntervalNode) -> Result<Interval, TimelineError> {
    if node.kind != INTERVAL_NODE {
        return Err(TimelineError::Codec(format!(
            "expected node type `{INTERVAL_NODE}`, found `{}`",
            node.kind
        )));
    }
    Ok(Interval {
        id: node.id,
        start_at: node.start_at,
        end_at: node.end_at,
        created_at: node.created_at,
        updated_at: node.updated_at,
        payload: node.payload,
        superseded_by: node.superseded_by,
    })
}

fn timeline_from_node(node: TimelineNode) -> Result<Timeline, TimelineError> {
    if node.kind != TIMELINE_NODE {
        return Err(TimelineError::Codec(format!(
            "expected node type `{TIMELINE_NODE}`, found `{}`",
            node.kind
        )));
    }
    let items = node
        .items
        .into_iter()
        .map(interval_from_node)
        .collect::<Result<Vec<_>, _>>()?;
    Ok(Timeline::from_parts(
        node.id,
        node.created_at,
        node.metadata,
        items,
    ))
}

/// Encodes a timeline into its JSON document form.
pub fn encode(timeline: &Timeline) -> Result<Value, TimelineError> {
    serde_json::to_value(TimelineNode::from(timeline))
        .map_err(|err| TimelineError::Codec(err.to_string()))
}

/// Rebuilds a timeline from its JSON document form.
pub fn decode(document: Value) -> Result<Timeline, TimelineError> {
    let node: TimelineNode =
        serde_json::from_value(document).map_err(|err| TimelineError::Codec(err.to_string()))?;
    timeline_from_node(node)
}

/// Encodes a timeline as a JSON string.
pub fn to_json(timeline: &Timeline) -> Result<String, TimelineError> {
    serde_json::to_string(&TimelineNode::from(timeline))
        .map_err(|err| TimelineError::Codec(err.to_string()))
}

/// Decodes a timeline from a JSON string.
pub fn from_json(input: &str) -> Result<Timeline, TimelineError> {
    let node: TimelineNode =
        serde_json::from_str(input).map_err(|err| TimelineError::Codec(err.to_string()))?;
    timeline_from_node(node)
}
