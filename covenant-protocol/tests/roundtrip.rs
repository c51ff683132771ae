use chrono::{DateTime, Duration, TimeZone, Utc};
use covenant_protocol::{codec, TimeInput, Timeline};
use serde_json::{json, Map, Value};

fn day0() -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2022, 10, 10, 0, 0, 0).unwrap()
}

fn payload(value: &str) -> Map<String, Value> {
    let mut map = Map::new();
    map.insert("key".to_string(), json!(value));
    map
}

fn branched_timeline() -> Timeline {
    let mut metadata = Map::new();
    metadata.insert("owner".to_string(), json!("covenant-tests"));

    let mut timeline =
        Timeline::initialize(day0(), day0() + Duration::days(365), payload("world"), metadata)
            .expect("initialize");
    timeline
        .insert(
            payload("venus"),
            day0() + Duration::days(30),
            Some(TimeInput::from(day0() + Duration::days(60))),
        )
        .expect("insert");
    timeline
        .insert(payload("mars"), day0() + Duration::days(100), None)
        .expect("insert");
    timeline
}

#[test]
fn encode_then_decode_reproduces_the_timeline_exactly() {
    let original = branched_timeline();

    let raw = codec::to_json(&original).expect("encode");
    let restored = codec::from_json(&raw).expect("decode");

    assert_eq!(restored.id(), original.id());
    assert_eq!(restored.created_at(), original.created_at());
    assert_eq!(restored.metadata(), original.metadata());
    assert_eq!(restored.len(), original.len());

    for (restored_item, original_item) in restored.iter().zip(original.iter()) {
        assert_eq!(restored_item.id(), original_item.id());
        assert_eq!(restored_item.start_at(), original_item.start_at());
        assert_eq!(restored_item.end_at(), original_item.end_at());
        assert_eq!(restored_item.created_at(), original_item.created_at());
        assert_eq!(restored_item.updated_at(), original_item.updated_at());
        assert_eq!(restored_item.payload(), original_item.payload());
        assert_eq!(restored_item.superseded_by(), original_item.superseded_by());
    }
}

#[test]
fn decoded_timelines_accept_further_inserts() {
    let original = branched_timeline();
    let document = codec::encode(&original).expect("encode");
    let mut restored = codec::decode(document).expect("decode");

    restored
        .insert(payload("ceres"), day0() + Duration::days(200), None)
        .expect("insert after decode");

    let lookup = restored
        .active_at(day0() + Duration::days(250))
        .expect("active interval");
    assert_eq!(lookup.payload().as_literal(), Some(&payload("ceres")));
}

#[test]
fn documents_carry_the_node_discriminators() {
    let original = branched_timeline();
    let document = codec::encode(&original).expect("encode");

    assert_eq!(document["type"], json!(codec::TIMELINE_NODE));
    for item in document["items"].as_array().expect("items array") {
        assert_eq!(item["type"], json!(codec::INTERVAL_NODE));
    }
}
