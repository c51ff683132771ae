use std::collections::HashMap;
use std::sync::RwLock;

use async_trait::async_trait;
use covenant_core::errors::{CovenantError, Result};
use covenant_protocol::{codec, Timeline};
use uuid::Uuid;

use crate::traits::TimelineStore;

/// In-memory store keeping encoded documents, for tests and embedding.
#[derive(Debug, Default)]
pub struct MemoryStore {
    data: RwLock<HashMap<Uuid, String>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TimelineStore for MemoryStore {
    async fn load(&self, id: Uuid) -> Result<Option<Timeline>> {
        let data = self
            .data
            .read()
            .map_err(|err| CovenantError::Storage(err.to_string()))?;
        data.get(&id)
            .map(|raw| codec::from_json(raw).map_err(Into::into))
            .transpose()
    }

    async fn save(&self, timeline: &Timeline) -> Result<()> {
        let raw = codec::to_json(timeline)?;
        let mut data = self
            .data
            .write()
            .map_err(|err| CovenantError::Storage(err.to_string()))?;
        data.insert(timeline.id(), raw);
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let data = self
            .data
            .read()
            .map_err(|err| CovenantError::Storage(err.to_string()))?;
        Ok(data.contains_key(&id))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use serde_json::{json, Map};

    #[tokio::test]
    async fn save_then_load_round_trips() {
        let start = Utc.with_ymd_and_hms(2022, 10, 10, 0, 0, 0).unwrap();
        let mut payload = Map::new();
        payload.insert("key".to_string(), json!("world"));

        let timeline =
            Timeline::initialize(start, start + Duration::days(365), payload, Map::new())
                .expect("initialize");

        let store = MemoryStore::new();
        store.save(&timeline).await.expect("save");

        assert!(store.exists(timeline.id()).await.expect("exists"));
        let restored = store
            .load(timeline.id())
            .await
            .expect("load")
            .expect("present");
        assert_eq!(restored.id(), timeline.id());
        assert_eq!(restored.len(), timeline.len());
    }

    #[tokio::test]
    async fn unknown_ids_load_as_none() {
        let store = MemoryStore::new();
        assert!(store.load(Uuid::new_v4()).await.expect("load").is_none());
        assert!(!store.exists(Uuid::new_v4()).await.expect("exists"));
    }
}
