use std::io;
use std::path::PathBuf;

use async_trait::async_trait;
use covenant_core::config::CoreConfig;
use covenant_core::errors::Result;
use covenant_core::serde_utils;
use covenant_protocol::{codec, Timeline};
use tracing::debug;
use uuid::Uuid;

use crate::traits::TimelineStore;

/// File-backed store: one pretty-printed JSON document per timeline,
/// named after the timeline's identifier.
#[derive(Debug, Clone)]
pub struct FileStore {
    root: PathBuf,
}

impl FileStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn from_config(config: &CoreConfig) -> Self {
        Self::new(config.data_dir.clone())
    }

    fn path_for(&self, id: Uuid) -> PathBuf {
        self.root.join(format!("{id}.json"))
    }
}

#[async_trait]
impl TimelineStore for FileStore {
    async fn load(&self, id: Uuid) -> Result<Option<Timeline>> {
        let path = self.path_for(id);
        match tokio::fs::read_to_string(&path).await {
            Ok(raw) => Ok(Some(codec::from_json(&raw)?)),
            Err(err) if err.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    async fn save(&self, timeline: &Timeline) -> Result<()> {
        tokio::fs::create_dir_all(&self.root).await?;

        let document = codec::encode(timeline)?;
        let raw = serde_utils::to_pretty_json(&document)?;
        let path = self.path_for(timeline.id());
        tokio::fs::write(&path, raw).await?;

        debug!(timeline = %timeline.id(), path = %path.display(), "timeline written");
        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(tokio::fs::try_exists(self.path_for(id)).await?)
    }
}
