use async_trait::async_trait;
use covenant_core::errors::Result;
use covenant_protocol::Timeline;
use uuid::Uuid;

/// Load and store of whole timelines, keyed by the timeline's identifier.
#[async_trait]
pub trait TimelineStore: Send + Sync {
    /// Fetches a timeline by its identifier, `None` when unknown.
    async fn load(&self, id: Uuid) -> Result<Option<Timeline>>;

    /// Persists the full timeline document under its own identifier.
    async fn save(&self, timeline: &Timeline) -> Result<()>;

    /// Whether a timeline with this identifier has been persisted.
    async fn exists(&self, id: Uuid) -> Result<bool> {
        Ok(self.load(id).await?.is_some())
    }
}
