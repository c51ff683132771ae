use covenant_core::errors::{CovenantError, Result};
use covenant_protocol::{Interval, TimeInput, Timeline};
use serde_json::{Map, Value};
use uuid::Uuid;

use crate::traits::TimelineStore;

/// A store plus the one timeline a caller is working on.
///
/// Mutations persist eagerly: `init` and `insert` write the full document
/// back to the store before returning.
pub struct Session<S: TimelineStore> {
    store: S,
    timeline: Option<Timeline>,
}

impl<S: TimelineStore> Session<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            timeline: None,
        }
    }

    /// Creates and persists a fresh timeline with its founding interval.
    ///
    /// Fails with [`CovenantError::AlreadyInitialized`] when this session
    /// already holds a timeline; use a fresh session instead.
    pub async fn init(
        &mut self,
        start_at: impl Into<TimeInput>,
        end_at: impl Into<TimeInput>,
        payload: Map<String, Value>,
        metadata: Map<String, Value>,
    ) -> Result<Uuid> {
        if let Some(existing) = &self.timeline {
            return Err(CovenantError::AlreadyInitialized(existing.id()));
        }

        let timeline = Timeline::initialize(start_at, end_at, payload, metadata)?;
        self.store.save(&timeline).await?;

        let id = timeline.id();
        self.timeline = Some(timeline);
        Ok(id)
    }

    /// Loads an existing timeline into the session.
    pub async fn open(&mut self, id: Uuid) -> Result<()> {
        let timeline = self
            .store
            .load(id)
            .await?
            .ok_or(CovenantError::TimelineNotFound(id))?;
        self.timeline = Some(timeline);
        Ok(())
    }

    /// Inserts an interval into the held timeline and persists the result.
    ///
    /// # Panics
    ///
    /// Panics when no timeline has been initialized or opened; that is a
    /// programming error, not a runtime condition.
    pub async fn insert(
        &mut self,
        payload: Map<String, Value>,
        start_at: impl Into<TimeInput>,
        end_at: Option<TimeInput>,
    ) -> Result<Interval> {
        let timeline = self
            .timeline
            .as_mut()
            .expect("session holds no timeline; call init or open first");

        let interval = timeline.insert(payload, start_at, end_at)?;
        self.store.save(timeline).await?;
        Ok(interval)
    }

    pub fn timeline(&self) -> Option<&Timeline> {
        self.timeline.as_ref()
    }

    pub fn active_at(&self, at: impl Into<TimeInput>) -> Option<&Interval> {
        self.timeline.as_ref().and_then(|timeline| timeline.active_at(at))
    }

    pub fn describe(&self) -> Option<String> {
        self.timeline.as_ref().map(Timeline::describe)
    }

    /// Writes the held timeline back to the store.
    pub async fn commit(&self) -> Result<()> {
        if let Some(timeline) = &self.timeline {
            self.store.save(timeline).await?;
        }
        Ok(())
    }
}
