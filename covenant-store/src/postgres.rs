use async_trait::async_trait;
use covenant_core::config::CoreConfig;
use covenant_core::db::DatabasePool;
use covenant_core::errors::{CovenantError, Result};
use covenant_protocol::{codec, Timeline};
use serde_json::Value;
use uuid::Uuid;

use crate::traits::TimelineStore;

/// Postgres-backed store: one JSONB document per timeline with
/// upsert-by-identifier semantics.
#[derive(Clone)]
pub struct PostgresStore {
    pool: DatabasePool,
}

impl PostgresStore {
    /// Connects using the supplied configuration and ensures migrations ran.
    pub async fn from_config(config: &CoreConfig) -> Result<Self> {
        let pool = DatabasePool::connect(config).await?;
        Self::from_pool(pool).await
    }

    /// Builds the store from an existing database pool.
    pub async fn from_pool(pool: DatabasePool) -> Result<Self> {
        sqlx::migrate!("./migrations")
            .run(pool.inner())
            .await
            .map_err(|err| CovenantError::Storage(err.to_string()))?;
        Ok(Self { pool })
    }
}

#[async_trait]
impl TimelineStore for PostgresStore {
    async fn load(&self, id: Uuid) -> Result<Option<Timeline>> {
        let row: Option<(Value,)> =
            sqlx::query_as("SELECT document FROM covenant_timelines WHERE id = $1")
                .bind(id)
                .fetch_optional(self.pool.inner())
                .await?;

        row.map(|(document,)| codec::decode(document).map_err(Into::into))
            .transpose()
    }

    async fn save(&self, timeline: &Timeline) -> Result<()> {
        let document = codec::encode(timeline)?;

        sqlx::query(
            r#"
            INSERT INTO covenant_timelines (id, document, created_at)
            VALUES ($1, $2, $3)
            ON CONFLICT (id) DO UPDATE
            SET document = EXCLUDED.document, updated_at = now()
            "#,
        )
        .bind(timeline.id())
        .bind(document)
        .bind(timeline.created_at())
        .execute(self.pool.inner())
        .await?;

        Ok(())
    }

    async fn exists(&self, id: Uuid) -> Result<bool> {
        let present: bool =
            sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM covenant_timelines WHERE id = $1)")
                .bind(id)
                .fetch_one(self.pool.inner())
                .await?;
        Ok(present)
    }
}
