//! # Sync State Repository
//!
//! Last successful run per sync type, shown next to the admin sync buttons.

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::debug;

use crate::error::DbResult;

/// One recorded run.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct SyncRun {
    pub sync_key: String,
    pub last_run_at: DateTime<Utc>,
}

/// Repository for sync run timestamps.
#[derive(Debug, Clone)]
pub struct SyncStateRepository {
    pool: SqlitePool,
}

impl SyncStateRepository {
    /// Creates a new SyncStateRepository.
    pub fn new(pool: SqlitePool) -> Self {
        SyncStateRepository { pool }
    }

    /// Records `at` as the last run of `sync_key`, replacing any previous value.
    pub async fn record_run(&self, tenant_id: &str, sync_key: &str, at: DateTime<Utc>) -> DbResult<()> {
        debug!(sync_key = %sync_key, at = %at, "Recording sync run");

        sqlx::query(
            r#"
            INSERT INTO sync_runs (tenant_id, sync_key, last_run_at)
            VALUES (?1, ?2, ?3)
            ON CONFLICT (tenant_id, sync_key) DO UPDATE SET last_run_at = excluded.last_run_at
            "#,
        )
        .bind(tenant_id)
        .bind(sync_key)
        .bind(at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Last run of `sync_key`, if it ever succeeded.
    pub async fn last_run(&self, tenant_id: &str, sync_key: &str) -> DbResult<Option<DateTime<Utc>>> {
        let at: Option<DateTime<Utc>> = sqlx::query_scalar(
            "SELECT last_run_at FROM sync_runs WHERE tenant_id = ?1 AND sync_key = ?2",
        )
        .bind(tenant_id)
        .bind(sync_key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(at)
    }

    /// Every recorded run, ordered by key.
    pub async fn all_runs(&self, tenant_id: &str) -> DbResult<Vec<SyncRun>> {
        let runs: Vec<SyncRun> = sqlx::query_as(
            r#"
            SELECT sync_key, last_run_at FROM sync_runs
            WHERE tenant_id = ?1
            ORDER BY sync_key
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(runs)
    }
}
