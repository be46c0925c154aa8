//! # ERP Request Log Repository
//!
//! Optional trail of ERP calls, enabled per sync type under `[logging]`.
//! Rows are append-only; old rows are pruned with [`RequestLogRepository::cleanup_older_than`].

use chrono::{DateTime, Duration, Utc};
use serde::Serialize;
use sqlx::SqlitePool;
use tracing::{debug, info};
use uuid::Uuid;

use crate::error::DbResult;

/// A call about to be recorded.
#[derive(Debug, Clone, Default)]
pub struct NewRequestLog {
    pub tenant_id: String,
    /// Sync type that issued the call, or `ajax` for admin-side failures.
    pub sync_name: String,
    pub url: String,
    pub request_method: String,
    pub json_request: String,
    pub json_response: String,
    /// HTTP status; 0 when the transport failed.
    pub status_code: i64,
    pub ok: bool,
}

/// A recorded call.
#[derive(Debug, Clone, PartialEq, Serialize, sqlx::FromRow)]
pub struct RequestLogEntry {
    pub id: String,
    pub tenant_id: String,
    pub sync_name: String,
    pub url: String,
    pub request_method: String,
    pub json_request: String,
    pub json_response: String,
    pub status_code: i64,
    pub ok: bool,
    pub created_at: DateTime<Utc>,
}

/// Repository for the ERP request log.
#[derive(Debug, Clone)]
pub struct RequestLogRepository {
    pool: SqlitePool,
}

impl RequestLogRepository {
    /// Creates a new RequestLogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        RequestLogRepository { pool }
    }

    /// Appends one call to the log.
    pub async fn record(&self, new: NewRequestLog) -> DbResult<RequestLogEntry> {
        let entry = RequestLogEntry {
            id: Uuid::new_v4().to_string(),
            tenant_id: new.tenant_id,
            sync_name: new.sync_name,
            url: new.url,
            request_method: new.request_method,
            json_request: new.json_request,
            json_response: new.json_response,
            status_code: new.status_code,
            ok: new.ok,
            created_at: Utc::now(),
        };

        debug!(
            sync_name = %entry.sync_name,
            method = %entry.request_method,
            status = entry.status_code,
            "Recording ERP request"
        );

        sqlx::query(
            r#"
            INSERT INTO erp_request_log (
                id, tenant_id, sync_name, url, request_method,
                json_request, json_response, status_code, ok, created_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10)
            "#,
        )
        .bind(&entry.id)
        .bind(&entry.tenant_id)
        .bind(&entry.sync_name)
        .bind(&entry.url)
        .bind(&entry.request_method)
        .bind(&entry.json_request)
        .bind(&entry.json_response)
        .bind(entry.status_code)
        .bind(entry.ok)
        .bind(entry.created_at)
        .execute(&self.pool)
        .await?;

        Ok(entry)
    }

    /// Most recent calls first.
    pub async fn recent(&self, tenant_id: &str, limit: u32) -> DbResult<Vec<RequestLogEntry>> {
        let entries: Vec<RequestLogEntry> = sqlx::query_as(
            r#"
            SELECT id, tenant_id, sync_name, url, request_method,
                   json_request, json_response, status_code, ok, created_at
            FROM erp_request_log
            WHERE tenant_id = ?1
            ORDER BY created_at DESC
            LIMIT ?2
            "#,
        )
        .bind(tenant_id)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        Ok(entries)
    }

    /// Deletes rows older than `days` days. Returns the number removed.
    pub async fn cleanup_older_than(&self, days: i64) -> DbResult<u64> {
        let cutoff = Utc::now() - Duration::days(days);

        let removed = sqlx::query("DELETE FROM erp_request_log WHERE created_at < ?1")
            .bind(cutoff)
            .execute(&self.pool)
            .await?
            .rows_affected();

        if removed > 0 {
            info!(removed, days, "Pruned ERP request log");
        }

        Ok(removed)
    }
}
