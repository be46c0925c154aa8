//! # Scheduler
//!
//! One tokio interval per enabled schedule row, plus a daily request log
//! prune.
//!
//! ```text
//! [[schedule]] rows ──► enabled_schedules() ──► ScheduledSync { kind, schedule }
//!                                                   │
//!                                                   ▼
//!                                   tokio::spawn(interval(schedule))
//!                                                   │  tick
//!                                                   ▼
//!                                          engine.run(kind)  (logged only)
//! ```

use std::sync::Arc;
use std::time::Duration;

use ledgerlink_sync::{ScheduledSync, SyncEngine, SyncError};
use tokio::task::JoinHandle;
use tokio::time::{interval, MissedTickBehavior};
use tracing::{debug, error, info, warn};

const PRUNE_INTERVAL: Duration = Duration::from_secs(24 * 60 * 60);

/// Starts every scheduled task. Abort the handles to stop them.
pub fn spawn(engine: Arc<SyncEngine>) -> anyhow::Result<Vec<JoinHandle<()>>> {
    let schedules = engine.config().scheduled_syncs()?;
    let mut handles = Vec::with_capacity(schedules.len() + 1);

    for scheduled in schedules {
        info!(
            sync = %scheduled.kind,
            every_secs = scheduled.schedule.interval().as_secs(),
            "Scheduling sync"
        );
        handles.push(tokio::spawn(run_every(engine.clone(), scheduled)));
    }

    handles.push(tokio::spawn(prune_request_log(engine)));
    Ok(handles)
}

async fn run_every(engine: Arc<SyncEngine>, scheduled: ScheduledSync) {
    let mut ticker = interval(scheduled.schedule.interval());
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    // First tick completes immediately.
    ticker.tick().await;

    loop {
        ticker.tick().await;
        debug!(sync = %scheduled.kind, "Scheduled sync starting");

        match engine.run(scheduled.kind).await {
            Ok(summary) => info!(sync = %scheduled.kind, ?summary, "Scheduled sync complete"),
            Err(SyncError::AlreadyRunning(_)) => {
                debug!(sync = %scheduled.kind, "Previous run still in progress")
            }
            Err(e) => error!(sync = %scheduled.kind, error = %e, "Scheduled sync failed"),
        }
    }
}

async fn prune_request_log(engine: Arc<SyncEngine>) {
    let retention_days = engine.config().logging.retention_days;
    if retention_days <= 0 {
        debug!("Request log retention disabled");
        return;
    }

    let mut ticker = interval(PRUNE_INTERVAL);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

    loop {
        ticker.tick().await;
        match engine
            .database()
            .request_log()
            .cleanup_older_than(retention_days)
            .await
        {
            Ok(0) => {}
            Ok(removed) => info!(removed, retention_days, "Pruned ERP request log"),
            Err(e) => warn!(error = %e, "Failed to prune ERP request log"),
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlink_db::{Database, DbConfig};
    use ledgerlink_sync::{BridgeConfig, ScheduleEntry};

    async fn engine(schedule: Vec<ScheduleEntry>) -> Arc<SyncEngine> {
        let mut config = BridgeConfig::default();
        config.erp.url = "http://127.0.0.1:9".into();
        config.schedule = schedule;
        config.logging.retention_days = 0;

        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        Arc::new(SyncEngine::from_config(config, db).unwrap())
    }

    fn entry(sync_name: &str, schedule: &str, enabled: bool) -> ScheduleEntry {
        ScheduleEntry {
            sync_name: sync_name.into(),
            schedule: schedule.into(),
            enabled,
        }
    }

    #[tokio::test]
    async fn test_only_enabled_rows_are_spawned() {
        let engine = engine(vec![
            entry("sync_items_priority", "hourly", true),
            entry("sync_orders_web", "15m", false),
        ])
        .await;

        let handles = spawn(engine).unwrap();
        // One sync task plus the prune task.
        assert_eq!(handles.len(), 2);
        for handle in handles {
            handle.abort();
        }
    }

    #[tokio::test]
    async fn test_bad_schedule_refuses_to_start() {
        let engine = engine(vec![entry("sync_items_priority", "fortnightly", true)]).await;
        assert!(spawn(engine).is_err());
    }
}
