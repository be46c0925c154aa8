//! # Sync Engine
//!
//! Owns the collaborators and runs the directional syncs.
//!
//! ## Pipeline
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        One Sync Operation                               │
//! │                                                                         │
//! │   try_guard(kind) ──► AlreadyRunning if another run holds it            │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   fetch / send ──► ErpClient (one request awaited at a time)            │
//! │        │                 │                                              │
//! │        │                 └── request log row (per [logging] flag)       │
//! │        │                                                                │
//! │        ├── ok=false / undecodable ──► ErrorReport ──► Notifier          │
//! │        │                              return SyncError::Remote          │
//! │        ▼                                                                │
//! │   map + write (CatalogStore / UserStore / PriceListRepository)         │
//! │        │                                                                │
//! │        ▼                                                                │
//! │   record_run(kind.timestamp_key())                                      │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! The engine is built once by the daemon and shared through `Arc`.
//! Entity-scoped calls (one customer, order or receipt) do not take the
//! run guard; full and bulk runs do.

mod customers;
mod export;
mod inventory;
mod items;
mod orders;
mod price_lists;
mod receipts;
mod variations;

#[cfg(test)]
pub(crate) mod testing;

pub use customers::CustomerOutcome;
pub use export::ExportSummary;
pub use inventory::InventorySummary;
pub use items::ItemSyncSummary;
pub use orders::{AfterOrderReport, StepResult};
pub use price_lists::PriceListSyncSummary;
pub use variations::VariationSyncSummary;

use chrono::Utc;
use ledgerlink_core::erp::ErpFeed;
use ledgerlink_db::{Database, NewRequestLog, SyncRun};
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::sync::Arc;
use tokio::sync::{Mutex, MutexGuard};
use tracing::{error, info, warn};

use crate::client::{ErpClient, ErpMethod, ErpResponse, HttpErpClient};
use crate::config::BridgeConfig;
use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;
use crate::report::{ErrorReport, LogNotifier, Notifier};
use crate::sqlite::SqliteStorefront;
use crate::store::Storefront;

// =============================================================================
// Summaries
// =============================================================================

/// Per-entity tally of a bulk run.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BulkSummary {
    pub succeeded: usize,
    pub failed: usize,
}

/// What a full run of one sync kind did.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "sync", rename_all = "snake_case")]
pub enum RunSummary {
    Items(ItemSyncSummary),
    Variations(VariationSyncSummary),
    Inventory(InventorySummary),
    ItemExport(ExportSummary),
    PriceLists(PriceListSyncSummary),
    Customers(BulkSummary),
    Orders(BulkSummary),
    Receipts(BulkSummary),
}

// =============================================================================
// Sync Engine
// =============================================================================

/// Runs the storefront ↔ ERP syncs.
pub struct SyncEngine {
    config: Arc<BridgeConfig>,

    db: Database,

    erp: Arc<dyn ErpClient>,

    store: Arc<dyn Storefront>,

    notifier: Arc<dyn Notifier>,

    /// One run guard per sync kind, indexed by `SyncKind::index`.
    guards: [Mutex<()>; SyncKind::ALL.len()],
}

impl SyncEngine {
    /// Creates an engine that logs its error reports.
    pub fn new(
        config: BridgeConfig,
        db: Database,
        erp: Arc<dyn ErpClient>,
        store: Arc<dyn Storefront>,
    ) -> Self {
        Self::with_notifier(config, db, erp, store, Arc::new(LogNotifier))
    }

    /// Creates an engine with a custom notifier.
    pub fn with_notifier(
        config: BridgeConfig,
        db: Database,
        erp: Arc<dyn ErpClient>,
        store: Arc<dyn Storefront>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        SyncEngine {
            config: Arc::new(config),
            db,
            erp,
            store,
            notifier,
            guards: std::array::from_fn(|_| Mutex::new(())),
        }
    }

    /// Engine over the reqwest client and the local storefront mirror.
    pub fn from_config(config: BridgeConfig, db: Database) -> SyncResult<Self> {
        let erp = Arc::new(HttpErpClient::new(&config.erp)?);
        let store = Arc::new(SqliteStorefront::new(db.clone()));
        Ok(Self::new(config, db, erp, store))
    }

    pub fn config(&self) -> &BridgeConfig {
        &self.config
    }

    pub fn database(&self) -> &Database {
        &self.db
    }

    pub fn storefront(&self) -> Arc<dyn Storefront> {
        Arc::clone(&self.store)
    }

    pub fn erp(&self) -> &dyn ErpClient {
        self.erp.as_ref()
    }

    pub fn notifier(&self) -> &dyn Notifier {
        self.notifier.as_ref()
    }

    // =========================================================================
    // Dispatch
    // =========================================================================

    /// Runs the full (argument-less) form of a sync.
    pub async fn run(&self, kind: SyncKind) -> SyncResult<RunSummary> {
        let summary = match kind {
            SyncKind::Items => RunSummary::Items(self.sync_items().await?),
            SyncKind::Variations => RunSummary::Variations(self.sync_variations().await?),
            SyncKind::Inventory => RunSummary::Inventory(self.sync_inventory().await?),
            SyncKind::ItemExport => RunSummary::ItemExport(self.export_items().await?),
            SyncKind::PriceLists => RunSummary::PriceLists(self.sync_price_lists().await?),
            SyncKind::Customers => RunSummary::Customers(self.sync_all_customers().await?),
            SyncKind::Orders => RunSummary::Orders(self.sync_all_orders().await?),
            SyncKind::Receipts => RunSummary::Receipts(self.sync_all_receipts().await?),
        };
        Ok(summary)
    }

    /// Last-run timestamps of every sync that has completed at least once.
    pub async fn last_runs(&self) -> SyncResult<Vec<SyncRun>> {
        Ok(self.db.sync_state().all_runs(self.config.tenant_id()).await?)
    }

    // =========================================================================
    // Shared Plumbing
    // =========================================================================

    /// Claims the run guard of a kind, failing fast when it is held.
    pub(crate) fn try_guard(&self, kind: SyncKind) -> SyncResult<MutexGuard<'_, ()>> {
        self.guards[kind.index()].try_lock().map_err(|_| {
            warn!(sync = %kind, "Sync already running, skipping");
            SyncError::AlreadyRunning(kind.sync_name().to_string())
        })
    }

    /// Issues one ERP request, recording it when logging is on for `kind`.
    pub(crate) async fn call(
        &self,
        kind: SyncKind,
        method: ErpMethod,
        resource: &str,
        body: Option<&str>,
        log: bool,
    ) -> ErpResponse {
        let response = self.erp.request(method, resource, body).await;

        if log && self.config.logging.enabled(kind) {
            let entry = NewRequestLog {
                tenant_id: self.config.tenant_id().to_string(),
                sync_name: kind.sync_name().to_string(),
                url: self.erp.resource_url(resource),
                request_method: method.as_str().to_string(),
                json_request: body.unwrap_or_default().to_string(),
                json_response: response.raw_body.clone(),
                status_code: i64::from(response.status_code),
                ok: response.ok,
            };
            if let Err(e) = self.db.request_log().record(entry).await {
                warn!(sync = %kind, error = %e, "Failed to record ERP request");
            }
        }

        response
    }

    /// Sends the error report for a failed call.
    pub(crate) fn report(&self, kind: SyncKind, body: &str) {
        let report = ErrorReport::remote(kind, self.config.recipient_for(kind.sync_name()), body);
        self.notifier.notify(&report);
    }

    /// Reports a failed response and turns it into `SyncError::Remote`.
    pub(crate) fn remote_failure(
        &self,
        kind: SyncKind,
        resource: &str,
        response: ErpResponse,
    ) -> SyncError {
        error!(
            sync = %kind,
            resource,
            status = response.status_code,
            "ERP request failed"
        );
        self.report(kind, &response.raw_body);
        SyncError::Remote {
            resource: resource.to_string(),
            status: response.status_code,
            body: response.raw_body,
        }
    }

    /// GETs a feed and decodes its rows.
    ///
    /// An undecodable body is reported like a failed call.
    pub(crate) async fn fetch<T: DeserializeOwned>(
        &self,
        kind: SyncKind,
        resource: &str,
        log: bool,
    ) -> SyncResult<Vec<T>> {
        let response = self.call(kind, ErpMethod::Get, resource, None, log).await;
        if !response.ok {
            return Err(self.remote_failure(kind, resource, response));
        }

        match ErpFeed::<T>::decode(resource, &response.raw_body) {
            Ok(feed) => Ok(feed.value),
            Err(e) => {
                error!(sync = %kind, resource, error = %e, "Undecodable ERP response");
                self.report(kind, &response.raw_body);
                Err(e.into())
            }
        }
    }

    /// POSTs or PATCHes a payload; a failed call is reported and returned.
    pub(crate) async fn send<P: Serialize>(
        &self,
        kind: SyncKind,
        method: ErpMethod,
        resource: &str,
        payload: &P,
    ) -> SyncResult<ErpResponse> {
        let body = serde_json::to_string(payload)?;
        let response = self.call(kind, method, resource, Some(&body), true).await;
        if response.ok {
            Ok(response)
        } else {
            Err(self.remote_failure(kind, resource, response))
        }
    }

    /// Stamps the last-run timestamp of a sync.
    pub(crate) async fn record_run(&self, kind: SyncKind) -> SyncResult<()> {
        self.db
            .sync_state()
            .record_run(self.config.tenant_id(), kind.timestamp_key(), Utc::now())
            .await?;
        info!(sync = %kind, "Sync timestamp recorded");
        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::testing::{harness, ok, status, ScriptedErp};
    use super::*;

    #[tokio::test]
    async fn test_guard_rejects_second_run() {
        let h = harness(ScriptedErp::new()).await;

        let held = h.engine.try_guard(SyncKind::Items).unwrap();
        let err = h.engine.sync_items().await.unwrap_err();
        assert!(matches!(err, SyncError::AlreadyRunning(ref name) if name == "sync_items_priority"));

        // Other kinds are independent
        assert!(h.engine.try_guard(SyncKind::Inventory).is_ok());

        drop(held);
        assert!(h.engine.try_guard(SyncKind::Items).is_ok());
    }

    #[tokio::test]
    async fn test_failed_fetch_reports_raw_body() {
        let erp = ScriptedErp::new().on(
            ErpMethod::Get,
            "LOGPART?$expand=LOGCOUNTERS_SUBFORM",
            status(503, "maintenance window"),
        );
        let h = harness(erp).await;

        let err = h.engine.sync_inventory().await.unwrap_err();
        assert!(err.is_remote());

        let reports = h.notifier.reports();
        assert_eq!(reports.len(), 1);
        assert_eq!(reports[0].subject, "Error Sync Inventory Priority");
        assert_eq!(reports[0].body, "maintenance window");
        assert_eq!(reports[0].recipient, "inventory@example.com");
        assert!(h.engine.last_runs().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_undecodable_body_is_remote_failure() {
        let erp = ScriptedErp::new().on(
            ErpMethod::Get,
            "LOGPART?$filter=ROYY_ISUDATE eq 'Y'",
            ok("<html>Login</html>"),
        );
        let h = harness(erp).await;

        let err = h.engine.sync_items().await.unwrap_err();
        assert!(matches!(err, SyncError::Decode(_)));
        assert_eq!(h.notifier.reports()[0].body, "<html>Login</html>");
    }

    #[tokio::test]
    async fn test_calls_are_logged_per_flag() {
        let erp = ScriptedErp::new()
            .on(ErpMethod::Get, "LOGPART?$filter=ROYY_ISUDATE eq 'Y'", ok(r#"{"value":[]}"#))
            .on(ErpMethod::Get, "LOGPART?$expand=LOGCOUNTERS_SUBFORM", ok(r#"{"value":[]}"#));
        let mut config = testing::config();
        config.logging.inventory_priority = false;
        let h = testing::harness_with(erp, config).await;

        h.engine.sync_items().await.unwrap();
        h.engine.sync_inventory().await.unwrap();

        let log = h
            .db
            .request_log()
            .recent(h.engine.config().tenant_id(), 10)
            .await
            .unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].sync_name, "sync_items_priority");
        assert_eq!(log[0].request_method, "GET");
        assert!(log[0].url.ends_with("/odata/Priority/tabula.ini/demo/LOGPART?$filter=ROYY_ISUDATE eq 'Y'"));
    }

    #[tokio::test]
    async fn test_run_dispatches_by_kind() {
        let erp = ScriptedErp::new().on(
            ErpMethod::Get,
            "PRICELIST?$expand=PLISTCUSTOMERS_SUBFORM,PARTPRICE2_SUBFORM",
            ok(r#"{"value":[]}"#),
        );
        let h = harness(erp).await;

        let summary = h.engine.run(SyncKind::PriceLists).await.unwrap();
        assert_eq!(
            summary,
            RunSummary::PriceLists(PriceListSyncSummary { lists: 0, entries: 0 })
        );

        let runs = h.engine.last_runs().await.unwrap();
        assert_eq!(runs.len(), 1);
        assert_eq!(runs[0].sync_key, "pricelist_priority_update");
    }
}
