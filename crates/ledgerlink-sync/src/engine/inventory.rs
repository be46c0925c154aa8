//! Inventory sync: first ERP counter → catalog stock.

use ledgerlink_core::erp::ErpItem;
use serde::Serialize;
use tracing::{debug, info};

use super::SyncEngine;
use crate::error::SyncResult;
use crate::kind::SyncKind;

const RESOURCE: &str = "LOGPART?$expand=LOGCOUNTERS_SUBFORM";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InventorySummary {
    pub updated: usize,
    /// Rows without a usable counter or with an unknown SKU.
    pub skipped: usize,
}

impl SyncEngine {
    /// Sets stock from each row's first counter.
    ///
    /// Rows without a counter and SKUs missing from the catalog are left alone.
    pub async fn sync_inventory(&self) -> SyncResult<InventorySummary> {
        let kind = SyncKind::Inventory;
        let _guard = self.try_guard(kind)?;
        info!("Starting inventory sync");

        let items: Vec<ErpItem> = self.fetch(kind, RESOURCE, true).await?;
        let mut summary = InventorySummary::default();

        for item in &items {
            let Some(level) = item.first_counter_stock() else {
                summary.skipped += 1;
                continue;
            };
            if item.sku().trim().is_empty() {
                summary.skipped += 1;
                continue;
            }
            let Some(product_id) = self.store.product_id_by_sku(item.sku()).await? else {
                summary.skipped += 1;
                continue;
            };

            self.store.set_stock(product_id, level).await?;
            debug!(sku = %item.sku(), quantity = level.quantity, "Stock updated");
            summary.updated += 1;
        }

        self.record_run(kind).await?;

        info!(
            updated = summary.updated,
            skipped = summary.skipped,
            "Inventory sync complete"
        );
        Ok(summary)
    }
}
