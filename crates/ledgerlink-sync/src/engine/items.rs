//! Item sync: active ERP items become simple catalog products.

use ledgerlink_core::erp::ErpItem;
use serde::Serialize;
use tracing::{debug, info, warn};

use super::SyncEngine;
use crate::error::SyncResult;
use crate::kind::SyncKind;

const RESOURCE: &str = "LOGPART?$filter=ROYY_ISUDATE eq 'Y'";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ItemSyncSummary {
    pub created: usize,
    pub updated: usize,
    pub skipped: usize,
}

impl SyncEngine {
    /// Upserts every active ERP item by SKU.
    ///
    /// Existing products get title, prices and manage-stock; new ones start
    /// with zero stock, out of stock. A failed fetch leaves the catalog alone.
    pub async fn sync_items(&self) -> SyncResult<ItemSyncSummary> {
        let kind = SyncKind::Items;
        let _guard = self.try_guard(kind)?;
        info!("Starting item sync");

        let items: Vec<ErpItem> = self.fetch(kind, RESOURCE, true).await?;
        let mut summary = ItemSyncSummary::default();

        for item in &items {
            if item.sku().trim().is_empty() {
                warn!("Skipping ERP item without PARTNAME");
                summary.skipped += 1;
                continue;
            }

            let upsert = item.to_upsert();
            match self.store.product_id_by_sku(&upsert.sku).await? {
                Some(id) => {
                    self.store.update_simple(id, &upsert).await?;
                    debug!(sku = %upsert.sku, product_id = id, "Item updated");
                    summary.updated += 1;
                }
                None => {
                    let id = self.store.create_simple(&upsert).await?;
                    debug!(sku = %upsert.sku, product_id = id, "Item created");
                    summary.created += 1;
                }
            }
        }

        self.record_run(kind).await?;

        info!(
            created = summary.created,
            updated = summary.updated,
            skipped = summary.skipped,
            "Item sync complete"
        );
        Ok(summary)
    }
}
