//! Item export: catalog products → ERP items, one request each.
//!
//! ```text
//! GET LOGPART ──► ERP SKU set
//!      │
//!      ▼
//! for each top-level product with a SKU
//!      ├── SKU in set  → PATCH LOGPART
//!      └── otherwise   → POST  LOGPART
//! ```

use ledgerlink_core::erp::ErpItem;
use ledgerlink_core::payload::ItemPayload;
use serde::Serialize;
use std::collections::HashSet;
use tracing::{debug, info, warn};

use super::SyncEngine;
use crate::client::ErpMethod;
use crate::error::SyncResult;
use crate::kind::SyncKind;

const RESOURCE: &str = "LOGPART";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct ExportSummary {
    pub created: usize,
    pub updated: usize,
    pub failed: usize,
    /// Products without a SKU.
    pub skipped: usize,
}

impl SyncEngine {
    /// Pushes every top-level catalog product to the ERP.
    ///
    /// A failing item is reported and counted; the loop goes on.
    pub async fn export_items(&self) -> SyncResult<ExportSummary> {
        let kind = SyncKind::ItemExport;
        let _guard = self.try_guard(kind)?;
        info!("Starting item export");

        let known: HashSet<String> = self
            .fetch::<ErpItem>(kind, RESOURCE, false)
            .await?
            .into_iter()
            .filter_map(|item| item.part_name)
            .collect();

        let mut summary = ExportSummary::default();

        for product in self.store.top_level_products().await? {
            if product.sku.trim().is_empty() {
                summary.skipped += 1;
                continue;
            }

            let exists = known.contains(&product.sku);
            let method = if exists { ErpMethod::Patch } else { ErpMethod::Post };
            let payload = ItemPayload::from_product(&product);

            match self.send(kind, method, RESOURCE, &payload).await {
                Ok(_) if exists => summary.updated += 1,
                Ok(_) => summary.created += 1,
                Err(e) => {
                    warn!(sku = %product.sku, %method, error = %e, "Item export failed");
                    summary.failed += 1;
                    continue;
                }
            }
            debug!(sku = %product.sku, %method, "Item exported");
        }

        self.record_run(kind).await?;

        info!(
            created = summary.created,
            updated = summary.updated,
            failed = summary.failed,
            skipped = summary.skipped,
            "Item export complete"
        );
        Ok(summary)
    }
}
