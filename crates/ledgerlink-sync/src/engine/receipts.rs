//! Receipt sync: completed orders → ERP receipts (`TINVOICES`).

use ledgerlink_core::payload::ReceiptPayload;
use tracing::{info, warn};

use super::{BulkSummary, SyncEngine};
use crate::client::ErpMethod;
use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;

const RESOURCE: &str = "TINVOICES";

impl SyncEngine {
    /// Posts the receipt of one order.
    ///
    /// `cod` orders carry a cash amount; everything else one payment row.
    pub async fn sync_receipt(&self, order_id: i64) -> SyncResult<()> {
        let kind = SyncKind::Receipts;

        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| SyncError::not_found("Order", order_id))?;

        let payload =
            ReceiptPayload::build(&order, self.config.walkin_number(), &self.config.mapping);
        self.send(kind, ErpMethod::Post, RESOURCE, &payload).await?;

        self.record_run(kind).await?;
        info!(order_id, "Receipt synced");
        Ok(())
    }

    /// Posts a receipt for every completed order, continuing past failures.
    pub async fn sync_all_receipts(&self) -> SyncResult<BulkSummary> {
        let _guard = self.try_guard(SyncKind::Receipts)?;
        let ids = self.store.completed_order_ids().await?;
        info!(count = ids.len(), "Starting receipt sync");

        let mut summary = BulkSummary::default();
        for order_id in ids {
            match self.sync_receipt(order_id).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    warn!(order_id, error = %e, "Receipt sync failed");
                    summary.failed += 1;
                }
            }
        }

        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Receipt sync complete"
        );
        Ok(summary)
    }
}
