//! Order sync and the after-order hook.
//!
//! ```text
//! on_order_processed(id)
//!   ├── customer (registered buyers only)
//!   ├── order    POST ORDERS
//!   └── receipt  POST TINVOICES (when sync_receipts_on_order)
//! ```
//! Each step runs regardless of how the previous one ended.

use ledgerlink_core::payload::OrderPayload;
use serde::Serialize;
use tracing::{info, warn};

use super::{BulkSummary, SyncEngine};
use crate::client::ErpMethod;
use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;

const RESOURCE: &str = "ORDERS";

/// Outcome of one after-order step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StepResult {
    pub ok: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> From<SyncResult<T>> for StepResult {
    fn from(result: SyncResult<T>) -> Self {
        match result {
            Ok(_) => StepResult { ok: true, error: None },
            Err(e) => StepResult {
                ok: false,
                error: Some(e.to_string()),
            },
        }
    }
}

/// What the after-order hook did, step by step.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AfterOrderReport {
    /// `None` for guest checkout.
    pub customer: Option<StepResult>,
    pub order: StepResult,
    /// `None` unless receipts follow orders.
    pub receipt: Option<StepResult>,
}

impl SyncEngine {
    /// Posts one order to the ERP.
    pub async fn sync_order(&self, order_id: i64) -> SyncResult<()> {
        let kind = SyncKind::Orders;

        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| SyncError::not_found("Order", order_id))?;

        let payload = OrderPayload::build(&order, self.config.walkin_number(), &self.config.mapping);
        self.send(kind, ErpMethod::Post, RESOURCE, &payload).await?;

        self.record_run(kind).await?;
        info!(order_id, lines = payload.items.len(), "Order synced");
        Ok(())
    }

    /// Posts every processing order.
    pub async fn sync_all_orders(&self) -> SyncResult<BulkSummary> {
        let _guard = self.try_guard(SyncKind::Orders)?;
        let ids = self.store.processing_order_ids().await?;
        info!(count = ids.len(), "Starting order sync");
        Ok(self.orders_in_turn(&ids).await)
    }

    /// Posts the given orders; a failing order does not stop the rest.
    pub async fn sync_orders(&self, order_ids: &[i64]) -> SyncResult<BulkSummary> {
        let _guard = self.try_guard(SyncKind::Orders)?;
        Ok(self.orders_in_turn(order_ids).await)
    }

    /// Runs the customer, order and receipt steps for a processed order.
    pub async fn on_order_processed(&self, order_id: i64) -> SyncResult<AfterOrderReport> {
        let order = self
            .store
            .order(order_id)
            .await?
            .ok_or_else(|| SyncError::not_found("Order", order_id))?;

        let customer = if order.is_guest() {
            None
        } else {
            Some(StepResult::from(self.sync_customer(order.customer_id).await))
        };

        let order_step = StepResult::from(self.sync_order(order_id).await);

        let receipt = if self.config.sync_receipts_on_order {
            Some(StepResult::from(self.sync_receipt(order_id).await))
        } else {
            None
        };

        let report = AfterOrderReport {
            customer,
            order: order_step,
            receipt,
        };
        if !report.order.ok {
            warn!(order_id, error = ?report.order.error, "After-order sync incomplete");
        }
        Ok(report)
    }

    async fn orders_in_turn(&self, order_ids: &[i64]) -> BulkSummary {
        let mut summary = BulkSummary::default();
        for &order_id in order_ids {
            match self.sync_order(order_id).await {
                Ok(()) => summary.succeeded += 1,
                Err(e) => {
                    warn!(order_id, error = %e, "Order sync failed");
                    summary.failed += 1;
                }
            }
        }
        info!(
            succeeded = summary.succeeded,
            failed = summary.failed,
            "Order sync complete"
        );
        summary
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{config, harness, harness_with, seed_order, status, ScriptedErp};
    use ledgerlink_core::OrderStatus;
    use ledgerlink_db::NewUser;
    use serde_json::json;

    fn accepting() -> ScriptedErp {
        ScriptedErp::new()
            .on(ErpMethod::Post, RESOURCE, status(201, "{}"))
            .on(ErpMethod::Post, "CUSTOMERS", status(201, "{}"))
            .on(ErpMethod::Post, "TINVOICES", status(201, "{}"))
    }

    #[tokio::test]
    async fn test_order_payload_is_posted() {
        let mut config = config();
        config.mapping.shipping.insert("flat_rate_3".into(), "SHIP-FLAT".into());
        let h = harness_with(accepting(), config).await;
        seed_order(&h, 501, 0, OrderStatus::Processing, "creditguard").await;

        h.engine.sync_order(501).await.unwrap();

        let body = h.erp.calls_to(ErpMethod::Post, RESOURCE)[0].json();
        assert_eq!(body["CUSTNAME"], json!("WALKIN"));
        assert_eq!(body["CDES"], json!("Dana Levi"));
        assert_eq!(body["CURDATE"], json!("2024-03-07"));
        assert_eq!(body["BOOKNUM"], json!("501"));

        let items = body["ORDERITEMS_SUBFORM"].as_array().unwrap();
        assert_eq!(items.len(), 2);
        assert_eq!(items[0]["PARTNAME"], json!("A1"));
        assert_eq!(items[0]["TQUANT"], json!(2));
        assert_eq!(items[1]["PARTNAME"], json!("000"));
        assert_eq!(items[1]["PDES"], json!("SHIP-FLAT"));

        assert_eq!(body["PAYMENTDEF_SUBFORM"]["PAYMENTCODE"], json!("creditguard"));
        assert_eq!(body["PAYMENTDEF_SUBFORM"]["PAYACCOUNT"], json!("4580"));

        let last = h
            .db
            .sync_state()
            .last_run(h.engine.config().tenant_id(), "orders_web_update")
            .await
            .unwrap();
        assert!(last.is_some());
    }

    #[tokio::test]
    async fn test_missing_order_is_not_found() {
        let h = harness(accepting()).await;
        let err = h.engine.sync_order(999).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
        assert!(h.erp.calls().is_empty());
    }

    #[tokio::test]
    async fn test_sync_all_posts_processing_only() {
        let h = harness(accepting()).await;
        seed_order(&h, 1, 0, OrderStatus::Processing, "cod").await;
        seed_order(&h, 2, 0, OrderStatus::Completed, "cod").await;
        seed_order(&h, 3, 0, OrderStatus::Processing, "cod").await;

        let summary = h.engine.sync_all_orders().await.unwrap();
        assert_eq!(summary, BulkSummary { succeeded: 2, failed: 0 });

        let numbers: Vec<_> = h
            .erp
            .calls_to(ErpMethod::Post, RESOURCE)
            .iter()
            .map(|c| c.json()["BOOKNUM"].clone())
            .collect();
        assert_eq!(numbers, vec![json!("1"), json!("3")]);
    }

    #[tokio::test]
    async fn test_after_order_runs_every_step() {
        let mut config = config();
        config.sync_receipts_on_order = true;
        let erp = ScriptedErp::new()
            .on(ErpMethod::Post, "CUSTOMERS", status(201, "{}"))
            .on(ErpMethod::Post, RESOURCE, status(500, "order rejected"))
            .on(ErpMethod::Post, "TINVOICES", status(201, "{}"));
        let h = harness_with(erp, config).await;
        h.db.users()
            .insert(&NewUser {
                id: Some(42),
                email: "dana@example.com".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        seed_order(&h, 77, 42, OrderStatus::Processing, "cod").await;

        let report = h.engine.on_order_processed(77).await.unwrap();
        assert_eq!(report.customer, Some(StepResult { ok: true, error: None }));
        assert!(!report.order.ok);
        assert!(report.order.error.as_deref().unwrap().contains("ORDERS"));
        assert_eq!(report.receipt, Some(StepResult { ok: true, error: None }));

        let resources: Vec<_> = h.erp.calls().into_iter().map(|c| c.resource).collect();
        assert_eq!(resources, vec!["CUSTOMERS", "ORDERS", "TINVOICES"]);
    }

    #[tokio::test]
    async fn test_after_order_guest_without_receipts() {
        let h = harness(accepting()).await;
        seed_order(&h, 5, 0, OrderStatus::Processing, "cod").await;

        let report = h.engine.on_order_processed(5).await.unwrap();
        assert_eq!(report.customer, None);
        assert!(report.order.ok);
        assert_eq!(report.receipt, None);
        assert_eq!(h.erp.calls().len(), 1);
    }
}
