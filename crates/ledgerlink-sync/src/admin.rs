//! # Admin Actions
//!
//! Operator-triggered runs and settings, shaped for the admin UI.
//!
//! ## Result Shape
//! ```text
//! success:       {"status": 1, "timestamp": "07/03/2024 14:30:00"}
//! failure:       {"status": 0, "msg": "ERP request to LOGPART failed with status 500"}
//! unknown name:  {"status": 0, "msg": "Unknown method sync_foo"}
//! ```

use chrono::{DateTime, Local, Utc};
use ledgerlink_core::pricing::PriceListSummary;
use ledgerlink_core::validation::{validate_entity_id, validate_price_list_code};
use ledgerlink_core::{NO_PRICE_LIST_SENTINEL, PRICE_LIST_META_KEY};
use ledgerlink_db::NewRequestLog;
use serde::{Deserialize, Serialize};
use tracing::{error, info, warn};

use crate::client::ErpMethod;
use crate::engine::{BulkSummary, SyncEngine};
use crate::error::{SyncError, SyncResult};
use crate::kind::SyncKind;
use crate::report::ErrorReport;

/// Timestamp format shown next to a successful run.
pub const TIMESTAMP_FORMAT: &str = "%d/%m/%Y %H:%M:%S";

// =============================================================================
// Result
// =============================================================================

/// What the admin UI receives for an action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AdminResult {
    /// `1` on success, `0` on failure.
    pub status: u8,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub msg: Option<String>,
}

impl AdminResult {
    /// Success stamped with the current local time.
    pub fn success() -> Self {
        AdminResult {
            status: 1,
            timestamp: Some(Local::now().format(TIMESTAMP_FORMAT).to_string()),
            msg: None,
        }
    }

    pub fn failure(msg: impl Into<String>) -> Self {
        AdminResult {
            status: 0,
            timestamp: None,
            msg: Some(msg.into()),
        }
    }

    pub fn is_success(&self) -> bool {
        self.status == 1
    }
}

impl<T> From<SyncResult<T>> for AdminResult {
    fn from(result: SyncResult<T>) -> Self {
        match result {
            Ok(_) => AdminResult::success(),
            Err(e) => AdminResult::failure(e.to_string()),
        }
    }
}

// =============================================================================
// Runs
// =============================================================================

/// Runs a sync by its admin name.
pub async fn dispatch(engine: &SyncEngine, sync_name: &str) -> AdminResult {
    let Some(kind) = SyncKind::from_sync_name(sync_name) else {
        warn!(sync = sync_name, "Unknown admin sync");
        return AdminResult::failure(format!("Unknown method {}", sync_name));
    };

    info!(sync = %kind, "Admin sync requested");
    AdminResult::from(engine.run(kind).await)
}

/// Syncs the selected customers.
pub async fn sync_customers(engine: &SyncEngine, user_ids: &[i64]) -> AdminResult {
    if let Err(e) = validate_ids("user_id", user_ids) {
        return AdminResult::failure(e.to_string());
    }
    bulk_result("customers", engine.sync_customers(user_ids).await)
}

/// Syncs the selected orders.
pub async fn sync_orders(engine: &SyncEngine, order_ids: &[i64]) -> AdminResult {
    if let Err(e) = validate_ids("order_id", order_ids) {
        return AdminResult::failure(e.to_string());
    }
    bulk_result("orders", engine.sync_orders(order_ids).await)
}

fn validate_ids(field: &str, ids: &[i64]) -> SyncResult<()> {
    if ids.is_empty() {
        return Err(SyncError::Validation(format!("{} list is empty", field)));
    }
    for &id in ids {
        validate_entity_id(field, id)?;
    }
    Ok(())
}

fn bulk_result(what: &str, result: SyncResult<BulkSummary>) -> AdminResult {
    match result {
        Ok(summary) if summary.failed == 0 => AdminResult::success(),
        Ok(summary) => AdminResult::failure(format!(
            "{} of {} {} failed to sync",
            summary.failed,
            summary.failed + summary.succeeded,
            what
        )),
        Err(e) => AdminResult::failure(e.to_string()),
    }
}

/// Records a transport failure seen by the admin UI and reports it.
///
/// The request log row points at the service root with method GET and
/// status 0, like any other failed call.
pub async fn report_admin_error(engine: &SyncEngine, sync_name: &str, message: &str) -> SyncResult<()> {
    let config = engine.config();
    error!(sync = sync_name, message, "Admin request failed");

    engine
        .database()
        .request_log()
        .record(NewRequestLog {
            tenant_id: config.tenant_id().to_string(),
            sync_name: sync_name.to_string(),
            url: engine.erp().resource_url(""),
            request_method: ErpMethod::Get.as_str().to_string(),
            json_request: String::new(),
            json_response: format!("AJAX ERROR {}", message),
            status_code: 0,
            ok: false,
        })
        .await?;

    let report = ErrorReport::admin(sync_name, config.recipient_for(sync_name), message);
    engine.notifier().notify(&report);
    Ok(())
}

// =============================================================================
// Price List Assignment
// =============================================================================

/// One shopper → price list assignment from the admin UI.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PriceListAssignment {
    pub user_id: i64,
    /// A known list code, or `no-selected` for standard pricing.
    pub price_list_code: String,
}

/// Lists that can be assigned.
pub async fn list_price_lists(engine: &SyncEngine) -> SyncResult<Vec<PriceListSummary>> {
    Ok(engine
        .database()
        .price_lists()
        .list_summaries(engine.config().tenant_id())
        .await?)
}

/// Stores price list preferences. Every assignment is checked before any
/// is written.
pub async fn assign_price_lists(
    engine: &SyncEngine,
    assignments: &[PriceListAssignment],
) -> SyncResult<usize> {
    let known: Vec<String> = list_price_lists(engine)
        .await?
        .into_iter()
        .map(|summary| summary.code)
        .collect();
    let store = engine.storefront();

    for assignment in assignments {
        validate_entity_id("user_id", assignment.user_id)?;
        validate_price_list_code(&assignment.price_list_code)?;

        let code = assignment.price_list_code.trim();
        if code != NO_PRICE_LIST_SENTINEL && !known.iter().any(|k| k == code) {
            return Err(SyncError::Validation(format!("Unknown price list {}", code)));
        }
        if store.user_profile(assignment.user_id).await?.is_none() {
            return Err(SyncError::not_found("User", assignment.user_id));
        }
    }

    for assignment in assignments {
        store
            .set_user_meta(
                assignment.user_id,
                PRICE_LIST_META_KEY,
                assignment.price_list_code.trim(),
            )
            .await?;
    }

    info!(count = assignments.len(), "Price lists assigned");
    Ok(assignments.len())
}

// =============================================================================
// Status
// =============================================================================

/// Last run of one sync, `None` until it first succeeds.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SyncStatus {
    pub sync_name: &'static str,
    pub last_run_at: Option<DateTime<Utc>>,
}

/// Last-run timestamps of every sync, in admin order.
pub async fn status(engine: &SyncEngine) -> SyncResult<Vec<SyncStatus>> {
    let runs = engine.last_runs().await?;

    Ok(SyncKind::ALL
        .iter()
        .map(|kind| SyncStatus {
            sync_name: kind.sync_name(),
            last_run_at: runs
                .iter()
                .find(|run| run.sync_key == kind.timestamp_key())
                .map(|run| run.last_run_at),
        })
        .collect())
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::engine::testing::{harness, ok, status as respond, ScriptedErp};
    use ledgerlink_core::pricing::PriceListEntry;
    use ledgerlink_core::Money;
    use ledgerlink_db::NewUser;

    #[tokio::test]
    async fn test_unknown_method() {
        let h = harness(ScriptedErp::new()).await;
        let result = dispatch(&h.engine, "sync_everything").await;
        assert_eq!(result, AdminResult::failure("Unknown method sync_everything"));

        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json, serde_json::json!({"status": 0, "msg": "Unknown method sync_everything"}));
    }

    #[tokio::test]
    async fn test_dispatch_success_has_timestamp() {
        let erp = ScriptedErp::new().on(
            ErpMethod::Get,
            "LOGPART?$filter=ROYY_ISUDATE eq 'Y'",
            ok(r#"{"value":[]}"#),
        );
        let h = harness(erp).await;

        let result = dispatch(&h.engine, "sync_items_priority").await;
        assert!(result.is_success());
        let stamp = result.timestamp.unwrap();
        assert!(chrono::NaiveDateTime::parse_from_str(&stamp, TIMESTAMP_FORMAT).is_ok());
        assert!(result.msg.is_none());
    }

    #[tokio::test]
    async fn test_dispatch_failure_has_message() {
        let erp = ScriptedErp::new().on(
            ErpMethod::Get,
            "LOGPART?$expand=LOGCOUNTERS_SUBFORM",
            respond(500, "boom"),
        );
        let h = harness(erp).await;

        let result = dispatch(&h.engine, "sync_inventory_priority").await;
        assert_eq!(result.status, 0);
        assert!(result.msg.unwrap().contains("status 500"));
    }

    #[tokio::test]
    async fn test_bulk_rejects_bad_ids() {
        let h = harness(ScriptedErp::new()).await;
        assert_eq!(sync_orders(&h.engine, &[]).await.status, 0);
        assert_eq!(sync_customers(&h.engine, &[3, -1]).await.status, 0);
        assert!(h.erp.calls().is_empty());
    }

    #[tokio::test]
    async fn test_admin_error_is_logged_and_reported() {
        let h = harness(ScriptedErp::new()).await;

        report_admin_error(&h.engine, "sync_items_web", "timeout").await.unwrap();

        let log = h.db.request_log().recent(h.engine.config().tenant_id(), 5).await.unwrap();
        assert_eq!(log.len(), 1);
        assert_eq!(log[0].url, "https://erp.example.com/odata/Priority/tabula.ini/demo/");
        assert_eq!(log[0].request_method, "GET");
        assert_eq!(log[0].json_response, "AJAX ERROR timeout");
        assert_eq!(log[0].status_code, 0);

        let reports = h.notifier.reports();
        assert_eq!(reports[0].subject, "Error Sync Items Web");
        assert_eq!(reports[0].body, "AJAX ERROR<br>timeout");
        assert_eq!(reports[0].recipient, "admin@example.com");
    }

    #[tokio::test]
    async fn test_assign_price_lists() {
        let h = harness(ScriptedErp::new()).await;
        let tenant = h.engine.config().tenant_id().to_string();
        h.db.users()
            .insert(&NewUser {
                id: Some(5),
                email: "vip@example.com".into(),
                ..Default::default()
            })
            .await
            .unwrap();
        h.db.price_lists()
            .replace_all(
                &tenant,
                &[PriceListEntry {
                    product_sku: "A1".into(),
                    price_list_code: "VIP".into(),
                    price_list_name: "VIP customers".into(),
                    currency: "$".into(),
                    price: Money::from_cents(900),
                    tenant_id: tenant.clone(),
                }],
            )
            .await
            .unwrap();

        let lists = list_price_lists(&h.engine).await.unwrap();
        assert_eq!(lists.len(), 1);
        assert_eq!(lists[0].code, "VIP");

        let assign = |code: &str| PriceListAssignment {
            user_id: 5,
            price_list_code: code.into(),
        };

        assert_eq!(assign_price_lists(&h.engine, &[assign("VIP")]).await.unwrap(), 1);
        let stored = h.db.users().get_meta(5, PRICE_LIST_META_KEY).await.unwrap();
        assert_eq!(stored.as_deref(), Some("VIP"));

        let err = assign_price_lists(&h.engine, &[assign("GOLD")]).await.unwrap_err();
        assert!(matches!(err, SyncError::Validation(_)));

        assign_price_lists(&h.engine, &[assign(NO_PRICE_LIST_SENTINEL)]).await.unwrap();
        let stored = h.db.users().get_meta(5, PRICE_LIST_META_KEY).await.unwrap();
        assert_eq!(stored.as_deref(), Some(NO_PRICE_LIST_SENTINEL));

        let missing = PriceListAssignment {
            user_id: 77,
            price_list_code: "VIP".into(),
        };
        assert!(matches!(
            assign_price_lists(&h.engine, &[missing]).await.unwrap_err(),
            SyncError::NotFound { .. }
        ));
    }

    #[tokio::test]
    async fn test_status_lists_every_sync() {
        let erp = ScriptedErp::new().on(
            ErpMethod::Get,
            "LOGPART?$expand=LOGCOUNTERS_SUBFORM",
            ok(r#"{"value":[]}"#),
        );
        let h = harness(erp).await;
        h.engine.sync_inventory().await.unwrap();

        let rows = status(&h.engine).await.unwrap();
        assert_eq!(rows.len(), SyncKind::ALL.len());
        for row in rows {
            assert_eq!(row.last_run_at.is_some(), row.sync_name == "sync_inventory_priority");
        }
    }
}
