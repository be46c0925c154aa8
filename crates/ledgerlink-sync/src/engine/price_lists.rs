//! Price list sync: the ERP's price lists replace the local table wholesale.

use ledgerlink_core::erp::ErpPriceList;
use ledgerlink_core::pricing::PriceListEntry;
use serde::Serialize;
use tracing::info;

use super::SyncEngine;
use crate::error::SyncResult;
use crate::kind::SyncKind;

const RESOURCE: &str = "PRICELIST?$expand=PLISTCUSTOMERS_SUBFORM,PARTPRICE2_SUBFORM";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct PriceListSyncSummary {
    pub lists: usize,
    /// Rows written after duplicate pairs collapsed.
    pub entries: u64,
}

impl SyncEngine {
    /// Replaces every price list entry of the tenant.
    ///
    /// The table is only touched once the feed decoded; a failed fetch keeps
    /// the previous rows.
    pub async fn sync_price_lists(&self) -> SyncResult<PriceListSyncSummary> {
        let kind = SyncKind::PriceLists;
        let _guard = self.try_guard(kind)?;
        info!("Starting price list sync");

        let lists: Vec<ErpPriceList> = self.fetch(kind, RESOURCE, true).await?;
        let tenant_id = self.config.tenant_id();

        let entries: Vec<PriceListEntry> = lists
            .iter()
            .flat_map(|list| list.entries(tenant_id))
            .collect();

        let written = self.db.price_lists().replace_all(tenant_id, &entries).await?;

        self.record_run(kind).await?;

        let summary = PriceListSyncSummary {
            lists: lists.len(),
            entries: written,
        };
        info!(lists = summary.lists, entries = summary.entries, "Price list sync complete");
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErpMethod;
    use crate::engine::testing::{harness, ok, status, ScriptedErp};
    use ledgerlink_core::Money;

    const FEED: &str = r#"{"value":[
        {"PLNAME":"VIP","PLDES":"VIP customers","CODE":"$",
         "PARTPRICE2_SUBFORM":[{"PARTNAME":"A1","PRICE":8.5},{"PARTNAME":"B2","PRICE":3}],
         "PLISTCUSTOMERS_SUBFORM":[]},
        {"PLNAME":"בסיס","PLDES":"Base","CODE":"ש\"ח",
         "PARTPRICE2_SUBFORM":[{"PARTNAME":"A1","PRICE":10}]}
    ]}"#;

    #[tokio::test]
    async fn test_feed_replaces_table() {
        let erp = ScriptedErp::new()
            .on(ErpMethod::Get, RESOURCE, ok(FEED))
            .on(ErpMethod::Get, RESOURCE, ok(r#"{"value":[{"PLNAME":"VIP","PARTPRICE2_SUBFORM":[]}]}"#));
        let h = harness(erp).await;
        let tenant = h.engine.config().tenant_id().to_string();

        let summary = h.engine.sync_price_lists().await.unwrap();
        assert_eq!(summary, PriceListSyncSummary { lists: 2, entries: 3 });
        assert_eq!(h.db.price_lists().count(&tenant).await.unwrap(), 3);

        let vip = h.db.price_lists().entry(&tenant, "VIP", "A1").await.unwrap().unwrap();
        assert_eq!(vip.price, Money::from_cents(850));
        assert_eq!(vip.currency, "$");
        assert_eq!(vip.price_list_name, "VIP customers");

        // Second feed has no prices: every row goes
        let summary = h.engine.sync_price_lists().await.unwrap();
        assert_eq!(summary.entries, 0);
        assert_eq!(h.db.price_lists().count(&tenant).await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_summary_counts_stored_rows() {
        let feed = r#"{"value":[
            {"PLNAME":"VIP","CODE":"$","PARTPRICE2_SUBFORM":[
                {"PARTNAME":"A1","PRICE":1},
                {"PARTNAME":"C3","PRICE":null},
                {"PARTNAME":"A1","PRICE":2}
            ]}
        ]}"#;
        let h = harness(ScriptedErp::new().on(ErpMethod::Get, RESOURCE, ok(feed))).await;
        let tenant = h.engine.config().tenant_id().to_string();

        let summary = h.engine.sync_price_lists().await.unwrap();
        assert_eq!(summary, PriceListSyncSummary { lists: 1, entries: 1 });
        assert_eq!(h.db.price_lists().count(&tenant).await.unwrap(), 1);

        let a1 = h.db.price_lists().entry(&tenant, "VIP", "A1").await.unwrap().unwrap();
        assert_eq!(a1.price, Money::from_cents(200));
        assert!(h.db.price_lists().entry(&tenant, "VIP", "C3").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_failed_fetch_keeps_rows() {
        let erp = ScriptedErp::new()
            .on(ErpMethod::Get, RESOURCE, ok(FEED))
            .on(ErpMethod::Get, RESOURCE, status(500, "boom"));
        let h = harness(erp).await;
        let tenant = h.engine.config().tenant_id().to_string();

        h.engine.sync_price_lists().await.unwrap();
        assert!(h.engine.sync_price_lists().await.is_err());
        assert_eq!(h.db.price_lists().count(&tenant).await.unwrap(), 3);
        assert_eq!(h.notifier.reports()[0].subject, "Error Sync Price Lists Priority");
    }
}
