//! Variation sync: ERP rows sharing a master part become one variable
//! product with a variation per child.
//!
//! ```text
//! LOGPART rows ──► build_variation_groups ──► for each group (insertion order)
//!                                              ├── upsert_variable(parent)
//!                                              └── upsert_variation(child) × N
//!                                         then cross-sells by group title
//! ```

use ledgerlink_core::erp::ErpItem;
use ledgerlink_core::variation::{build_variation_groups, resolve_cross_sells, VariationGroup};
use serde::Serialize;
use tracing::{debug, info};

use super::SyncEngine;
use crate::error::SyncResult;
use crate::kind::SyncKind;

const RESOURCE: &str =
    "LOGPART?$filter=MPARTNAME ne '' and ROYY_ISUDATE eq 'Y'&$expand=PARTUNSPECS_SUBFORM";

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct VariationSyncSummary {
    pub parents: usize,
    pub variations: usize,
    /// Parents whose cross-sell list was written.
    pub cross_sells: usize,
}

impl SyncEngine {
    /// Rebuilds variable products and their variations from the ERP feed.
    pub async fn sync_variations(&self) -> SyncResult<VariationSyncSummary> {
        let kind = SyncKind::Variations;
        let _guard = self.try_guard(kind)?;
        info!("Starting variation sync");

        let items: Vec<ErpItem> = self.fetch(kind, RESOURCE, true).await?;
        let groups = build_variation_groups(&items);
        debug!(rows = items.len(), groups = groups.len(), "Variation groups built");

        let mut summary = VariationSyncSummary::default();
        let mut written: Vec<(&VariationGroup, i64)> = Vec::with_capacity(groups.len());

        for group in &groups {
            let parent_id = self.store.upsert_variable(&group.to_parent_draft()).await?;
            summary.parents += 1;

            for draft in group.variation_drafts() {
                let id = self.store.upsert_variation(parent_id, &draft).await?;
                debug!(parent_id, variation_id = id, sku = %draft.sku, "Variation written");
                summary.variations += 1;
            }

            written.push((group, parent_id));
        }

        for (product_id, cross_sell_ids) in resolve_cross_sells(&written) {
            self.store.set_cross_sells(product_id, &cross_sell_ids).await?;
            summary.cross_sells += 1;
        }

        self.record_run(kind).await?;

        info!(
            parents = summary.parents,
            variations = summary.variations,
            cross_sells = summary.cross_sells,
            "Variation sync complete"
        );
        Ok(summary)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::client::ErpMethod;
    use crate::engine::testing::{harness, ok, ScriptedErp};
    use ledgerlink_core::{Money, ProductKind, StockStatus};

    #[tokio::test]
    async fn test_group_becomes_parent_with_variations() {
        let feed = r#"{"value":[
            {"PARTNAME":"TS-R","PARTDES":"Tee red","BASEPLPRICE":49.9,"INVFLAG":"Y",
             "MPARTNAME":"TS","MPARTDES":"Tee","ROYY_ISUDATE":"Y",
             "PARTUNSPECS_SUBFORM":[{"SPECNAME":"Color","VALUE":"Red"},{"SPECNAME":"Material","VALUE":"Cotton"}]},
            {"PARTNAME":"TS-B","PARTDES":"Tee blue","BASEPLPRICE":52,"INVFLAG":"N",
             "MPARTNAME":"TS","MPARTDES":"Tee","ROYY_ISUDATE":"Y",
             "PARTUNSPECS_SUBFORM":[{"SPECNAME":"Color","VALUE":"Blue"}]}
        ]}"#;
        let h = harness(ScriptedErp::new().on(ErpMethod::Get, RESOURCE, ok(feed))).await;

        let summary = h.engine.sync_variations().await.unwrap();
        assert_eq!(summary.parents, 1);
        assert_eq!(summary.variations, 2);

        let parent = h.db.catalog().get_by_sku("TS").await.unwrap().unwrap();
        assert_eq!(parent.kind, ProductKind::Variable);
        assert_eq!(parent.title, "Tee Tee");

        let attributes = h.db.catalog().product_attributes(parent.id).await.unwrap();
        assert_eq!(attributes.len(), 1);
        assert_eq!(attributes[0].name, "Color");
        assert_eq!(attributes[0].values, vec!["Red".to_string(), "Blue".to_string()]);

        let variations = h.db.catalog().variations_of(parent.id).await.unwrap();
        assert_eq!(variations.len(), 2);
        let blue = variations.iter().find(|v| v.sku == "TS-B").unwrap();
        assert_eq!(blue.regular_price, Money::from_cents(5200));
        assert_eq!(blue.stock_status, StockStatus::OutOfStock);
        let red = variations.iter().find(|v| v.sku == "TS-R").unwrap();
        assert_eq!(red.stock_status, StockStatus::InStock);
    }

    #[tokio::test]
    async fn test_inactive_only_child_discards_group() {
        let feed = r#"{"value":[
            {"PARTNAME":"X-1","MPARTNAME":"X","MPARTDES":"X","ROYY_ISUDATE":"N",
             "PARTUNSPECS_SUBFORM":[{"SPECNAME":"Size","VALUE":"M"}]}
        ]}"#;
        let h = harness(ScriptedErp::new().on(ErpMethod::Get, RESOURCE, ok(feed))).await;

        let summary = h.engine.sync_variations().await.unwrap();
        assert_eq!(summary, VariationSyncSummary::default());
        assert_eq!(h.db.catalog().count().await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_cross_sells_by_group_title() {
        let feed = r#"{"value":[
            {"PARTNAME":"TS-R","MPARTNAME":"TS","MPARTDES":"Tee","ROYL_SPECDES1":"Cap",
             "PARTUNSPECS_SUBFORM":[{"SPECNAME":"Color","VALUE":"Red"}]},
            {"PARTNAME":"CP-R","MPARTNAME":"CP","MPARTDES":"Cap",
             "PARTUNSPECS_SUBFORM":[{"SPECNAME":"Color","VALUE":"Red"}]}
        ]}"#;
        let h = harness(ScriptedErp::new().on(ErpMethod::Get, RESOURCE, ok(feed))).await;

        let summary = h.engine.sync_variations().await.unwrap();
        assert_eq!(summary.cross_sells, 1);

        let tee = h.db.catalog().get_by_sku("TS").await.unwrap().unwrap();
        let cap = h.db.catalog().get_by_sku("CP").await.unwrap().unwrap();
        assert_eq!(tee.cross_sell_ids, vec![cap.id]);
        assert!(cap.cross_sell_ids.is_empty());
    }
}
