//! # SQLite Storefront
//!
//! The storefront mirror in `ledgerlink-db` behind the collaborator traits,
//! so the daemon runs without a live shop.

use async_trait::async_trait;
use ledgerlink_core::{
    CatalogProduct, ItemUpsert, Order, OrderStatus, StockLevel, UserProfile, VariableProductDraft,
    VariationDraft,
};
use ledgerlink_db::Database;

use crate::error::SyncResult;
use crate::store::{CatalogStore, OrderSource, UserStore};

/// Role that marks a storefront customer.
pub const CUSTOMER_ROLE: &str = "customer";

/// [`Storefront`](crate::store::Storefront) over the local database.
#[derive(Debug, Clone)]
pub struct SqliteStorefront {
    db: Database,
}

impl SqliteStorefront {
    pub fn new(db: Database) -> Self {
        SqliteStorefront { db }
    }
}

#[async_trait]
impl CatalogStore for SqliteStorefront {
    async fn product_id_by_sku(&self, sku: &str) -> SyncResult<Option<i64>> {
        Ok(self.db.catalog().find_id_by_sku(sku).await?)
    }

    async fn product(&self, id: i64) -> SyncResult<Option<CatalogProduct>> {
        Ok(self.db.catalog().get(id).await?)
    }

    async fn create_simple(&self, item: &ItemUpsert) -> SyncResult<i64> {
        Ok(self.db.catalog().create_simple(item).await?)
    }

    async fn update_simple(&self, id: i64, item: &ItemUpsert) -> SyncResult<()> {
        Ok(self.db.catalog().update_simple(id, item).await?)
    }

    async fn upsert_variable(&self, draft: &VariableProductDraft) -> SyncResult<i64> {
        Ok(self.db.catalog().upsert_variable(draft).await?)
    }

    async fn upsert_variation(&self, parent_id: i64, draft: &VariationDraft) -> SyncResult<i64> {
        Ok(self.db.catalog().upsert_variation(parent_id, draft).await?)
    }

    async fn set_stock(&self, id: i64, level: StockLevel) -> SyncResult<()> {
        Ok(self.db.catalog().set_stock(id, level).await?)
    }

    async fn set_cross_sells(&self, id: i64, cross_sell_ids: &[i64]) -> SyncResult<()> {
        Ok(self.db.catalog().set_cross_sells(id, cross_sell_ids).await?)
    }

    async fn top_level_products(&self) -> SyncResult<Vec<CatalogProduct>> {
        Ok(self.db.catalog().list_top_level().await?)
    }

    async fn variations_of(&self, parent_id: i64) -> SyncResult<Vec<CatalogProduct>> {
        Ok(self.db.catalog().variations_of(parent_id).await?)
    }

    async fn variation_skus(&self) -> SyncResult<Vec<String>> {
        Ok(self.db.catalog().variation_skus().await?)
    }

    async fn product_ids_for_skus(&self, skus: &[String]) -> SyncResult<Vec<i64>> {
        Ok(self.db.catalog().ids_for_skus(skus).await?)
    }
}

#[async_trait]
impl UserStore for SqliteStorefront {
    async fn user_meta(&self, user_id: i64, key: &str) -> SyncResult<Option<String>> {
        Ok(self.db.users().get_meta(user_id, key).await?)
    }

    async fn set_user_meta(&self, user_id: i64, key: &str, value: &str) -> SyncResult<()> {
        Ok(self.db.users().set_meta(user_id, key, value).await?)
    }

    async fn add_user_meta_if_absent(
        &self,
        user_id: i64,
        key: &str,
        value: &str,
    ) -> SyncResult<bool> {
        Ok(self.db.users().add_meta_if_absent(user_id, key, value).await?)
    }

    async fn user_profile(&self, user_id: i64) -> SyncResult<Option<UserProfile>> {
        Ok(self.db.users().profile(user_id).await?)
    }

    async fn customer_ids(&self) -> SyncResult<Vec<i64>> {
        Ok(self.db.users().ids_with_role(CUSTOMER_ROLE).await?)
    }
}

#[async_trait]
impl OrderSource for SqliteStorefront {
    async fn order(&self, order_id: i64) -> SyncResult<Option<Order>> {
        Ok(self.db.orders().get(order_id).await?)
    }

    async fn completed_order_ids(&self) -> SyncResult<Vec<i64>> {
        Ok(self.db.orders().ids_with_status(OrderStatus::Completed).await?)
    }

    async fn processing_order_ids(&self) -> SyncResult<Vec<i64>> {
        Ok(self.db.orders().ids_with_status(OrderStatus::Processing).await?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ledgerlink_core::Money;
    use ledgerlink_db::{DbConfig, NewUser};

    #[tokio::test]
    async fn test_catalog_through_trait() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = SqliteStorefront::new(db);

        let id = store
            .create_simple(&ItemUpsert {
                sku: "A1".into(),
                title: "Widget".into(),
                price: Money::from_cents(999),
                manage_stock: false,
            })
            .await
            .unwrap();

        assert_eq!(store.product_id_by_sku("A1").await.unwrap(), Some(id));
        assert_eq!(store.product_id_by_sku("").await.unwrap(), None);
        assert_eq!(store.top_level_products().await.unwrap().len(), 1);
        assert_eq!(
            store.product_ids_for_skus(&["A1".into(), "B2".into()]).await.unwrap(),
            vec![id]
        );
    }

    #[tokio::test]
    async fn test_customer_ids_use_role() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let customer = db
            .users()
            .insert(&NewUser {
                email: "c@example.com".into(),
                roles: vec![CUSTOMER_ROLE.into()],
                ..Default::default()
            })
            .await
            .unwrap();
        db.users()
            .insert(&NewUser {
                email: "shop@example.com".into(),
                roles: vec!["shop_manager".into()],
                ..Default::default()
            })
            .await
            .unwrap();

        let store = SqliteStorefront::new(db);
        assert_eq!(store.customer_ids().await.unwrap(), vec![customer]);
        assert!(store
            .add_user_meta_if_absent(customer, "k", "v")
            .await
            .unwrap());
        assert_eq!(store.user_meta(customer, "k").await.unwrap().as_deref(), Some("v"));
    }
}
