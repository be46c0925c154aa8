//! # Storefront Price Resolver
//!
//! Answers the per-shopper questions the storefront asks on every page:
//! which products are visible, what they cost and in which currency.
//!
//! ```text
//! shopper ──► selection ──┬── Unrestricted ──► own prices, full catalog
//!                         └── Assigned(code) ─► price_list_entries(code)
//!                                               ├── catalog filter
//!                                               ├── price override
//!                                               ├── price range
//!                                               └── currency
//! ```
//!
//! A missing or unreadable price list table reads as an empty list.

use ledgerlink_core::pricing::{
    normalize_currency, override_price, CatalogFilter, PriceListEntry, PriceListSelection,
    PriceRange,
};
use ledgerlink_core::{Money, ProductKind, PRICE_LIST_META_KEY};
use ledgerlink_db::Database;
use std::sync::Arc;
use tracing::warn;

use crate::engine::SyncEngine;
use crate::error::{SyncError, SyncResult};
use crate::store::Storefront;

/// Anonymous shoppers are user id 0.
pub const ANONYMOUS: i64 = 0;

/// Per-shopper price and visibility lookups.
#[derive(Clone)]
pub struct PriceResolver {
    db: Database,
    store: Arc<dyn Storefront>,
    tenant_id: String,
    default_currency: String,
}

impl PriceResolver {
    pub fn new(
        db: Database,
        store: Arc<dyn Storefront>,
        tenant_id: impl Into<String>,
        default_currency: impl Into<String>,
    ) -> Self {
        PriceResolver {
            db,
            store,
            tenant_id: tenant_id.into(),
            default_currency: default_currency.into(),
        }
    }

    /// Resolver sharing the engine's database, storefront and settings.
    pub fn for_engine(engine: &SyncEngine) -> Self {
        let config = engine.config();
        Self::new(
            engine.database().clone(),
            engine.storefront(),
            config.tenant_id(),
            config.store.default_currency.clone(),
        )
    }

    /// Price list selection of a shopper.
    pub async fn selection(&self, user_id: i64) -> SyncResult<PriceListSelection> {
        if user_id == ANONYMOUS {
            return Ok(PriceListSelection::Unrestricted);
        }
        let stored = self.store.user_meta(user_id, PRICE_LIST_META_KEY).await?;
        Ok(PriceListSelection::from_preference(stored.as_deref()))
    }

    /// Product ids the shopper may see.
    pub async fn catalog_filter(&self, user_id: i64) -> SyncResult<CatalogFilter> {
        let Some(code) = self.selection(user_id).await?.code().map(str::to_string) else {
            return Ok(CatalogFilter::Unfiltered);
        };

        let skus = self
            .db
            .price_lists()
            .skus_for_list(&self.tenant_id, &code)
            .await
            .unwrap_or_else(|e| {
                warn!(code = %code, error = %e, "Price list unreadable, treating as empty");
                Vec::new()
            });
        if skus.is_empty() {
            return Ok(CatalogFilter::NoProducts);
        }

        let ids = self.store.product_ids_for_skus(&skus).await?;
        Ok(CatalogFilter::from_ids(ids))
    }

    /// Price of one SKU for the shopper, given the product's own price.
    pub async fn price(&self, user_id: i64, sku: &str, own_price: Money) -> SyncResult<Money> {
        let selection = self.selection(user_id).await?;
        let entry = self.entry(&selection, sku).await;
        Ok(override_price(own_price, entry.as_ref()))
    }

    /// `min - max` display of a product.
    ///
    /// Variable products span the listed prices of their variations; with no
    /// listed variation (or an unrestricted shopper) the product's own
    /// prices are shown.
    pub async fn price_range(&self, user_id: i64, product_id: i64) -> SyncResult<String> {
        let product = self
            .store
            .product(product_id)
            .await?
            .ok_or_else(|| SyncError::not_found("Product", product_id))?;

        if product.kind != ProductKind::Variable {
            let price = self.price(user_id, &product.sku, product.price).await?;
            return Ok(price.to_string());
        }

        let variations = self.store.variations_of(product_id).await?;
        let selection = self.selection(user_id).await?;

        if selection.code().is_some() {
            let mut listed = Vec::with_capacity(variations.len());
            for variation in &variations {
                if let Some(entry) = self.entry(&selection, &variation.sku).await {
                    listed.push(entry.price);
                }
            }
            if let Some(range) = PriceRange::from_prices(listed) {
                return Ok(range.to_string());
            }
        }

        Ok(own_display(product.price, variations.iter().map(|v| v.price)))
    }

    /// Storefront currency for the shopper.
    pub async fn currency(&self, user_id: i64) -> SyncResult<String> {
        let Some(code) = self.selection(user_id).await?.code().map(str::to_string) else {
            return Ok(self.default_currency.clone());
        };

        let currency = self
            .db
            .price_lists()
            .currency_for_list(&self.tenant_id, &code)
            .await
            .unwrap_or_else(|e| {
                warn!(code = %code, error = %e, "Price list unreadable, treating as empty");
                None
            });

        Ok(match currency {
            Some(currency) if !currency.is_empty() => normalize_currency(&currency),
            _ => self.default_currency.clone(),
        })
    }

    /// Whether a variation SKU is offered to the shopper.
    pub async fn variation_visible(&self, user_id: i64, sku: &str) -> SyncResult<bool> {
        let selection = self.selection(user_id).await?;
        if selection.code().is_none() {
            return Ok(true);
        }
        Ok(self.entry(&selection, sku).await.is_some())
    }

    async fn entry(&self, selection: &PriceListSelection, sku: &str) -> Option<PriceListEntry> {
        let code = selection.code()?;
        self.db
            .price_lists()
            .entry(&self.tenant_id, code, sku)
            .await
            .unwrap_or_else(|e| {
                warn!(code, sku, error = %e, "Price list unreadable, treating as empty");
                None
            })
    }
}

fn own_display(own: Money, variation_prices: impl Iterator<Item = Money>) -> String {
    match PriceRange::from_prices(variation_prices) {
        Some(range) if range.min == range.max => range.min.to_string(),
        Some(range) => range.to_string(),
        None => own.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sqlite::SqliteStorefront;
    use ledgerlink_core::{
        AttributeValue, ItemUpsert, StockStatus, VariableProductDraft, VariationDraft,
        BASE_PRICE_LIST_CODE, DEFAULT_TENANT_ID, NO_PRICE_LIST_SENTINEL,
    };
    use ledgerlink_db::{DbConfig, NewUser};
    use std::collections::BTreeMap;

    struct Fixture {
        resolver: PriceResolver,
        db: Database,
    }

    async fn fixture() -> Fixture {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        let store = Arc::new(SqliteStorefront::new(db.clone()));
        Fixture {
            resolver: PriceResolver::new(db.clone(), store, DEFAULT_TENANT_ID, "ILS"),
            db,
        }
    }

    fn entry(code: &str, sku: &str, cents: i64, currency: &str) -> PriceListEntry {
        PriceListEntry {
            product_sku: sku.into(),
            price_list_code: code.into(),
            price_list_name: code.into(),
            currency: currency.into(),
            price: Money::from_cents(cents),
            tenant_id: DEFAULT_TENANT_ID.into(),
        }
    }

    async fn user(f: &Fixture, id: i64, preference: Option<&str>) {
        let mut meta = BTreeMap::new();
        if let Some(code) = preference {
            meta.insert(PRICE_LIST_META_KEY.to_string(), code.to_string());
        }
        f.db.users()
            .insert(&NewUser {
                id: Some(id),
                email: format!("u{id}@example.com"),
                meta,
                ..Default::default()
            })
            .await
            .unwrap();
    }

    async fn simple(f: &Fixture, sku: &str, cents: i64) -> i64 {
        f.db.catalog()
            .create_simple(&ItemUpsert {
                sku: sku.into(),
                title: sku.into(),
                price: Money::from_cents(cents),
                manage_stock: false,
            })
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_base_list_applies_without_preference() {
        let f = fixture().await;
        user(&f, 1, None).await;
        f.db.price_lists()
            .replace_all(DEFAULT_TENANT_ID, &[entry(BASE_PRICE_LIST_CODE, "X", 10000, "ש\"ח")])
            .await
            .unwrap();

        let price = f.resolver.price(1, "X", Money::from_cents(12000)).await.unwrap();
        assert_eq!(price, Money::from_cents(10000));
        assert_eq!(f.resolver.currency(1).await.unwrap(), "ILS");
    }

    #[tokio::test]
    async fn test_no_selected_is_unrestricted() {
        let f = fixture().await;
        user(&f, 2, Some(NO_PRICE_LIST_SENTINEL)).await;
        f.db.price_lists()
            .replace_all(DEFAULT_TENANT_ID, &[entry(BASE_PRICE_LIST_CODE, "X", 10000, "$")])
            .await
            .unwrap();

        let own = Money::from_cents(12000);
        assert_eq!(f.resolver.price(2, "X", own).await.unwrap(), own);
        assert_eq!(f.resolver.catalog_filter(2).await.unwrap(), CatalogFilter::Unfiltered);
        assert_eq!(f.resolver.currency(2).await.unwrap(), "ILS");
        assert!(f.resolver.variation_visible(2, "NOT-LISTED").await.unwrap());
    }

    #[tokio::test]
    async fn test_anonymous_is_unrestricted() {
        let f = fixture().await;
        assert_eq!(
            f.resolver.selection(ANONYMOUS).await.unwrap(),
            PriceListSelection::Unrestricted
        );
        assert_eq!(f.resolver.catalog_filter(ANONYMOUS).await.unwrap(), CatalogFilter::Unfiltered);
    }

    #[tokio::test]
    async fn test_catalog_filter_by_list() {
        let f = fixture().await;
        user(&f, 3, Some("VIP")).await;
        user(&f, 4, Some("EMPTY")).await;
        let a = simple(&f, "A", 100).await;
        simple(&f, "B", 200).await;
        f.db.price_lists()
            .replace_all(
                DEFAULT_TENANT_ID,
                &[entry("VIP", "A", 90, "$"), entry("VIP", "GONE", 50, "$")],
            )
            .await
            .unwrap();

        assert_eq!(f.resolver.catalog_filter(3).await.unwrap(), CatalogFilter::Only(vec![a]));
        assert_eq!(f.resolver.catalog_filter(4).await.unwrap(), CatalogFilter::NoProducts);
        assert_eq!(f.resolver.currency(3).await.unwrap(), "USD");
        // Unknown list: default currency
        assert_eq!(f.resolver.currency(4).await.unwrap(), "ILS");
    }

    #[tokio::test]
    async fn test_price_range_over_listed_variations() {
        let f = fixture().await;
        user(&f, 5, Some("VIP")).await;
        user(&f, 6, Some("OTHER")).await;

        let parent = f
            .db
            .catalog()
            .upsert_variable(&VariableProductDraft {
                sku: "TS".into(),
                title: "Tee".into(),
                attributes: vec![],
                categories: vec![],
                tags: vec![],
                stock_status: StockStatus::InStock,
            })
            .await
            .unwrap();
        for (sku, cents, value) in [("TS-R", 5000, "Red"), ("TS-B", 5500, "Blue"), ("TS-G", 6000, "Green")] {
            f.db.catalog()
                .upsert_variation(
                    parent,
                    &VariationDraft {
                        sku: sku.into(),
                        regular_price: Money::from_cents(cents),
                        stock_status: StockStatus::InStock,
                        attributes: vec![AttributeValue {
                            name: "Color".into(),
                            value: value.into(),
                        }],
                    },
                )
                .await
                .unwrap();
        }
        f.db.price_lists()
            .replace_all(
                DEFAULT_TENANT_ID,
                &[entry("VIP", "TS-R", 4000, "$"), entry("VIP", "TS-B", 4500, "$")],
            )
            .await
            .unwrap();

        assert_eq!(f.resolver.price_range(5, parent).await.unwrap(), "40.00 - 45.00");
        // Nothing listed: own variation prices
        assert_eq!(f.resolver.price_range(6, parent).await.unwrap(), "50.00 - 60.00");
        assert_eq!(f.resolver.price_range(ANONYMOUS, parent).await.unwrap(), "50.00 - 60.00");

        assert!(f.resolver.variation_visible(5, "TS-R").await.unwrap());
        assert!(!f.resolver.variation_visible(5, "TS-G").await.unwrap());

        let err = f.resolver.price_range(5, 9999).await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound { .. }));
    }
}
