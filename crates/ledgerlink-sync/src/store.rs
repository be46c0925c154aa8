//! # Storefront Collaborators
//!
//! The engine reads and writes the storefront only through these traits.
//!
//! ```text
//! ┌────────────────┐   ┌────────────────┐   ┌────────────────┐
//! │  CatalogStore  │   │   UserStore    │   │  OrderSource   │
//! │                │   │                │   │                │
//! │ products, SKUs │   │ user meta,     │   │ order detail,  │
//! │ variations,    │   │ profiles,      │   │ ids by status  │
//! │ stock, x-sells │   │ customer ids   │   │                │
//! └───────┬────────┘   └───────┬────────┘   └───────┬────────┘
//!         └────────────────────┼────────────────────┘
//!                              ▼
//!                     Storefront (blanket)
//!                              │
//!                              ▼
//!                  SqliteStorefront (sqlite.rs)
//! ```

use async_trait::async_trait;
use ledgerlink_core::{
    CatalogProduct, ItemUpsert, Order, StockLevel, UserProfile, VariableProductDraft,
    VariationDraft,
};

use crate::error::SyncResult;

/// Product catalog access.
#[async_trait]
pub trait CatalogStore: Send + Sync {
    /// Product id for a SKU; empty SKUs never match.
    async fn product_id_by_sku(&self, sku: &str) -> SyncResult<Option<i64>>;

    async fn product(&self, id: i64) -> SyncResult<Option<CatalogProduct>>;

    /// Creates a simple product with zero stock, out of stock.
    async fn create_simple(&self, item: &ItemUpsert) -> SyncResult<i64>;

    /// Updates title, prices and manage-stock; stock is left alone.
    async fn update_simple(&self, id: i64, item: &ItemUpsert) -> SyncResult<()>;

    /// Creates or updates a variable parent by SKU.
    async fn upsert_variable(&self, draft: &VariableProductDraft) -> SyncResult<i64>;

    /// Creates or updates one variation under a parent by SKU.
    async fn upsert_variation(&self, parent_id: i64, draft: &VariationDraft) -> SyncResult<i64>;

    async fn set_stock(&self, id: i64, level: StockLevel) -> SyncResult<()>;

    async fn set_cross_sells(&self, id: i64, cross_sell_ids: &[i64]) -> SyncResult<()>;

    /// Every product without a parent.
    async fn top_level_products(&self) -> SyncResult<Vec<CatalogProduct>>;

    async fn variations_of(&self, parent_id: i64) -> SyncResult<Vec<CatalogProduct>>;

    /// SKUs of every variation.
    async fn variation_skus(&self) -> SyncResult<Vec<String>>;

    /// Product ids (any kind) whose SKU is in `skus`.
    async fn product_ids_for_skus(&self, skus: &[String]) -> SyncResult<Vec<i64>>;
}

/// User profile and meta access.
#[async_trait]
pub trait UserStore: Send + Sync {
    async fn user_meta(&self, user_id: i64, key: &str) -> SyncResult<Option<String>>;

    async fn set_user_meta(&self, user_id: i64, key: &str, value: &str) -> SyncResult<()>;

    /// Writes a meta value unless the key already exists; true when written.
    async fn add_user_meta_if_absent(&self, user_id: i64, key: &str, value: &str)
        -> SyncResult<bool>;

    async fn user_profile(&self, user_id: i64) -> SyncResult<Option<UserProfile>>;

    /// Ids of every user with the `customer` role.
    async fn customer_ids(&self) -> SyncResult<Vec<i64>>;
}

/// Order access.
#[async_trait]
pub trait OrderSource: Send + Sync {
    async fn order(&self, order_id: i64) -> SyncResult<Option<Order>>;

    async fn completed_order_ids(&self) -> SyncResult<Vec<i64>>;

    async fn processing_order_ids(&self) -> SyncResult<Vec<i64>>;
}

/// Everything the engine needs from the storefront.
pub trait Storefront: CatalogStore + UserStore + OrderSource {}

impl<T: CatalogStore + UserStore + OrderSource> Storefront for T {}
