//! # Sync Kinds
//!
//! The eight directional syncs and the names each one goes by.
//!
//! ```text
//! SyncKind::Items
//!   ├── key()            items_priority
//!   ├── sync_name()      sync_items_priority          (admin, notifications)
//!   ├── timestamp_key()  items_priority_update        (sync_runs)
//!   └── error_subject()  Error Sync Items Priority    (error reports)
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;

/// One directional sync operation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SyncKind {
    /// ERP → catalog, simple items.
    Items,
    /// ERP → catalog, variable items.
    Variations,
    /// ERP → catalog, stock levels.
    Inventory,
    /// Catalog → ERP, items.
    ItemExport,
    /// ERP → local price list table.
    PriceLists,
    /// Storefront → ERP, customers.
    Customers,
    /// Storefront → ERP, orders.
    Orders,
    /// Storefront → ERP, receipts.
    Receipts,
}

impl SyncKind {
    /// Every kind, in admin display order.
    pub const ALL: [SyncKind; 8] = [
        SyncKind::Items,
        SyncKind::Variations,
        SyncKind::Inventory,
        SyncKind::ItemExport,
        SyncKind::PriceLists,
        SyncKind::Customers,
        SyncKind::Orders,
        SyncKind::Receipts,
    ];

    /// Short key shared by the log flag and the timestamp.
    pub fn key(&self) -> &'static str {
        match self {
            SyncKind::Items => "items_priority",
            SyncKind::Variations => "items_priority_variation",
            SyncKind::Inventory => "inventory_priority",
            SyncKind::ItemExport => "items_web",
            SyncKind::PriceLists => "pricelist_priority",
            SyncKind::Customers => "customers_web",
            SyncKind::Orders => "orders_web",
            SyncKind::Receipts => "receipts_priority",
        }
    }

    /// Name used by admin actions and notification recipients.
    pub fn sync_name(&self) -> &'static str {
        match self {
            SyncKind::Items => "sync_items_priority",
            SyncKind::Variations => "sync_items_priority_variation",
            SyncKind::Inventory => "sync_inventory_priority",
            SyncKind::ItemExport => "sync_items_web",
            SyncKind::PriceLists => "sync_pricelist_priority",
            SyncKind::Customers => "sync_customers_web",
            SyncKind::Orders => "sync_orders_web",
            SyncKind::Receipts => "sync_receipts_priority",
        }
    }

    /// Key of the last-run timestamp.
    pub fn timestamp_key(&self) -> &'static str {
        match self {
            SyncKind::Items => "items_priority_update",
            SyncKind::Variations => "items_priority_variation_update",
            SyncKind::Inventory => "inventory_priority_update",
            SyncKind::ItemExport => "items_web_update",
            SyncKind::PriceLists => "pricelist_priority_update",
            SyncKind::Customers => "customers_web_update",
            SyncKind::Orders => "orders_web_update",
            SyncKind::Receipts => "receipts_priority_update",
        }
    }

    /// Subject line of the error report for a remote failure.
    pub fn error_subject(&self) -> &'static str {
        match self {
            SyncKind::Items => "Error Sync Items Priority",
            SyncKind::Variations => "Error Sync Items Priority Variation",
            SyncKind::Inventory => "Error Sync Inventory Priority",
            SyncKind::ItemExport => "Error Sync Items Web",
            SyncKind::PriceLists => "Error Sync Price Lists Priority",
            SyncKind::Customers => "Error Sync Customers",
            SyncKind::Orders => "Error Sync Orders",
            SyncKind::Receipts => "Error Sync Receipts",
        }
    }

    /// Looks a kind up by its admin name.
    pub fn from_sync_name(name: &str) -> Option<Self> {
        SyncKind::ALL.into_iter().find(|kind| kind.sync_name() == name)
    }

    pub(crate) fn index(&self) -> usize {
        *self as usize
    }
}

impl fmt::Display for SyncKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.sync_name())
    }
}
