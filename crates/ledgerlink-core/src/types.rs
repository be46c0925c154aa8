//! # Domain Types
//!
//! Storefront-side domain types the sync engine reads and writes.
//!
//! ## Type Hierarchy
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                         Domain Types                                    │
//! │                                                                         │
//! │  ┌─────────────────┐   ┌─────────────────┐   ┌─────────────────┐       │
//! │  │ CatalogProduct  │   │   UserProfile   │   │      Order      │       │
//! │  │  ─────────────  │   │  ─────────────  │   │  ─────────────  │       │
//! │  │  id             │   │  id (0 = guest) │   │  id / number    │       │
//! │  │  sku (business) │   │  email, names   │   │  customer_id    │       │
//! │  │  kind           │   │  billing        │   │  lines          │       │
//! │  │  price, stock   │   │  roles          │   │  shipping, pay  │       │
//! │  └─────────────────┘   └─────────────────┘   └─────────────────┘       │
//! │                                                                         │
//! │  Write-side drafts: ItemUpsert, VariableProductDraft, VariationDraft   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Dual-Key Identity Pattern
//! Catalog entities have a storefront `id` (numeric, storefront-assigned)
//! and a business key `sku` shared with the ERP (`PARTNAME`).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::money::Money;

// =============================================================================
// Product Kind / Stock Status
// =============================================================================

/// Shape of a catalog product.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
#[serde(rename_all = "snake_case")]
pub enum ProductKind {
    /// Stand-alone product with its own price and stock.
    Simple,
    /// Parent carrying the merged attribute set of its variations.
    Variable,
    /// Child of a variable product, one attribute selection.
    Variation,
}

/// Storefront stock status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "lowercase"))]
pub enum StockStatus {
    #[serde(rename = "instock")]
    InStock,
    #[default]
    #[serde(rename = "outofstock")]
    OutOfStock,
}

impl StockStatus {
    /// `instock` when the quantity is positive.
    pub fn from_quantity(quantity: i64) -> Self {
        if quantity > 0 {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }

    /// `instock` when the ERP inventory flag is `Y`.
    pub fn from_inventory_flag(flag: Option<&str>) -> Self {
        if flag == Some("Y") {
            StockStatus::InStock
        } else {
            StockStatus::OutOfStock
        }
    }

    /// Storefront string form.
    pub fn as_str(&self) -> &'static str {
        match self {
            StockStatus::InStock => "instock",
            StockStatus::OutOfStock => "outofstock",
        }
    }
}

// =============================================================================
// Catalog
// =============================================================================

/// A product as the catalog store reports it.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogProduct {
    /// Storefront identifier.
    pub id: i64,

    /// Parent product (variations only).
    pub parent_id: Option<i64>,

    pub kind: ProductKind,

    /// Stock Keeping Unit - shared with the ERP as `PARTNAME`.
    pub sku: String,

    /// Display title.
    pub title: String,

    /// List price.
    pub regular_price: Money,

    /// Effective price.
    pub price: Money,

    /// Whether the storefront tracks stock for this product.
    pub manage_stock: bool,

    pub stock_quantity: Option<i64>,

    pub stock_status: StockStatus,

    /// Cross-sell product ids.
    #[serde(default)]
    pub cross_sell_ids: Vec<i64>,
}

/// Fields the item sync writes onto a simple product.
#[derive(Debug, Clone, PartialEq)]
pub struct ItemUpsert {
    pub sku: String,
    pub title: String,
    /// Written to both regular and effective price.
    pub price: Money,
    pub manage_stock: bool,
}

/// A named attribute with its ordered, distinct values.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProductAttribute {
    pub name: String,
    pub values: Vec<String>,
}

/// One attribute selection on a variation (`Color = Red`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeValue {
    pub name: String,
    pub value: String,
}

impl AttributeValue {
    pub fn new(name: impl Into<String>, value: impl Into<String>) -> Self {
        AttributeValue {
            name: name.into(),
            value: value.into(),
        }
    }
}

/// Variable parent as the variation sync writes it.
#[derive(Debug, Clone, PartialEq)]
pub struct VariableProductDraft {
    pub sku: String,
    pub title: String,
    pub attributes: Vec<ProductAttribute>,
    pub categories: Vec<String>,
    pub tags: Vec<String>,
    pub stock_status: StockStatus,
}

/// One variation under a variable parent.
#[derive(Debug, Clone, PartialEq)]
pub struct VariationDraft {
    pub sku: String,
    pub regular_price: Money,
    pub stock_status: StockStatus,
    pub attributes: Vec<AttributeValue>,
}

/// Stock values written by the inventory sync.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StockLevel {
    pub quantity: i64,
    pub status: StockStatus,
}

impl StockLevel {
    pub fn from_quantity(quantity: i64) -> Self {
        StockLevel {
            quantity,
            status: StockStatus::from_quantity(quantity),
        }
    }
}

// =============================================================================
// Users
// =============================================================================

/// Postal block shared by user billing data and order addresses.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Address {
    pub first_name: String,
    pub last_name: String,
    pub address_1: String,
    pub address_2: String,
    pub city: String,
    pub postcode: String,
    /// ISO 3166-1 alpha-2 code.
    pub country: String,
    pub phone: String,
}

impl Address {
    /// `first last` (single space, as the ERP receives it).
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// Storefront user as the customer sync reads it.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct UserProfile {
    /// Storefront user id; `0` is the guest.
    pub id: i64,

    pub email: String,

    /// Profile first name, absent when never set.
    pub first_name: Option<String>,

    /// Profile last name, absent when never set.
    pub last_name: Option<String>,

    /// Billing fields (only address/contact parts are used).
    #[serde(default)]
    pub billing: Address,

    #[serde(default)]
    pub roles: Vec<String>,
}

impl UserProfile {
    /// True for the guest user id.
    pub fn is_guest(&self) -> bool {
        self.id == 0
    }
}

// =============================================================================
// Orders
// =============================================================================

/// Storefront order status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[cfg_attr(feature = "sqlx", derive(sqlx::Type))]
#[cfg_attr(feature = "sqlx", sqlx(rename_all = "snake_case"))]
#[serde(rename_all = "snake_case")]
pub enum OrderStatus {
    #[default]
    Pending,
    Processing,
    OnHold,
    Completed,
    Cancelled,
    Refunded,
    Failed,
}

/// The shipping method chosen on an order.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ShippingMethod {
    /// Raw method id, e.g. `flat_rate:3`.
    pub method_id: String,
    /// Human label, used when no mapping exists.
    pub title: String,
}

/// One purchased line.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderLine {
    pub id: i64,

    /// SKU of the purchased product; `None` when the product no longer exists.
    pub sku: Option<String>,

    pub quantity: i64,

    /// Line total after discounts.
    pub total: Money,

    /// Line item meta (key → value), including spec overrides.
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

/// A storefront order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: i64,

    /// Customer-facing order number (`BOOKNUM`).
    pub number: String,

    /// Storefront user id; `0` for guest checkout.
    pub customer_id: i64,

    pub status: OrderStatus,

    pub created_at: DateTime<Utc>,

    pub billing: Address,

    pub shipping: Address,

    pub shipping_method: Option<ShippingMethod>,

    pub shipping_total: Money,

    /// Raw payment method id (e.g. `cod`, `creditguard`).
    pub payment_method: String,

    pub total: Money,

    pub lines: Vec<OrderLine>,

    /// Order meta (payment gateway fields live here).
    #[serde(default)]
    pub meta: BTreeMap<String, String>,
}

impl Order {
    /// True for guest checkout.
    pub fn is_guest(&self) -> bool {
        self.customer_id == 0
    }

    /// Order meta value, empty when absent.
    pub fn meta_value(&self, key: &str) -> &str {
        self.meta.get(key).map(String::as_str).unwrap_or("")
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
