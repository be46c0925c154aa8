//! # ledgerlink-core: Pure Mapping Logic
//!
//! This crate holds everything the sync engine decides without touching
//! the network or the database: how ERP rows decode, how storefront
//! entities become ERP payloads, how variation groups are rebuilt and how
//! a price list overrides storefront prices.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LedgerLink Data Flow                             │
//! │                                                                         │
//! │   ERP (OData)                                   Storefront              │
//! │       │  JSON feed                                  ▲  upserts          │
//! │       ▼                                             │                   │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │               ★ ledgerlink-core (THIS CRATE) ★                  │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────┐  ┌───────────┐  ┌───────────┐  ┌───────────┐  │   │
//! │  │   │    erp    │  │ variation │  │  payload  │  │  pricing  │  │   │
//! │  │   │ wire rows │  │  groups   │  │ outbound  │  │ selection │  │   │
//! │  │   └───────────┘  └───────────┘  └───────────┘  └───────────┘  │   │
//! │  │                                                                 │   │
//! │  │   NO I/O • NO DATABASE • NO NETWORK • PURE FUNCTIONS           │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ledgerlink-sync (engine) ──► ledgerlink-db (SQLite)                   │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Modules
//!
//! - [`types`] - Storefront domain types (products, users, orders)
//! - [`money`] - Money type with integer arithmetic
//! - [`erp`] - ERP feed rows as they arrive on the wire
//! - [`payload`] - Outbound ERP payloads (items, customers, orders, receipts)
//! - [`variation`] - Variation group reconstruction
//! - [`pricing`] - Price list selection and currency normalization
//! - [`countries`] - ISO country code → ERP country name table
//! - [`validation`] - Input checks for admin actions
//! - [`error`] - Domain error types

// =============================================================================
// Module Declarations
// =============================================================================

pub mod countries;
pub mod erp;
pub mod error;
pub mod money;
pub mod payload;
pub mod pricing;
pub mod types;
pub mod validation;
pub mod variation;

// =============================================================================
// Re-exports for Convenience
// =============================================================================

pub use error::{CoreError, CoreResult, ValidationError};
pub use money::Money;
pub use types::*;

// =============================================================================
// Crate-Level Constants
// =============================================================================

/// Default tenant ID (single-tenant runtime with multi-tenant schema).
pub const DEFAULT_TENANT_ID: &str = "00000000-0000-0000-0000-000000000001";

/// Price list code used when a registered shopper has no stored preference.
pub const BASE_PRICE_LIST_CODE: &str = "בסיס";

/// Stored preference meaning "no price list": standard pricing, full catalog.
pub const NO_PRICE_LIST_SENTINEL: &str = "no-selected";

/// Pseudo-SKU of the synthetic shipping line on every order.
pub const SHIPPING_LINE_SKU: &str = "000";

/// User meta key holding the ERP customer number.
pub const CUSTOMER_NUMBER_META_KEY: &str = "_priority_customer_number";

/// User meta key holding the shopper's assigned price list code.
pub const PRICE_LIST_META_KEY: &str = "_priority_price_list";

/// Order line meta key holding per-line spec overrides (JSON list).
pub const SPEC_OVERRIDES_META_KEY: &str = "_tmcartepo_data";

/// Spec name never turned into a product attribute.
pub const EXCLUDED_SPEC_NAME: &str = "Material";
