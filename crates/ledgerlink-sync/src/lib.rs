//! # ledgerlink-sync: Storefront ↔ ERP Sync Engine
//!
//! This crate moves catalog, stock, price lists, customers, orders and
//! receipts between the storefront and a Priority ERP over OData.
//!
//! ## Architecture Overview
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        Sync Engine Architecture                         │
//! │                                                                         │
//! │  ┌──────────────────────────────────────────────────────────────────┐  │
//! │  │                    SyncEngine (shared via Arc)                   │  │
//! │  │                                                                  │  │
//! │  │  Built once by the daemon from BridgeConfig + Database           │  │
//! │  │  One run guard per SyncKind                                      │  │
//! │  └────────────────────────────┬─────────────────────────────────────┘  │
//! │                               │                                         │
//! │         ┌─────────────────────┼─────────────────────┐                  │
//! │         ▼                     ▼                     ▼                   │
//! │  ┌────────────────┐  ┌────────────────┐  ┌────────────────────────┐    │
//! │  │   ErpClient    │  │   Storefront   │  │      Notifier          │    │
//! │  │                │  │                │  │                        │    │
//! │  │ reqwest OData  │  │ CatalogStore   │  │ ErrorReport per failed │    │
//! │  │ GET/POST/PATCH │  │ UserStore      │  │ ERP call               │    │
//! │  │ status 0 on    │  │ OrderSource    │  │                        │    │
//! │  │ transport fail │  │ (SQLite mirror)│  │                        │    │
//! │  └────────────────┘  └────────────────┘  └────────────────────────┘    │
//! │                                                                         │
//! │  ERP → storefront:  items, variations, inventory, price lists           │
//! │  storefront → ERP:  item export, customers, orders, receipts            │
//! │                                                                         │
//! │  PriceResolver reads the synced price lists on every storefront lookup │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//! - [`admin`] - Admin actions and their `{status, timestamp | msg}` results
//! - [`client`] - ERP client trait and the reqwest implementation
//! - [`config`] - Bridge configuration (TOML + environment)
//! - [`engine`] - `SyncEngine` and the sync operations
//! - [`error`] - Sync error types
//! - [`kind`] - Sync kinds with their names and timestamp keys
//! - [`report`] - Error reports and notifiers
//! - [`resolver`] - Per-shopper price and visibility lookups
//! - [`schedule`] - Declarative schedule table
//! - [`sqlite`] - Storefront collaborators over the local database
//! - [`store`] - Storefront collaborator traits
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledgerlink_sync::{BridgeConfig, SyncEngine, SyncKind};
//! use ledgerlink_db::{Database, DbConfig};
//!
//! let config = BridgeConfig::load(None)?;
//! let db = Database::new(DbConfig::new(&config.database.path)).await?;
//! let engine = SyncEngine::from_config(config, db)?;
//!
//! let summary = engine.run(SyncKind::Items).await?;
//! println!("{:?}", summary);
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod admin;
pub mod client;
pub mod config;
pub mod engine;
pub mod error;
pub mod kind;
pub mod report;
pub mod resolver;
pub mod schedule;
pub mod sqlite;
pub mod store;

// =============================================================================
// Re-exports
// =============================================================================

pub use admin::{AdminResult, PriceListAssignment, SyncStatus};
pub use client::{ErpClient, ErpMethod, ErpResponse, HttpErpClient};
pub use config::BridgeConfig;
pub use engine::{AfterOrderReport, BulkSummary, CustomerOutcome, RunSummary, StepResult, SyncEngine};
pub use error::{SyncError, SyncResult};
pub use kind::SyncKind;
pub use report::{ErrorReport, LogNotifier, NoOpNotifier, Notifier};
pub use resolver::PriceResolver;
pub use schedule::{Schedule, ScheduleEntry, ScheduledSync};
pub use sqlite::SqliteStorefront;
pub use store::{CatalogStore, OrderSource, Storefront, UserStore};
