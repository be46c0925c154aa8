//! # ledgerlink-db: Database Layer
//!
//! SQLite persistence for the bridge, using sqlx for async access.
//!
//! ## Architecture Position
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                        LedgerLink Data Flow                             │
//! │                                                                         │
//! │  Sync operation (price lists, customers, ...)                          │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ┌─────────────────────────────────────────────────────────────────┐   │
//! │  │                   ledgerlink-db (THIS CRATE)                    │   │
//! │  │                                                                 │   │
//! │  │   ┌───────────────┐    ┌───────────────────┐   ┌────────────┐  │   │
//! │  │   │   Database    │    │   Repositories    │   │ Migrations │  │   │
//! │  │   │   (pool.rs)   │    │                   │   │ (embedded) │  │   │
//! │  │   │               │    │ PriceListRepo     │   │            │  │   │
//! │  │   │ SqlitePool    │◄───│ SyncStateRepo     │   │ 001_init   │  │   │
//! │  │   │ WAL mode      │    │ RequestLogRepo    │   │            │  │   │
//! │  │   │               │    │ Catalog/User/Order│   │            │  │   │
//! │  │   └───────────────┘    └───────────────────┘   └────────────┘  │   │
//! │  └─────────────────────────────────────────────────────────────────┘   │
//! │       │                                                                 │
//! │       ▼                                                                 │
//! │  ~/.local/share/ledgerlink/ledgerlink.db                                │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Module Organization
//!
//! - [`pool`] - `DbConfig` and the `Database` handle with its repositories
//! - [`migrations`] - Schema migrations compiled in from `migrations/sqlite`
//! - [`error`] - `DbError` and `DbResult`
//! - [`repository`] - Repository implementations
//!
//! ## Usage
//!
//! ```rust,ignore
//! use ledgerlink_db::{Database, DbConfig};
//!
//! let db = Database::new(DbConfig::new("ledgerlink.db")).await?;
//! let lists = db.price_lists().list_summaries(DEFAULT_TENANT_ID).await?;
//! ```

// =============================================================================
// Module Declarations
// =============================================================================

pub mod error;
pub mod migrations;
pub mod pool;
pub mod repository;

// =============================================================================
// Re-exports
// =============================================================================

pub use error::{DbError, DbResult};
pub use pool::{Database, DbConfig};

pub use repository::catalog::CatalogRepository;
pub use repository::order::OrderRepository;
pub use repository::price_list::PriceListRepository;
pub use repository::request_log::{NewRequestLog, RequestLogEntry, RequestLogRepository};
pub use repository::sync_state::{SyncRun, SyncStateRepository};
pub use repository::user::{NewUser, UserRepository};
