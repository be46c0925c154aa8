//! # Repository Module
//!
//! Database repository implementations for the bridge.
//!
//! ## Repository Pattern
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │                    Repositories by Concern                              │
//! │                                                                         │
//! │  Bridge state                         Storefront mirror                 │
//! │  ────────────                         ─────────────────                 │
//! │  PriceListRepository                  CatalogRepository                 │
//! │  ├── replace_all (one transaction)    ├── find_id_by_sku                │
//! │  ├── entry / entries_for_list         ├── create/update simple          │
//! │  └── list_summaries                   ├── upsert variable / variation   │
//! │                                       └── set_stock / set_cross_sells   │
//! │  SyncStateRepository                                                    │
//! │  ├── record_run                       UserRepository                    │
//! │  └── last_run / all_runs              ├── meta get/set/add_if_absent    │
//! │                                       └── profile / ids_with_role       │
//! │  RequestLogRepository                                                   │
//! │  ├── record                           OrderRepository                   │
//! │  └── recent / cleanup_older_than      ├── insert / get                  │
//! │                                       └── ids_with_status               │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

pub mod catalog;
pub mod order;
pub mod price_list;
pub mod request_log;
pub mod sync_state;
pub mod user;

/// Decodes a JSON text column, naming the column on failure.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    column: &str,
    raw: &str,
) -> crate::error::DbResult<T> {
    serde_json::from_str(raw).map_err(|e| crate::error::DbError::invalid_column(column, e))
}

/// Encodes a value for a JSON text column.
pub(crate) fn encode_json<T: serde::Serialize>(
    column: &str,
    value: &T,
) -> crate::error::DbResult<String> {
    serde_json::to_string(value).map_err(|e| crate::error::DbError::invalid_column(column, e))
}
