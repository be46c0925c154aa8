//! # Bridge Database
//!
//! Opens the bridge's SQLite file and hands out repositories.
//!
//! ```text
//! [database] path ──► DbConfig ──► Database::new()
//!                                      │  WAL, busy timeout, foreign keys
//!                                      │  embedded migrations
//!                                      ▼
//!                                 SqlitePool (shared by every clone)
//!                                      │
//!          ┌────────────┬──────────────┼──────────────┬───────────┬─────────┐
//!          ▼            ▼              ▼              ▼           ▼         ▼
//!     price_lists   sync_state    request_log      catalog      users    orders
//!     (resolver)    (run stamps)  (ERP calls)      └──── storefront mirror ───┘
//! ```
//!
//! A price list replace holds a write transaction while storefront lookups
//! keep reading the previous snapshot; WAL is what makes that possible.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePoolOptions, SqliteSynchronous};
use sqlx::SqlitePool;
use std::path::PathBuf;
use std::time::Duration;
use tracing::info;

use crate::error::{DbError, DbResult};
use crate::migrations;
use crate::repository::catalog::CatalogRepository;
use crate::repository::order::OrderRepository;
use crate::repository::price_list::PriceListRepository;
use crate::repository::request_log::RequestLogRepository;
use crate::repository::sync_state::SyncStateRepository;
use crate::repository::user::UserRepository;

const IN_MEMORY: &str = ":memory:";

/// Where the bridge database lives and how many connections it gets.
#[derive(Debug, Clone)]
pub struct DbConfig {
    pub database_path: PathBuf,

    /// Scheduled syncs, admin calls and storefront lookups share this pool.
    pub max_connections: u32,

    /// How long a writer waits on a locked database before failing.
    pub busy_timeout: Duration,
}

impl DbConfig {
    /// File-backed database, created on first open.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        DbConfig {
            database_path: path.into(),
            max_connections: 5,
            busy_timeout: Duration::from_secs(10),
        }
    }

    /// Private in-memory database, for tests.
    ///
    /// Pinned to one connection: every new in-memory connection would see
    /// an empty database.
    pub fn in_memory() -> Self {
        DbConfig {
            database_path: PathBuf::from(IN_MEMORY),
            max_connections: 1,
            busy_timeout: Duration::from_secs(1),
        }
    }

    fn is_in_memory(&self) -> bool {
        self.database_path.as_os_str() == IN_MEMORY
    }
}

/// Handle to the bridge database. Clones share one pool.
#[derive(Debug, Clone)]
pub struct Database {
    pool: SqlitePool,
}

impl Database {
    /// Opens (or creates) the database and brings its schema up to date.
    pub async fn new(config: DbConfig) -> DbResult<Self> {
        info!(path = %config.database_path.display(), "Opening bridge database");

        let options = if config.is_in_memory() {
            SqliteConnectOptions::new().in_memory(true)
        } else {
            SqliteConnectOptions::new()
                .filename(&config.database_path)
                .create_if_missing(true)
                .journal_mode(SqliteJournalMode::Wal)
        }
        .synchronous(SqliteSynchronous::Normal)
        .busy_timeout(config.busy_timeout)
        .foreign_keys(true);

        let mut pool_options = SqlitePoolOptions::new().max_connections(config.max_connections);
        if config.is_in_memory() {
            pool_options = pool_options
                .min_connections(1)
                .idle_timeout(None)
                .max_lifetime(None);
        }

        let pool = pool_options
            .connect_with(options)
            .await
            .map_err(|e| DbError::ConnectionFailed(e.to_string()))?;

        migrations::run_migrations(&pool).await?;
        info!(max_connections = config.max_connections, "Bridge database ready");

        Ok(Database { pool })
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    pub fn price_lists(&self) -> PriceListRepository {
        PriceListRepository::new(self.pool.clone())
    }

    pub fn sync_state(&self) -> SyncStateRepository {
        SyncStateRepository::new(self.pool.clone())
    }

    pub fn request_log(&self) -> RequestLogRepository {
        RequestLogRepository::new(self.pool.clone())
    }

    /// Storefront mirror: products and variations.
    pub fn catalog(&self) -> CatalogRepository {
        CatalogRepository::new(self.pool.clone())
    }

    /// Storefront mirror: users and user meta.
    pub fn users(&self) -> UserRepository {
        UserRepository::new(self.pool.clone())
    }

    /// Storefront mirror: orders, lines and order meta.
    pub fn orders(&self) -> OrderRepository {
        OrderRepository::new(self.pool.clone())
    }

    /// Whether a trivial query still goes through.
    pub async fn is_reachable(&self) -> bool {
        sqlx::query("SELECT 1").execute(&self.pool).await.is_ok()
    }

    /// Waits for checked-out connections and closes the pool.
    pub async fn close(&self) {
        info!("Closing bridge database");
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_in_memory_database_is_migrated() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        assert!(db.is_reachable().await);

        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM price_list_entries")
            .fetch_one(db.pool())
            .await
            .unwrap();
        assert_eq!(count, 0);
    }

    #[tokio::test]
    async fn test_closed_database_is_unreachable() {
        let db = Database::new(DbConfig::in_memory()).await.unwrap();
        db.close().await;
        assert!(!db.is_reachable().await);
    }

    #[tokio::test]
    async fn test_file_database_is_created() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("bridge.db");

        let db = Database::new(DbConfig::new(&path)).await.unwrap();
        assert!(db.is_reachable().await);
        assert!(path.exists());
    }
}
