//! # User Repository
//!
//! Storefront users and their key/value meta.
//!
//! Profile fields live in meta rows under storefront names
//! (`first_name`, `billing_city`, ...). A missing row and an empty value are
//! different things: customer export only sends a display name when both
//! name rows exist.

use chrono::Utc;
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use super::{decode_json, encode_json};
use crate::error::{DbError, DbResult};
use ledgerlink_core::{Address, UserProfile};

/// Meta keys backing [`UserProfile`].
pub mod profile_keys {
    pub const FIRST_NAME: &str = "first_name";
    pub const LAST_NAME: &str = "last_name";
    pub const BILLING_FIRST_NAME: &str = "billing_first_name";
    pub const BILLING_LAST_NAME: &str = "billing_last_name";
    pub const BILLING_ADDRESS_1: &str = "billing_address_1";
    pub const BILLING_ADDRESS_2: &str = "billing_address_2";
    pub const BILLING_CITY: &str = "billing_city";
    pub const BILLING_POSTCODE: &str = "billing_postcode";
    pub const BILLING_COUNTRY: &str = "billing_country";
    pub const BILLING_PHONE: &str = "billing_phone";
}

/// A user to insert.
#[derive(Debug, Clone, Default)]
pub struct NewUser {
    /// Explicit id, or `None` to let SQLite assign one.
    pub id: Option<i64>,
    pub email: String,
    pub roles: Vec<String>,
    pub meta: BTreeMap<String, String>,
}

#[derive(Debug, sqlx::FromRow)]
struct UserRow {
    id: i64,
    email: String,
    roles_json: String,
}

/// Repository for storefront users.
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: SqlitePool,
}

impl UserRepository {
    /// Creates a new UserRepository.
    pub fn new(pool: SqlitePool) -> Self {
        UserRepository { pool }
    }

    /// Inserts a user and their meta in one transaction. Returns the id.
    pub async fn insert(&self, user: &NewUser) -> DbResult<i64> {
        let roles = encode_json("roles_json", &user.roles)?;
        let mut tx = self.pool.begin().await?;

        let id = sqlx::query("INSERT INTO users (id, email, roles_json, created_at) VALUES (?1, ?2, ?3, ?4)")
            .bind(user.id)
            .bind(&user.email)
            .bind(roles)
            .bind(Utc::now())
            .execute(&mut *tx)
            .await?
            .last_insert_rowid();

        for (key, value) in &user.meta {
            sqlx::query("INSERT INTO user_meta (user_id, meta_key, meta_value) VALUES (?1, ?2, ?3)")
                .bind(id)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(user_id = id, "User inserted");
        Ok(id)
    }

    /// Whether a user row exists.
    pub async fn exists(&self, user_id: i64) -> DbResult<bool> {
        let found: Option<i64> = sqlx::query_scalar("SELECT id FROM users WHERE id = ?1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?;

        Ok(found.is_some())
    }

    // =========================================================================
    // Meta
    // =========================================================================

    /// Reads one meta value.
    pub async fn get_meta(&self, user_id: i64, key: &str) -> DbResult<Option<String>> {
        let value: Option<String> = sqlx::query_scalar(
            "SELECT meta_value FROM user_meta WHERE user_id = ?1 AND meta_key = ?2",
        )
        .bind(user_id)
        .bind(key)
        .fetch_optional(&self.pool)
        .await?;

        Ok(value)
    }

    /// Writes one meta value, replacing any previous one.
    pub async fn set_meta(&self, user_id: i64, key: &str, value: &str) -> DbResult<()> {
        sqlx::query(
            r#"
            INSERT INTO user_meta (user_id, meta_key, meta_value) VALUES (?1, ?2, ?3)
            ON CONFLICT (user_id, meta_key) DO UPDATE SET meta_value = excluded.meta_value
            "#,
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Writes a meta value only if the key is absent.
    ///
    /// Returns `true` when the value was written.
    pub async fn add_meta_if_absent(&self, user_id: i64, key: &str, value: &str) -> DbResult<bool> {
        let written = sqlx::query(
            "INSERT OR IGNORE INTO user_meta (user_id, meta_key, meta_value) VALUES (?1, ?2, ?3)",
        )
        .bind(user_id)
        .bind(key)
        .bind(value)
        .execute(&self.pool)
        .await?
        .rows_affected();

        Ok(written > 0)
    }

    /// All meta of a user.
    pub async fn all_meta(&self, user_id: i64) -> DbResult<BTreeMap<String, String>> {
        let rows: Vec<(String, String)> =
            sqlx::query_as("SELECT meta_key, meta_value FROM user_meta WHERE user_id = ?1")
                .bind(user_id)
                .fetch_all(&self.pool)
                .await?;

        Ok(rows.into_iter().collect())
    }

    // =========================================================================
    // Profiles
    // =========================================================================

    /// Profile assembled from the user row and its meta.
    pub async fn profile(&self, user_id: i64) -> DbResult<Option<UserProfile>> {
        let row: Option<UserRow> =
            sqlx::query_as("SELECT id, email, roles_json FROM users WHERE id = ?1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let mut meta = self.all_meta(user_id).await?;
        let mut take = |key: &str| meta.remove(key).unwrap_or_default();

        use profile_keys::*;
        let billing = Address {
            first_name: take(BILLING_FIRST_NAME),
            last_name: take(BILLING_LAST_NAME),
            address_1: take(BILLING_ADDRESS_1),
            address_2: take(BILLING_ADDRESS_2),
            city: take(BILLING_CITY),
            postcode: take(BILLING_POSTCODE),
            country: take(BILLING_COUNTRY),
            phone: take(BILLING_PHONE),
        };

        Ok(Some(UserProfile {
            id: row.id,
            email: row.email,
            first_name: meta.remove(FIRST_NAME),
            last_name: meta.remove(LAST_NAME),
            billing,
            roles: decode_json("roles_json", &row.roles_json)?,
        }))
    }

    /// Ids of users holding `role`, ascending.
    pub async fn ids_with_role(&self, role: &str) -> DbResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar(
            r#"
            SELECT id FROM users
            WHERE EXISTS (SELECT 1 FROM json_each(users.roles_json) WHERE json_each.value = ?1)
            ORDER BY id
            "#,
        )
        .bind(role)
        .fetch_all(&self.pool)
        .await?;

        Ok(ids)
    }

    /// Fails with NotFound unless the user exists.
    pub async fn require(&self, user_id: i64) -> DbResult<()> {
        if self.exists(user_id).await? {
            Ok(())
        } else {
            Err(DbError::not_found("User", user_id))
        }
    }
}

// =============================================================================
// Unit Tests
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pool::{Database, DbConfig};

    async fn repo() -> UserRepository {
        Database::new(DbConfig::in_memory()).await.unwrap().users()
    }

    fn customer(email: &str) -> NewUser {
        let mut meta = BTreeMap::new();
        meta.insert("first_name".into(), "Dana".into());
        meta.insert("billing_city".into(), "Haifa".into());
        meta.insert("billing_country".into(), "IL".into());
        NewUser {
            id: None,
            email: email.into(),
            roles: vec!["customer".into()],
            meta,
        }
    }

    #[tokio::test]
    async fn test_profile_from_meta() {
        let repo = repo().await;
        let id = repo.insert(&customer("dana@example.com")).await.unwrap();

        let profile = repo.profile(id).await.unwrap().unwrap();
        assert_eq!(profile.email, "dana@example.com");
        assert_eq!(profile.first_name.as_deref(), Some("Dana"));
        assert_eq!(profile.last_name, None);
        assert_eq!(profile.billing.city, "Haifa");
        assert_eq!(profile.billing.country, "IL");
        assert_eq!(profile.billing.address_1, "");
        assert_eq!(profile.roles, vec!["customer".to_string()]);

        assert!(repo.profile(999).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_meta_set_and_add_if_absent() {
        let repo = repo().await;
        let id = repo.insert(&customer("a@example.com")).await.unwrap();

        assert!(repo.add_meta_if_absent(id, "_priority_customer_number", "7").await.unwrap());
        assert!(!repo.add_meta_if_absent(id, "_priority_customer_number", "8").await.unwrap());
        assert_eq!(
            repo.get_meta(id, "_priority_customer_number").await.unwrap().as_deref(),
            Some("7")
        );

        repo.set_meta(id, "_priority_price_list", "VIP").await.unwrap();
        repo.set_meta(id, "_priority_price_list", "no-selected").await.unwrap();
        assert_eq!(
            repo.get_meta(id, "_priority_price_list").await.unwrap().as_deref(),
            Some("no-selected")
        );
    }

    #[tokio::test]
    async fn test_ids_with_role() {
        let repo = repo().await;
        let a = repo.insert(&customer("a@example.com")).await.unwrap();
        repo.insert(&NewUser {
            email: "admin@example.com".into(),
            roles: vec!["administrator".into()],
            ..Default::default()
        })
        .await
        .unwrap();
        let c = repo.insert(&customer("c@example.com")).await.unwrap();

        assert_eq!(repo.ids_with_role("customer").await.unwrap(), vec![a, c]);
        assert!(repo.require(a).await.is_ok());
        assert!(repo.require(12345).await.is_err());
    }
}
