//! # Price List Repository
//!
//! The per-tenant `(price_list_code, product_sku) → price` table.
//!
//! ## Replacement
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  replace_all(tenant, entries)                                          │
//! │                                                                         │
//! │  BEGIN                                                                 │
//! │    DELETE FROM price_list_entries WHERE tenant_id = ?                  │
//! │    INSERT OR REPLACE ... (one per entry)                               │
//! │  COMMIT                                                                │
//! │                                                                         │
//! │  Readers see the old snapshot or the new one, never a mix.             │
//! │  Any failure rolls back and the old rows stay.                         │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use std::collections::HashMap;

use sqlx::SqlitePool;
use tracing::{debug, info};

use crate::error::DbResult;
use ledgerlink_core::pricing::{PriceListEntry, PriceListSummary};
use ledgerlink_core::Money;

#[derive(Debug, sqlx::FromRow)]
struct EntryRow {
    tenant_id: String,
    price_list_code: String,
    product_sku: String,
    price_list_name: String,
    price_list_currency: String,
    price_list_price: i64,
}

impl From<EntryRow> for PriceListEntry {
    fn from(row: EntryRow) -> Self {
        PriceListEntry {
            product_sku: row.product_sku,
            price_list_code: row.price_list_code,
            price_list_name: row.price_list_name,
            currency: row.price_list_currency,
            price: Money::from_cents(row.price_list_price),
            tenant_id: row.tenant_id,
        }
    }
}

const SELECT_ENTRY: &str = r#"
    SELECT tenant_id, price_list_code, product_sku,
           price_list_name, price_list_currency, price_list_price
    FROM price_list_entries
"#;

/// Repository for price list entries.
#[derive(Debug, Clone)]
pub struct PriceListRepository {
    pool: SqlitePool,
}

impl PriceListRepository {
    /// Creates a new PriceListRepository.
    pub fn new(pool: SqlitePool) -> Self {
        PriceListRepository { pool }
    }

    /// Replaces every entry of a tenant in one transaction.
    ///
    /// Duplicate `(code, sku)` pairs in `entries` collapse to the last one.
    /// Returns the number of rows written.
    pub async fn replace_all(&self, tenant_id: &str, entries: &[PriceListEntry]) -> DbResult<u64> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM price_list_entries WHERE tenant_id = ?1")
            .bind(tenant_id)
            .execute(&mut *tx)
            .await?
            .rows_affected();

        debug!(tenant_id = %tenant_id, removed, "Cleared price list entries");

        let entries = collapse_duplicates(entries);
        let mut written = 0u64;
        for entry in entries {
            written += sqlx::query(
                r#"
                INSERT OR REPLACE INTO price_list_entries (
                    tenant_id, price_list_code, product_sku,
                    price_list_name, price_list_currency, price_list_price
                ) VALUES (?1, ?2, ?3, ?4, ?5, ?6)
                "#,
            )
            .bind(tenant_id)
            .bind(&entry.price_list_code)
            .bind(&entry.product_sku)
            .bind(&entry.price_list_name)
            .bind(&entry.currency)
            .bind(entry.price.cents())
            .execute(&mut *tx)
            .await?
            .rows_affected();
        }

        tx.commit().await?;

        info!(tenant_id = %tenant_id, written, "Price list entries replaced");
        Ok(written)
    }

    /// Entry for one SKU in one list.
    pub async fn entry(
        &self,
        tenant_id: &str,
        price_list_code: &str,
        product_sku: &str,
    ) -> DbResult<Option<PriceListEntry>> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE tenant_id = ?1 AND price_list_code = ?2 AND product_sku = ?3"
        );
        let row: Option<EntryRow> = sqlx::query_as(&sql)
            .bind(tenant_id)
            .bind(price_list_code)
            .bind(product_sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(row.map(PriceListEntry::from))
    }

    /// All entries of one list, ordered by SKU.
    pub async fn entries_for_list(
        &self,
        tenant_id: &str,
        price_list_code: &str,
    ) -> DbResult<Vec<PriceListEntry>> {
        let sql = format!(
            "{SELECT_ENTRY} WHERE tenant_id = ?1 AND price_list_code = ?2 ORDER BY product_sku"
        );
        let rows: Vec<EntryRow> = sqlx::query_as(&sql)
            .bind(tenant_id)
            .bind(price_list_code)
            .fetch_all(&self.pool)
            .await?;

        Ok(rows.into_iter().map(PriceListEntry::from).collect())
    }

    /// SKUs listed in one list.
    pub async fn skus_for_list(&self, tenant_id: &str, price_list_code: &str) -> DbResult<Vec<String>> {
        let skus: Vec<String> = sqlx::query_scalar(
            r#"
            SELECT product_sku FROM price_list_entries
            WHERE tenant_id = ?1 AND price_list_code = ?2
            ORDER BY product_sku
            "#,
        )
        .bind(tenant_id)
        .bind(price_list_code)
        .fetch_all(&self.pool)
        .await?;

        Ok(skus)
    }

    /// Currency code of a list as the ERP spelled it.
    ///
    /// `None` when the list has no entries.
    pub async fn currency_for_list(
        &self,
        tenant_id: &str,
        price_list_code: &str,
    ) -> DbResult<Option<String>> {
        let currency: Option<String> = sqlx::query_scalar(
            r#"
            SELECT price_list_currency FROM price_list_entries
            WHERE tenant_id = ?1 AND price_list_code = ?2
            LIMIT 1
            "#,
        )
        .bind(tenant_id)
        .bind(price_list_code)
        .fetch_optional(&self.pool)
        .await?;

        Ok(currency)
    }

    /// Distinct lists, for assignment pickers.
    pub async fn list_summaries(&self, tenant_id: &str) -> DbResult<Vec<PriceListSummary>> {
        let rows: Vec<(String, String)> = sqlx::query_as(
            r#"
            SELECT price_list_code, MAX(price_list_name)
            FROM price_list_entries
            WHERE tenant_id = ?1
            GROUP BY price_list_code
            ORDER BY price_list_code
            "#,
        )
        .bind(tenant_id)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows
            .into_iter()
            .map(|(code, name)| PriceListSummary { code, name })
            .collect())
    }

    /// Counts a tenant's entries (for diagnostics).
    pub async fn count(&self, tenant_id: &str) -> DbResult<i64> {
        let count: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM price_list_entries WHERE tenant_id = ?1")
                .bind(tenant_id)
                .fetch_one(&self.pool)
                .await?;

        Ok(count)
    }
}

/// One entry per `(code, sku)`, at its first position with its last value.
fn collapse_duplicates(entries: &[PriceListEntry]) -> Vec<&PriceListEntry> {
    let mut kept: Vec<&PriceListEntry> = Vec::with_capacity(entries.len());
    let mut positions: HashMap<(&str, &str), usize> = HashMap::new();
    for entry in entries {
        let key = (entry.price_list_code.as_str(), entry.product_sku.as_str());
        match positions.get(&key) {
            Some(&index) => kept[index] = entry,
            None => {
                positions.insert(key, kept.len());
                kept.push(entry);
            }
        }
    }
    kept
}

// =============================================================================
// Unit Tests
// =============================================================================
