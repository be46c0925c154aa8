//! # Catalog Repository
//!
//! Storefront products mirrored locally: simple items, variable parents and
//! their variations.
//!
//! ## Shape
//! ```text
//! ┌─────────────────────────────────────────────────────────────────────────┐
//! │  products                                                               │
//! │                                                                         │
//! │  id  parent_id  kind       sku        title                            │
//! │  ──  ─────────  ─────────  ─────────  ─────────────────────────         │
//! │  1   NULL       simple     A1         Widget                           │
//! │  2   NULL       variable   TS         T-Shirt Basic                    │
//! │  3   2          variation  TS-RED-M   T-Shirt Basic                    │
//! │  4   2          variation  TS-BLU-M   T-Shirt Basic                    │
//! │                                                                         │
//! │  Non-empty SKUs are unique across all kinds.                            │
//! └─────────────────────────────────────────────────────────────────────────┘
//! ```

use chrono::Utc;
use sqlx::{QueryBuilder, Sqlite, SqlitePool};
use tracing::debug;

use super::{decode_json, encode_json};
use crate::error::{DbError, DbResult};
use ledgerlink_core::{
    AttributeValue, CatalogProduct, ItemUpsert, Money, ProductAttribute, ProductKind, StockLevel,
    StockStatus, VariableProductDraft, VariationDraft,
};

#[derive(Debug, sqlx::FromRow)]
struct ProductRow {
    id: i64,
    parent_id: Option<i64>,
    kind: ProductKind,
    sku: String,
    title: String,
    regular_price: i64,
    price: i64,
    manage_stock: bool,
    stock_quantity: Option<i64>,
    stock_status: StockStatus,
    cross_sell_ids_json: String,
}

impl TryFrom<ProductRow> for CatalogProduct {
    type Error = DbError;

    fn try_from(row: ProductRow) -> DbResult<Self> {
        Ok(CatalogProduct {
            id: row.id,
            parent_id: row.parent_id,
            kind: row.kind,
            sku: row.sku,
            title: row.title,
            regular_price: Money::from_cents(row.regular_price),
            price: Money::from_cents(row.price),
            manage_stock: row.manage_stock,
            stock_quantity: row.stock_quantity,
            stock_status: row.stock_status,
            cross_sell_ids: decode_json("cross_sell_ids_json", &row.cross_sell_ids_json)?,
        })
    }
}

const SELECT_PRODUCT: &str = r#"
    SELECT id, parent_id, kind, sku, title, regular_price, price,
           manage_stock, stock_quantity, stock_status, cross_sell_ids_json
    FROM products
"#;

/// Repository for storefront products.
#[derive(Debug, Clone)]
pub struct CatalogRepository {
    pool: SqlitePool,
}

impl CatalogRepository {
    /// Creates a new CatalogRepository.
    pub fn new(pool: SqlitePool) -> Self {
        CatalogRepository { pool }
    }

    // =========================================================================
    // Lookups
    // =========================================================================

    /// Product id for a SKU, any kind.
    pub async fn find_id_by_sku(&self, sku: &str) -> DbResult<Option<i64>> {
        if sku.is_empty() {
            return Ok(None);
        }

        let id: Option<i64> = sqlx::query_scalar("SELECT id FROM products WHERE sku = ?1")
            .bind(sku)
            .fetch_optional(&self.pool)
            .await?;

        Ok(id)
    }

    /// Gets a product by id.
    pub async fn get(&self, id: i64) -> DbResult<Option<CatalogProduct>> {
        let sql = format!("{SELECT_PRODUCT} WHERE id = ?1");
        let row: Option<ProductRow> = sqlx::query_as(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        row.map(CatalogProduct::try_from).transpose()
    }

    /// Gets a product by SKU.
    pub async fn get_by_sku(&self, sku: &str) -> DbResult<Option<CatalogProduct>> {
        match self.find_id_by_sku(sku).await? {
            Some(id) => self.get(id).await,
            None => Ok(None),
        }
    }

    /// Products that are not variations, by id.
    pub async fn list_top_level(&self) -> DbResult<Vec<CatalogProduct>> {
        let sql = format!("{SELECT_PRODUCT} WHERE kind <> 'variation' ORDER BY id");
        let rows: Vec<ProductRow> = sqlx::query_as(&sql).fetch_all(&self.pool).await?;

        rows.into_iter().map(CatalogProduct::try_from).collect()
    }

    /// Variations of a variable product, by id.
    pub async fn variations_of(&self, parent_id: i64) -> DbResult<Vec<CatalogProduct>> {
        let sql = format!("{SELECT_PRODUCT} WHERE parent_id = ?1 AND kind = 'variation' ORDER BY id");
        let rows: Vec<ProductRow> = sqlx::query_as(&sql)
            .bind(parent_id)
            .fetch_all(&self.pool)
            .await?;

        rows.into_iter().map(CatalogProduct::try_from).collect()
    }

    /// SKUs of every variation in the catalog.
    pub async fn variation_skus(&self) -> DbResult<Vec<String>> {
        let skus: Vec<String> = sqlx::query_scalar(
            "SELECT sku FROM products WHERE kind = 'variation' AND sku <> '' ORDER BY sku",
        )
        .fetch_all(&self.pool)
        .await?;

        Ok(skus)
    }

    /// Ids of the products carrying any of `skus`. Unknown SKUs are ignored.
    pub async fn ids_for_skus(&self, skus: &[String]) -> DbResult<Vec<i64>> {
        if skus.is_empty() {
            return Ok(Vec::new());
        }

        let mut ids = Vec::with_capacity(skus.len());
        // SQLite caps bound parameters per statement
        for chunk in skus.chunks(500) {
            let mut builder: QueryBuilder<Sqlite> =
                QueryBuilder::new("SELECT id FROM products WHERE sku IN (");
            let mut separated = builder.separated(", ");
            for sku in chunk {
                separated.push_bind(sku);
            }
            separated.push_unseparated(") ORDER BY id");

            let found: Vec<i64> = builder.build_query_scalar::<i64>().fetch_all(&self.pool).await?;
            ids.extend(found);
        }

        Ok(ids)
    }

    /// Attributes declared on a variable product.
    pub async fn product_attributes(&self, id: i64) -> DbResult<Vec<ProductAttribute>> {
        let raw = self.json_column(id, "attributes_json").await?;
        decode_json("attributes_json", &raw)
    }

    /// Attribute selection of a variation.
    pub async fn variation_attributes(&self, id: i64) -> DbResult<Vec<AttributeValue>> {
        let raw = self.json_column(id, "attributes_json").await?;
        decode_json("attributes_json", &raw)
    }

    /// Category and tag names of a product.
    pub async fn terms(&self, id: i64) -> DbResult<(Vec<String>, Vec<String>)> {
        let (categories, tags): (String, String) =
            sqlx::query_as("SELECT categories_json, tags_json FROM products WHERE id = ?1")
                .bind(id)
                .fetch_optional(&self.pool)
                .await?
                .ok_or_else(|| DbError::not_found("Product", id))?;

        Ok((
            decode_json("categories_json", &categories)?,
            decode_json("tags_json", &tags)?,
        ))
    }

    /// Counts all products (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM products")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    async fn json_column(&self, id: i64, column: &'static str) -> DbResult<String> {
        let sql = format!("SELECT {column} FROM products WHERE id = ?1");
        let raw: Option<String> = sqlx::query_scalar(&sql)
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        raw.ok_or_else(|| DbError::not_found("Product", id))
    }

    // =========================================================================
    // Simple Products
    // =========================================================================

    /// Creates a simple product with zero stock, out of stock.
    pub async fn create_simple(&self, item: &ItemUpsert) -> DbResult<i64> {
        debug!(sku = %item.sku, "Creating simple product");
        let now = Utc::now();

        let id = sqlx::query(
            r#"
            INSERT INTO products (
                kind, sku, title, regular_price, price, manage_stock,
                stock_quantity, stock_status, created_at, updated_at
            ) VALUES ('simple', ?1, ?2, ?3, ?3, ?4, 0, 'outofstock', ?5, ?5)
            "#,
        )
        .bind(&item.sku)
        .bind(&item.title)
        .bind(item.price.cents())
        .bind(item.manage_stock)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Updates title, prices and stock management. Stock is untouched.
    pub async fn update_simple(&self, id: i64, item: &ItemUpsert) -> DbResult<()> {
        debug!(id, sku = %item.sku, "Updating simple product");

        let result = sqlx::query(
            r#"
            UPDATE products SET
                title = ?2,
                regular_price = ?3,
                price = ?3,
                manage_stock = ?4,
                updated_at = ?5
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(&item.title)
        .bind(item.price.cents())
        .bind(item.manage_stock)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Inserts a product row as-is (seeding and tests).
    pub async fn insert_product(&self, product: &CatalogProduct) -> DbResult<i64> {
        let now = Utc::now();
        let cross_sells = encode_json("cross_sell_ids_json", &product.cross_sell_ids)?;

        let id = sqlx::query(
            r#"
            INSERT INTO products (
                parent_id, kind, sku, title, regular_price, price, manage_stock,
                stock_quantity, stock_status, cross_sell_ids_json, created_at, updated_at
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?11)
            "#,
        )
        .bind(product.parent_id)
        .bind(product.kind)
        .bind(&product.sku)
        .bind(&product.title)
        .bind(product.regular_price.cents())
        .bind(product.price.cents())
        .bind(product.manage_stock)
        .bind(product.stock_quantity)
        .bind(product.stock_status)
        .bind(cross_sells)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    // =========================================================================
    // Variable Products
    // =========================================================================

    /// Creates or updates a variable product keyed by SKU.
    pub async fn upsert_variable(&self, draft: &VariableProductDraft) -> DbResult<i64> {
        let attributes = encode_json("attributes_json", &draft.attributes)?;
        let categories = encode_json("categories_json", &draft.categories)?;
        let tags = encode_json("tags_json", &draft.tags)?;
        let now = Utc::now();

        if let Some(id) = self.find_id_by_sku(&draft.sku).await? {
            debug!(id, sku = %draft.sku, "Updating variable product");
            sqlx::query(
                r#"
                UPDATE products SET
                    kind = 'variable',
                    parent_id = NULL,
                    title = ?2,
                    stock_status = ?3,
                    attributes_json = ?4,
                    categories_json = ?5,
                    tags_json = ?6,
                    updated_at = ?7
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(&draft.title)
            .bind(draft.stock_status)
            .bind(&attributes)
            .bind(&categories)
            .bind(&tags)
            .bind(now)
            .execute(&self.pool)
            .await?;
            return Ok(id);
        }

        debug!(sku = %draft.sku, "Creating variable product");
        let id = sqlx::query(
            r#"
            INSERT INTO products (
                kind, sku, title, stock_status, attributes_json,
                categories_json, tags_json, created_at, updated_at
            ) VALUES ('variable', ?1, ?2, ?3, ?4, ?5, ?6, ?7, ?7)
            "#,
        )
        .bind(&draft.sku)
        .bind(&draft.title)
        .bind(draft.stock_status)
        .bind(&attributes)
        .bind(&categories)
        .bind(&tags)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    /// Creates or updates a variation of `parent_id` keyed by SKU.
    ///
    /// The variation takes its parent's title.
    pub async fn upsert_variation(&self, parent_id: i64, draft: &VariationDraft) -> DbResult<i64> {
        let attributes = encode_json("attributes_json", &draft.attributes)?;
        let now = Utc::now();

        if let Some(id) = self.find_id_by_sku(&draft.sku).await? {
            debug!(id, parent_id, sku = %draft.sku, "Updating variation");
            sqlx::query(
                r#"
                UPDATE products SET
                    kind = 'variation',
                    parent_id = ?2,
                    title = COALESCE((SELECT title FROM products WHERE id = ?2), title),
                    regular_price = ?3,
                    price = ?3,
                    stock_status = ?4,
                    attributes_json = ?5,
                    updated_at = ?6
                WHERE id = ?1
                "#,
            )
            .bind(id)
            .bind(parent_id)
            .bind(draft.regular_price.cents())
            .bind(draft.stock_status)
            .bind(&attributes)
            .bind(now)
            .execute(&self.pool)
            .await?;
            return Ok(id);
        }

        debug!(parent_id, sku = %draft.sku, "Creating variation");
        let id = sqlx::query(
            r#"
            INSERT INTO products (
                parent_id, kind, sku, title, regular_price, price,
                stock_status, attributes_json, created_at, updated_at
            ) VALUES (
                ?1, 'variation', ?2,
                COALESCE((SELECT title FROM products WHERE id = ?1), ''),
                ?3, ?3, ?4, ?5, ?6, ?6
            )
            "#,
        )
        .bind(parent_id)
        .bind(&draft.sku)
        .bind(draft.regular_price.cents())
        .bind(draft.stock_status)
        .bind(&attributes)
        .bind(now)
        .execute(&self.pool)
        .await?
        .last_insert_rowid();

        Ok(id)
    }

    // =========================================================================
    // Stock & Cross-sells
    // =========================================================================

    /// Sets stock quantity and status.
    pub async fn set_stock(&self, id: i64, level: StockLevel) -> DbResult<()> {
        let result = sqlx::query(
            r#"
            UPDATE products SET
                stock_quantity = ?2,
                stock_status = ?3,
                updated_at = ?4
            WHERE id = ?1
            "#,
        )
        .bind(id)
        .bind(level.quantity)
        .bind(level.status)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }

    /// Replaces a product's cross-sell ids.
    pub async fn set_cross_sells(&self, id: i64, cross_sell_ids: &[i64]) -> DbResult<()> {
        let encoded = encode_json("cross_sell_ids_json", &cross_sell_ids)?;

        let result = sqlx::query(
            "UPDATE products SET cross_sell_ids_json = ?2, updated_at = ?3 WHERE id = ?1",
        )
        .bind(id)
        .bind(encoded)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Product", id));
        }

        Ok(())
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
