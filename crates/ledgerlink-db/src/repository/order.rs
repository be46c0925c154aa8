//! # Order Repository
//!
//! Storefront orders with their lines and meta.
//!
//! ## Line → Product
//! ```text
//! order_lines.product_id ──► products.id ──► sku
//!        │
//!        └── NULL once the product is deleted; the line reads back with sku = None
//! ```

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::collections::BTreeMap;
use tracing::debug;

use super::{decode_json, encode_json};
use crate::error::{DbError, DbResult};
use ledgerlink_core::{Money, Order, OrderLine, OrderStatus, ShippingMethod};

#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: i64,
    number: String,
    customer_id: i64,
    status: OrderStatus,
    created_at: DateTime<Utc>,
    billing_json: String,
    shipping_json: String,
    shipping_method_id: Option<String>,
    shipping_method_title: Option<String>,
    shipping_total: i64,
    payment_method: String,
    total: i64,
}

#[derive(Debug, sqlx::FromRow)]
struct LineRow {
    id: i64,
    sku: Option<String>,
    quantity: i64,
    total: i64,
    meta_json: String,
}

impl TryFrom<LineRow> for OrderLine {
    type Error = DbError;

    fn try_from(row: LineRow) -> DbResult<Self> {
        Ok(OrderLine {
            id: row.id,
            sku: row.sku,
            quantity: row.quantity,
            total: Money::from_cents(row.total),
            meta: decode_json("meta_json", &row.meta_json)?,
        })
    }
}

/// Repository for storefront orders.
#[derive(Debug, Clone)]
pub struct OrderRepository {
    pool: SqlitePool,
}

impl OrderRepository {
    /// Creates a new OrderRepository.
    pub fn new(pool: SqlitePool) -> Self {
        OrderRepository { pool }
    }

    /// Inserts an order, its lines and meta in one transaction.
    ///
    /// Line products are resolved by SKU; an unknown SKU stores no product.
    pub async fn insert(&self, order: &Order) -> DbResult<()> {
        let billing = encode_json("billing_json", &order.billing)?;
        let shipping = encode_json("shipping_json", &order.shipping)?;
        let (method_id, method_title) = match &order.shipping_method {
            Some(m) => (Some(m.method_id.as_str()), Some(m.title.as_str())),
            None => (None, None),
        };

        let mut tx = self.pool.begin().await?;

        sqlx::query(
            r#"
            INSERT INTO orders (
                id, number, customer_id, status, created_at, billing_json, shipping_json,
                shipping_method_id, shipping_method_title, shipping_total, payment_method, total
            ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)
            "#,
        )
        .bind(order.id)
        .bind(&order.number)
        .bind(order.customer_id)
        .bind(order.status)
        .bind(order.created_at)
        .bind(billing)
        .bind(shipping)
        .bind(method_id)
        .bind(method_title)
        .bind(order.shipping_total.cents())
        .bind(&order.payment_method)
        .bind(order.total.cents())
        .execute(&mut *tx)
        .await?;

        for line in &order.lines {
            let meta = encode_json("meta_json", &line.meta)?;
            sqlx::query(
                r#"
                INSERT INTO order_lines (id, order_id, product_id, quantity, total, meta_json)
                VALUES (?1, ?2, (SELECT id FROM products WHERE sku = ?3 AND sku <> ''), ?4, ?5, ?6)
                "#,
            )
            .bind(line.id)
            .bind(order.id)
            .bind(line.sku.as_deref().unwrap_or_default())
            .bind(line.quantity)
            .bind(line.total.cents())
            .bind(meta)
            .execute(&mut *tx)
            .await?;
        }

        for (key, value) in &order.meta {
            sqlx::query("INSERT INTO order_meta (order_id, meta_key, meta_value) VALUES (?1, ?2, ?3)")
                .bind(order.id)
                .bind(key)
                .bind(value)
                .execute(&mut *tx)
                .await?;
        }

        tx.commit().await?;

        debug!(order_id = order.id, lines = order.lines.len(), "Order inserted");
        Ok(())
    }

    /// Gets an order with lines and meta.
    pub async fn get(&self, order_id: i64) -> DbResult<Option<Order>> {
        let row: Option<OrderRow> = sqlx::query_as(
            r#"
            SELECT id, number, customer_id, status, created_at, billing_json, shipping_json,
                   shipping_method_id, shipping_method_title, shipping_total, payment_method, total
            FROM orders
            WHERE id = ?1
            "#,
        )
        .bind(order_id)
        .fetch_optional(&self.pool)
        .await?;

        let Some(row) = row else {
            return Ok(None);
        };

        let lines: Vec<LineRow> = sqlx::query_as(
            r#"
            SELECT l.id, p.sku AS sku, l.quantity, l.total, l.meta_json
            FROM order_lines l
            LEFT JOIN products p ON p.id = l.product_id
            WHERE l.order_id = ?1
            ORDER BY l.id
            "#,
        )
        .bind(order_id)
        .fetch_all(&self.pool)
        .await?;

        let meta: Vec<(String, String)> =
            sqlx::query_as("SELECT meta_key, meta_value FROM order_meta WHERE order_id = ?1")
                .bind(order_id)
                .fetch_all(&self.pool)
                .await?;

        let shipping_method = match (row.shipping_method_id, row.shipping_method_title) {
            (Some(method_id), title) => Some(ShippingMethod {
                method_id,
                title: title.unwrap_or_default(),
            }),
            (None, _) => None,
        };

        Ok(Some(Order {
            id: row.id,
            number: row.number,
            customer_id: row.customer_id,
            status: row.status,
            created_at: row.created_at,
            billing: decode_json("billing_json", &row.billing_json)?,
            shipping: decode_json("shipping_json", &row.shipping_json)?,
            shipping_method,
            shipping_total: Money::from_cents(row.shipping_total),
            payment_method: row.payment_method,
            total: Money::from_cents(row.total),
            lines: lines
                .into_iter()
                .map(OrderLine::try_from)
                .collect::<DbResult<Vec<_>>>()?,
            meta: meta.into_iter().collect::<BTreeMap<_, _>>(),
        }))
    }

    /// Order ids in a status, ascending.
    pub async fn ids_with_status(&self, status: OrderStatus) -> DbResult<Vec<i64>> {
        let ids: Vec<i64> = sqlx::query_scalar("SELECT id FROM orders WHERE status = ?1 ORDER BY id")
            .bind(status)
            .fetch_all(&self.pool)
            .await?;

        Ok(ids)
    }

    /// Moves an order to a new status.
    pub async fn set_status(&self, order_id: i64, status: OrderStatus) -> DbResult<()> {
        let result = sqlx::query("UPDATE orders SET status = ?2 WHERE id = ?1")
            .bind(order_id)
            .bind(status)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("Order", order_id));
        }

        Ok(())
    }

    /// Counts all orders (for diagnostics).
    pub async fn count(&self) -> DbResult<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM orders")
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }
}

// =============================================================================
// Unit Tests
// =============================================================================
