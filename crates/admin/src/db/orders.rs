//! Order repository for database operations.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde_json::Value as JsonValue;
use sqlx::PgPool;

use sareine_core::{Amount, OrderId, OrderStatus, UserId};

use super::{RepositoryError, decode_json, decode_status, encode_json};
use crate::models::Order;

const ORDER_COLUMNS: &str = "id, user_id, customer_name, customer_email, amount, status, items, \
                             shipping_address, razorpay_payment_id, created_at, updated_at";

/// Internal row type for `PostgreSQL` order queries.
#[derive(Debug, sqlx::FromRow)]
struct OrderRow {
    id: String,
    user_id: Option<String>,
    customer_name: String,
    customer_email: String,
    amount: Decimal,
    status: String,
    items: JsonValue,
    shipping_address: Option<JsonValue>,
    razorpay_payment_id: Option<String>,
    created_at: Option<DateTime<Utc>>,
    updated_at: Option<DateTime<Utc>>,
}

impl TryFrom<OrderRow> for Order {
    type Error = RepositoryError;

    fn try_from(row: OrderRow) -> Result<Self, Self::Error> {
        Ok(Self {
            id: OrderId::new(row.id),
            user_id: row.user_id.map(UserId::new),
            customer_name: row.customer_name,
            customer_email: row.customer_email,
            amount: Amount::new(row.amount),
            status: decode_status(&row.status)?,
            items: decode_json(row.items, "order items")?,
            shipping_address: row
                .shipping_address
                .map(|v| decode_json(v, "shipping address"))
                .transpose()?,
            razorpay_payment_id: row.razorpay_payment_id,
            created_at: row.created_at,
            updated_at: row.updated_at,
        })
    }
}

/// Repository for order database operations.
pub struct OrderRepository<'a> {
    pool: &'a PgPool,
}

impl<'a> OrderRepository<'a> {
    /// Create a new order repository.
    #[must_use]
    pub const fn new(pool: &'a PgPool) -> Self {
        Self { pool }
    }

    /// List orders, newest first, optionally filtered by status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn list(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        let rows: Vec<OrderRow> = sqlx::query_as(&format!(
            "SELECT {ORDER_COLUMNS} FROM shop.orders \
             WHERE ($1::text IS NULL OR status = $1) \
             ORDER BY created_at DESC NULLS LAST"
        ))
        .bind(status.map(|s| s.as_str()))
        .fetch_all(self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    /// Get an order by id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if the data is invalid.
    pub async fn get(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        let row: Option<OrderRow> =
            sqlx::query_as(&format!("SELECT {ORDER_COLUMNS} FROM shop.orders WHERE id = $1"))
                .bind(id.as_str())
                .fetch_optional(self.pool)
                .await?;

        row.map(TryInto::try_into).transpose()
    }

    /// Update an order's status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if no order has this id.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn set_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        let result = sqlx::query("UPDATE shop.orders SET status = $2, updated_at = $3 WHERE id = $1")
            .bind(id.as_str())
            .bind(status.as_str())
            .bind(at)
            .execute(self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(())
    }

    /// Insert an order or replace the stored copy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn upsert(&self, order: &Order) -> Result<(), RepositoryError> {
        let items = encode_json(&order.items, "order items")?;
        let shipping = order
            .shipping_address
            .as_ref()
            .map(|a| encode_json(a, "shipping address"))
            .transpose()?;

        sqlx::query(
            r"
            INSERT INTO shop.orders (id, user_id, customer_name, customer_email, amount, status,
                                     items, shipping_address, razorpay_payment_id, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            ON CONFLICT (id) DO UPDATE SET
                user_id = EXCLUDED.user_id,
                customer_name = EXCLUDED.customer_name,
                customer_email = EXCLUDED.customer_email,
                amount = EXCLUDED.amount,
                status = EXCLUDED.status,
                items = EXCLUDED.items,
                shipping_address = EXCLUDED.shipping_address,
                razorpay_payment_id = EXCLUDED.razorpay_payment_id,
                created_at = EXCLUDED.created_at,
                updated_at = EXCLUDED.updated_at
            ",
        )
        .bind(order.id.as_str())
        .bind(order.user_id.as_ref().map(UserId::as_str))
        .bind(&order.customer_name)
        .bind(&order.customer_email)
        .bind(order.amount.value())
        .bind(order.status.as_str())
        .bind(items)
        .bind(shipping)
        .bind(order.razorpay_payment_id.as_deref())
        .bind(order.created_at)
        .bind(order.updated_at)
        .execute(self.pool)
        .await?;

        Ok(())
    }
}
