//! Document store for the admin dashboard.
//!
//! # Schema: `shop`
//!
//! ## Tables
//!
//! - `orders` - Paid storefront orders (items and shipping address as JSONB)
//! - `preorders` - Orders placed before payment, plus the last payment link
//! - `products` - Catalogue (list fields as JSONB)
//! - `users` - Storefront accounts
//! - `settings` - Single-row store settings
//! - `email_logs` - One row per attempted send
//!
//! Sessions live in `admin.session`, owned by `tower-sessions-sqlx-store`.
//!
//! # Migrations
//!
//! Migrations are stored in `crates/admin/migrations/` and run via:
//! ```bash
//! cargo run -p sareine-cli -- migrate
//! ```
//!
//! Handlers talk to the [`Store`] trait. [`PgStore`] is the production
//! implementation; [`MemoryStore`] backs tests and local demos.

pub mod email_logs;
pub mod memory;
pub mod orders;
pub mod postgres;
pub mod preorders;
pub mod products;
pub mod settings;
pub mod users;

use std::time::Duration;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;

use sareine_core::{OrderId, OrderStatus, PreorderId, PreorderStatus, ProductId};

use crate::models::{
    EmailLog, Order, PaymentLinkRef, Preorder, Product, ProductPatch, StoreSettings, User,
};

pub use email_logs::EmailLogRepository;
pub use memory::MemoryStore;
pub use orders::OrderRepository;
pub use postgres::PgStore;
pub use preorders::PreorderRepository;
pub use products::ProductRepository;
pub use settings::SettingsRepository;
pub use users::UserRepository;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the database is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested entity was not found.
    #[error("not found")]
    NotFound,

    /// Constraint violation (e.g., duplicate id).
    #[error("constraint violation: {0}")]
    Conflict(String),
}

/// Every read and write the dashboard performs.
///
/// Each method is a single direct operation; nothing spans documents.
#[async_trait]
pub trait Store: Send + Sync + 'static {
    /// Cheap connectivity check used by readiness probes.
    async fn ping(&self) -> Result<(), RepositoryError>;

    // Orders

    /// All orders, optionally filtered by status.
    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError>;

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError>;

    /// Set an order's status and `updated_at`.
    ///
    /// Returns [`RepositoryError::NotFound`] if the order does not exist.
    async fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Insert or replace an order.
    async fn put_order(&self, order: &Order) -> Result<(), RepositoryError>;

    // Preorders

    async fn list_preorders(&self) -> Result<Vec<Preorder>, RepositoryError>;

    async fn get_preorder(&self, id: &PreorderId) -> Result<Option<Preorder>, RepositoryError>;

    /// Look up a preorder by its human reference (`preorderId`), or by
    /// document id for preorders without one. A blank reference matches
    /// nothing.
    async fn find_preorder_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Preorder>, RepositoryError>;

    /// Set a preorder's status and `updated_at`.
    ///
    /// Returns [`RepositoryError::NotFound`] if the preorder does not exist.
    async fn set_preorder_status(
        &self,
        id: &PreorderId,
        status: PreorderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Move a preorder to `paid`, keeping the gateway payment id if given.
    ///
    /// Returns [`RepositoryError::NotFound`] if the preorder does not exist.
    async fn mark_preorder_paid(
        &self,
        id: &PreorderId,
        payment_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Store the link just sent and move the preorder to `payment_link_sent`.
    ///
    /// Returns [`RepositoryError::NotFound`] if the preorder does not exist.
    async fn record_payment_link(
        &self,
        id: &PreorderId,
        link: &PaymentLinkRef,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Insert or replace a preorder.
    async fn put_preorder(&self, preorder: &Preorder) -> Result<(), RepositoryError>;

    // Products

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError>;

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError>;

    /// Insert or replace a product.
    async fn put_product(&self, product: &Product) -> Result<(), RepositoryError>;

    /// Apply a partial update.
    ///
    /// Returns [`RepositoryError::NotFound`] if the product does not exist.
    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError>;

    /// Returns [`RepositoryError::NotFound`] if the product does not exist.
    async fn delete_product(&self, id: &ProductId) -> Result<(), RepositoryError>;

    // Users

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError>;

    /// Insert or replace a user.
    async fn put_user(&self, user: &User) -> Result<(), RepositoryError>;

    // Settings

    /// The settings record, if one was ever saved.
    async fn load_settings(&self) -> Result<Option<StoreSettings>, RepositoryError>;

    async fn save_settings(&self, settings: &StoreSettings) -> Result<(), RepositoryError>;

    // Email log

    async fn append_email_log(&self, entry: &EmailLog) -> Result<(), RepositoryError>;

    /// The newest `limit` entries, newest first.
    async fn recent_email_logs(&self, limit: usize) -> Result<Vec<EmailLog>, RepositoryError>;
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}

/// Run the admin migrations embedded from `crates/admin/migrations`.
///
/// # Errors
///
/// Returns an error if a migration fails to apply.
pub async fn run_migrations(pool: &PgPool) -> Result<(), sqlx::migrate::MigrateError> {
    sqlx::migrate!("./migrations").run(pool).await
}

/// Convert a JSON column into a model type.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    what: &str,
) -> Result<T, RepositoryError> {
    serde_json::from_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("invalid {what} in database: {e}")))
}

/// Convert a model value into a JSON column.
pub(crate) fn encode_json<T: serde::Serialize>(
    value: &T,
    what: &str,
) -> Result<serde_json::Value, RepositoryError> {
    serde_json::to_value(value)
        .map_err(|e| RepositoryError::DataCorruption(format!("cannot encode {what}: {e}")))
}

/// Parse a stored status tag.
pub(crate) fn decode_status<T>(raw: &str) -> Result<T, RepositoryError>
where
    T: std::str::FromStr<Err = sareine_core::UnknownVariant>,
{
    raw.parse()
        .map_err(|e: sareine_core::UnknownVariant| RepositoryError::DataCorruption(e.to_string()))
}
