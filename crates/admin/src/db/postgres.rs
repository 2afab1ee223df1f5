//! `PostgreSQL` implementation of [`Store`].

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use sareine_core::{OrderId, OrderStatus, PreorderId, PreorderStatus, ProductId};

use super::{
    EmailLogRepository, OrderRepository, PreorderRepository, ProductRepository, RepositoryError,
    SettingsRepository, Store, UserRepository,
};
use crate::models::{
    EmailLog, Order, PaymentLinkRef, Preorder, Product, ProductPatch, StoreSettings, User,
};

/// Store backed by the `shop` schema.
#[derive(Debug, Clone)]
pub struct PgStore {
    pool: PgPool,
}

impl PgStore {
    /// Wrap a connection pool.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying pool (sessions share it).
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

#[async_trait]
impl Store for PgStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        sqlx::query("SELECT 1").execute(&self.pool).await?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).list(status).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        OrderRepository::new(&self.pool).get(id).await
    }

    #[instrument(skip(self), fields(order_id = %id))]
    async fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        OrderRepository::new(&self.pool).set_status(id, status, at).await
    }

    async fn put_order(&self, order: &Order) -> Result<(), RepositoryError> {
        OrderRepository::new(&self.pool).upsert(order).await
    }

    #[instrument(skip(self))]
    async fn list_preorders(&self) -> Result<Vec<Preorder>, RepositoryError> {
        PreorderRepository::new(&self.pool).list().await
    }

    #[instrument(skip(self), fields(preorder_id = %id))]
    async fn get_preorder(&self, id: &PreorderId) -> Result<Option<Preorder>, RepositoryError> {
        PreorderRepository::new(&self.pool).get(id).await
    }

    #[instrument(skip(self))]
    async fn find_preorder_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Preorder>, RepositoryError> {
        PreorderRepository::new(&self.pool)
            .get_by_reference(reference)
            .await
    }

    #[instrument(skip(self), fields(preorder_id = %id))]
    async fn set_preorder_status(
        &self,
        id: &PreorderId,
        status: PreorderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        PreorderRepository::new(&self.pool)
            .set_status(id, status, at)
            .await
    }

    #[instrument(skip(self), fields(preorder_id = %id))]
    async fn mark_preorder_paid(
        &self,
        id: &PreorderId,
        payment_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        PreorderRepository::new(&self.pool)
            .mark_paid(id, payment_id, at)
            .await
    }

    #[instrument(skip(self, link), fields(preorder_id = %id))]
    async fn record_payment_link(
        &self,
        id: &PreorderId,
        link: &PaymentLinkRef,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        PreorderRepository::new(&self.pool)
            .record_payment_link(id, link, at)
            .await
    }

    async fn put_preorder(&self, preorder: &Preorder) -> Result<(), RepositoryError> {
        PreorderRepository::new(&self.pool).upsert(preorder).await
    }

    #[instrument(skip(self))]
    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).list().await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        ProductRepository::new(&self.pool).get(id).await
    }

    #[instrument(skip(self, product), fields(product_id = %product.id))]
    async fn put_product(&self, product: &Product) -> Result<(), RepositoryError> {
        ProductRepository::new(&self.pool).upsert(product).await
    }

    #[instrument(skip(self, patch), fields(product_id = %id))]
    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        ProductRepository::new(&self.pool).update(id, patch, at).await
    }

    #[instrument(skip(self), fields(product_id = %id))]
    async fn delete_product(&self, id: &ProductId) -> Result<(), RepositoryError> {
        ProductRepository::new(&self.pool).delete(id).await
    }

    #[instrument(skip(self))]
    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        UserRepository::new(&self.pool).list().await
    }

    async fn put_user(&self, user: &User) -> Result<(), RepositoryError> {
        UserRepository::new(&self.pool).upsert(user).await
    }

    async fn load_settings(&self) -> Result<Option<StoreSettings>, RepositoryError> {
        SettingsRepository::new(&self.pool).load().await
    }

    #[instrument(skip(self, settings))]
    async fn save_settings(&self, settings: &StoreSettings) -> Result<(), RepositoryError> {
        SettingsRepository::new(&self.pool).save(settings).await
    }

    #[instrument(skip(self, entry), fields(kind = %entry.kind))]
    async fn append_email_log(&self, entry: &EmailLog) -> Result<(), RepositoryError> {
        EmailLogRepository::new(&self.pool).append(entry).await
    }

    async fn recent_email_logs(&self, limit: usize) -> Result<Vec<EmailLog>, RepositoryError> {
        EmailLogRepository::new(&self.pool).recent(limit).await
    }
}
