//! In-memory implementation of [`Store`].
//!
//! For development and testing. Documents live in maps keyed by id; list
//! operations apply the same ordering as the SQL queries.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tokio::sync::RwLock;

use sareine_core::{OrderId, OrderStatus, PreorderId, PreorderStatus, ProductId, UserId};

use super::{RepositoryError, Store};
use crate::models::order::newest_first;
use crate::models::{
    EmailLog, Order, PaymentLinkRef, Preorder, Product, ProductPatch, StoreSettings, User,
};

#[derive(Debug, Default)]
struct Documents {
    orders: HashMap<OrderId, Order>,
    preorders: HashMap<PreorderId, Preorder>,
    products: HashMap<ProductId, Product>,
    users: HashMap<UserId, User>,
    settings: Option<StoreSettings>,
    email_logs: Vec<EmailLog>,
}

/// Store that keeps every document in process memory.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    docs: Arc<RwLock<Documents>>,
    offline: Arc<AtomicBool>,
    reject_email_logs: Arc<AtomicBool>,
}

fn unavailable() -> RepositoryError {
    RepositoryError::Database(sqlx::Error::PoolTimedOut)
}

impl MemoryStore {
    /// Empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every operation fail as if the database were unreachable.
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Make email log writes fail while everything else keeps working.
    pub fn set_reject_email_logs(&self, reject: bool) {
        self.reject_email_logs.store(reject, Ordering::SeqCst);
    }

    fn check(&self) -> Result<(), RepositoryError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        Ok(())
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn ping(&self) -> Result<(), RepositoryError> {
        self.check()
    }

    async fn list_orders(&self, status: Option<OrderStatus>) -> Result<Vec<Order>, RepositoryError> {
        self.check()?;
        let docs = self.docs.read().await;
        let mut orders: Vec<Order> = docs
            .orders
            .values()
            .filter(|o| status.is_none_or(|s| o.status == s))
            .cloned()
            .collect();
        orders.sort_by(|a, b| newest_first(a.created_at.as_ref(), b.created_at.as_ref()));
        Ok(orders)
    }

    async fn get_order(&self, id: &OrderId) -> Result<Option<Order>, RepositoryError> {
        self.check()?;
        Ok(self.docs.read().await.orders.get(id).cloned())
    }

    async fn set_order_status(
        &self,
        id: &OrderId,
        status: OrderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let order = docs.orders.get_mut(id).ok_or(RepositoryError::NotFound)?;
        order.status = status;
        order.updated_at = Some(at);
        Ok(())
    }

    async fn put_order(&self, order: &Order) -> Result<(), RepositoryError> {
        self.check()?;
        self.docs
            .write()
            .await
            .orders
            .insert(order.id.clone(), order.clone());
        Ok(())
    }

    async fn list_preorders(&self) -> Result<Vec<Preorder>, RepositoryError> {
        self.check()?;
        let docs = self.docs.read().await;
        let mut preorders: Vec<Preorder> = docs.preorders.values().cloned().collect();
        preorders.sort_by(|a, b| newest_first(a.created_at.as_ref(), b.created_at.as_ref()));
        Ok(preorders)
    }

    async fn get_preorder(&self, id: &PreorderId) -> Result<Option<Preorder>, RepositoryError> {
        self.check()?;
        Ok(self.docs.read().await.preorders.get(id).cloned())
    }

    async fn find_preorder_by_reference(
        &self,
        reference: &str,
    ) -> Result<Option<Preorder>, RepositoryError> {
        self.check()?;
        Ok(self
            .docs
            .read()
            .await
            .preorders
            .values()
            .filter(|p| p.has_reference(reference))
            .min_by_key(|p| p.preorder_id.trim().is_empty())
            .cloned())
    }

    async fn set_preorder_status(
        &self,
        id: &PreorderId,
        status: PreorderStatus,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let preorder = docs.preorders.get_mut(id).ok_or(RepositoryError::NotFound)?;
        preorder.status = status;
        preorder.updated_at = Some(at);
        Ok(())
    }

    async fn mark_preorder_paid(
        &self,
        id: &PreorderId,
        payment_id: Option<&str>,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let preorder = docs.preorders.get_mut(id).ok_or(RepositoryError::NotFound)?;
        preorder.status = PreorderStatus::Paid;
        if let Some(payment_id) = payment_id {
            preorder.razorpay_payment_id = Some(payment_id.to_string());
        }
        preorder.updated_at = Some(at);
        Ok(())
    }

    async fn record_payment_link(
        &self,
        id: &PreorderId,
        link: &PaymentLinkRef,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let preorder = docs.preorders.get_mut(id).ok_or(RepositoryError::NotFound)?;
        preorder.payment_link = Some(link.clone());
        preorder.status = PreorderStatus::PaymentLinkSent;
        preorder.updated_at = Some(at);
        Ok(())
    }

    async fn put_preorder(&self, preorder: &Preorder) -> Result<(), RepositoryError> {
        self.check()?;
        self.docs
            .write()
            .await
            .preorders
            .insert(preorder.id.clone(), preorder.clone());
        Ok(())
    }

    async fn list_products(&self) -> Result<Vec<Product>, RepositoryError> {
        self.check()?;
        let docs = self.docs.read().await;
        let mut products: Vec<Product> = docs.products.values().cloned().collect();
        products.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(products)
    }

    async fn get_product(&self, id: &ProductId) -> Result<Option<Product>, RepositoryError> {
        self.check()?;
        Ok(self.docs.read().await.products.get(id).cloned())
    }

    async fn put_product(&self, product: &Product) -> Result<(), RepositoryError> {
        self.check()?;
        self.docs
            .write()
            .await
            .products
            .insert(product.id.clone(), product.clone());
        Ok(())
    }

    async fn update_product(
        &self,
        id: &ProductId,
        patch: &ProductPatch,
        at: DateTime<Utc>,
    ) -> Result<(), RepositoryError> {
        self.check()?;
        let mut docs = self.docs.write().await;
        let product = docs.products.get_mut(id).ok_or(RepositoryError::NotFound)?;
        patch.apply(product, at);
        Ok(())
    }

    async fn delete_product(&self, id: &ProductId) -> Result<(), RepositoryError> {
        self.check()?;
        self.docs
            .write()
            .await
            .products
            .remove(id)
            .map(|_| ())
            .ok_or(RepositoryError::NotFound)
    }

    async fn list_users(&self) -> Result<Vec<User>, RepositoryError> {
        self.check()?;
        let docs = self.docs.read().await;
        let mut users: Vec<User> = docs.users.values().cloned().collect();
        users.sort_by(|a, b| {
            let by_created = match (&a.created_at, &b.created_at) {
                (Some(x), Some(y)) => x.cmp(y),
                (Some(_), None) => std::cmp::Ordering::Less,
                (None, Some(_)) => std::cmp::Ordering::Greater,
                (None, None) => std::cmp::Ordering::Equal,
            };
            by_created.then_with(|| a.id.cmp(&b.id))
        });
        Ok(users)
    }

    async fn put_user(&self, user: &User) -> Result<(), RepositoryError> {
        self.check()?;
        self.docs
            .write()
            .await
            .users
            .insert(user.id.clone(), user.clone());
        Ok(())
    }

    async fn load_settings(&self) -> Result<Option<StoreSettings>, RepositoryError> {
        self.check()?;
        Ok(self.docs.read().await.settings.clone())
    }

    async fn save_settings(&self, settings: &StoreSettings) -> Result<(), RepositoryError> {
        self.check()?;
        self.docs.write().await.settings = Some(settings.clone());
        Ok(())
    }

    async fn append_email_log(&self, entry: &EmailLog) -> Result<(), RepositoryError> {
        self.check()?;
        if self.reject_email_logs.load(Ordering::SeqCst) {
            return Err(unavailable());
        }
        self.docs.write().await.email_logs.push(entry.clone());
        Ok(())
    }

    async fn recent_email_logs(&self, limit: usize) -> Result<Vec<EmailLog>, RepositoryError> {
        self.check()?;
        let docs = self.docs.read().await;
        let mut logs = docs.email_logs.clone();
        logs.sort_by(|a, b| b.sent_at.cmp(&a.sent_at));
        logs.truncate(limit);
        Ok(logs)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use sareine_core::{Amount, EmailKind};

    use super::*;

    fn order(id: &str, status: OrderStatus, created: Option<i64>) -> Order {
        serde_json::from_value(serde_json::json!({
            "id": id,
            "customerName": "Kavya",
            "customerEmail": "kavya@example.in",
            "amount": 500,
            "status": status.as_str(),
        }))
        .map(|mut o: Order| {
            o.created_at = created.and_then(|s| DateTime::from_timestamp(s, 0));
            o
        })
        .unwrap()
    }

    #[tokio::test]
    async fn test_list_orders_newest_first_missing_last() {
        let store = MemoryStore::new();
        store.put_order(&order("a", OrderStatus::Paid, Some(100))).await.unwrap();
        store.put_order(&order("b", OrderStatus::Paid, None)).await.unwrap();
        store.put_order(&order("c", OrderStatus::Delivered, Some(300))).await.unwrap();

        let ids: Vec<String> = store
            .list_orders(None)
            .await
            .unwrap()
            .into_iter()
            .map(|o| o.id.into_inner())
            .collect();
        assert_eq!(ids, ["c", "a", "b"]);

        let paid = store.list_orders(Some(OrderStatus::Paid)).await.unwrap();
        assert_eq!(paid.len(), 2);
    }

    #[tokio::test]
    async fn test_set_status_missing_is_not_found() {
        let store = MemoryStore::new();
        let err = store
            .set_order_status(&OrderId::new("nope"), OrderStatus::Dispatched, Utc::now())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_set_status_stamps_updated_at() {
        let store = MemoryStore::new();
        store.put_order(&order("a", OrderStatus::Paid, Some(100))).await.unwrap();
        let at = DateTime::from_timestamp(1_000, 0).unwrap();
        store
            .set_order_status(&OrderId::new("a"), OrderStatus::Dispatched, at)
            .await
            .unwrap();

        let stored = store.get_order(&OrderId::new("a")).await.unwrap().unwrap();
        assert_eq!(stored.status, OrderStatus::Dispatched);
        assert_eq!(stored.updated_at, Some(at));
        assert_eq!(stored.amount, Amount::from_rupees(500));
    }

    #[tokio::test]
    async fn test_recent_email_logs_limit() {
        let store = MemoryStore::new();
        for i in 0..5 {
            let mut entry = EmailLog::new(EmailKind::Custom, "a@b.in", "hi", true, None);
            entry.sent_at = DateTime::from_timestamp(i, 0).unwrap();
            store.append_email_log(&entry).await.unwrap();
        }
        let logs = store.recent_email_logs(3).await.unwrap();
        assert_eq!(logs.len(), 3);
        assert_eq!(logs[0].sent_at.timestamp(), 4);
    }

    #[tokio::test]
    async fn test_offline_store_fails_ping() {
        let store = MemoryStore::new();
        assert!(store.ping().await.is_ok());
        store.set_offline(true);
        assert!(store.ping().await.is_err());
        assert!(store.list_products().await.is_err());
    }
}
