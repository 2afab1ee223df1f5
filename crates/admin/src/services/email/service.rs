//! Email sending with sender settings and the email log.

use std::sync::Arc;

use sareine_core::{Amount, EmailKind, OrderStatus};
use tracing::instrument;

use super::{EmailError, Mailer, OutgoingEmail, RenderedEmail, templates};
use crate::db::Store;
use crate::models::{EmailLog, Order, Preorder, StoreSettings};

/// Data for a payment-link email.
#[derive(Debug, Clone)]
pub struct PaymentLinkEmail {
    pub customer_name: String,
    pub customer_email: String,
    /// Human preorder reference shown in the subject.
    pub preorder_ref: String,
    pub amount: Amount,
    pub payment_link: String,
}

/// An announcement sent to many customers.
#[derive(Debug, Clone, Default)]
pub struct PromotionalEmail {
    pub subject: Option<String>,
    pub heading: Option<String>,
    pub body_text: String,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    /// Explicit recipients; empty means every customer with an email.
    pub recipients: Vec<String>,
}

pub const DEFAULT_PROMO_SUBJECT: &str = "News from Sareine";
pub const DEFAULT_PROMO_HEADING: &str = "Hello from Sareine";

/// Result of a bulk send.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PromotionalOutcome {
    pub sent: usize,
    pub total: usize,
}

impl PromotionalOutcome {
    #[must_use]
    pub fn message(&self) -> String {
        format!("Sent to {}/{} recipients", self.sent, self.total)
    }
}

/// Renders, addresses and delivers emails.
#[derive(Clone)]
pub struct EmailService {
    store: Arc<dyn Store>,
    mailer: Arc<dyn Mailer>,
    storefront_url: String,
}

impl std::fmt::Debug for EmailService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailService")
            .field("configured", &self.mailer.is_configured())
            .field("storefront_url", &self.storefront_url)
            .finish_non_exhaustive()
    }
}

impl EmailService {
    #[must_use]
    pub fn new(store: Arc<dyn Store>, mailer: Arc<dyn Mailer>, storefront_url: impl Into<String>) -> Self {
        Self {
            store,
            mailer,
            storefront_url: storefront_url.into(),
        }
    }

    /// Whether the mailer can deliver at all.
    #[must_use]
    pub fn is_configured(&self) -> bool {
        self.mailer.is_configured()
    }

    /// From display name from settings, or the default when unreadable.
    async fn sender_name(&self) -> String {
        match self.store.load_settings().await {
            Ok(settings) => settings
                .unwrap_or_default()
                .sender_display_name()
                .to_string(),
            Err(e) => {
                tracing::warn!(error = %e, "Failed to load settings, using default sender name");
                StoreSettings::default().sender_display_name().to_string()
            }
        }
    }

    async fn deliver(&self, to: &str, rendered: RenderedEmail) -> Result<(), EmailError> {
        let from_name = self.sender_name().await;
        let email = OutgoingEmail::new(to, from_name, rendered);
        self.mailer.send(&email).await
    }

    /// Append an entry to the email log. Failures are logged and ignored.
    pub async fn record(
        &self,
        kind: EmailKind,
        recipient: &str,
        subject: &str,
        result: &Result<(), EmailError>,
    ) {
        let entry = EmailLog::new(
            kind,
            recipient,
            subject,
            result.is_ok(),
            result.as_ref().err().map(ToString::to_string),
        );
        if let Err(e) = self.store.append_email_log(&entry).await {
            tracing::warn!(error = %e, kind = %kind, "Failed to write email log");
        }
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn send_order_confirmation(&self, order: &Order) -> Result<(), EmailError> {
        self.deliver(order.contact_email(), templates::order_confirmation(order)?)
            .await
    }

    #[instrument(skip(self, preorder), fields(preorder_id = %preorder.id))]
    pub async fn send_preorder_confirmation(&self, preorder: &Preorder) -> Result<(), EmailError> {
        self.deliver(
            preorder.contact_email(),
            templates::preorder_confirmation(preorder)?,
        )
        .await
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn send_dispatch(&self, order: &Order) -> Result<(), EmailError> {
        self.deliver(order.contact_email(), templates::dispatch(order)?)
            .await
    }

    #[instrument(skip(self, order), fields(order_id = %order.id))]
    pub async fn send_delivery(&self, order: &Order) -> Result<(), EmailError> {
        self.deliver(order.contact_email(), templates::delivery(order)?)
            .await
    }

    #[instrument(skip(self, data), fields(preorder_ref = %data.preorder_ref))]
    pub async fn send_payment_link(&self, data: &PaymentLinkEmail) -> Result<(), EmailError> {
        let rendered = templates::payment_link(
            &data.customer_name,
            &data.preorder_ref,
            data.amount,
            &data.payment_link,
        )?;
        self.deliver(&data.customer_email, rendered).await
    }

    #[instrument(skip(self))]
    pub async fn send_welcome(&self, to: &str, customer_name: &str) -> Result<(), EmailError> {
        self.deliver(to, templates::welcome(customer_name, &self.storefront_url)?)
            .await
    }

    #[instrument(skip(self, body_text))]
    pub async fn send_custom(
        &self,
        to: &str,
        subject: &str,
        heading: &str,
        body_text: &str,
    ) -> Result<(), EmailError> {
        self.deliver(to, templates::custom(subject, heading, body_text)?)
            .await
    }

    /// Send one announcement to each recipient in turn.
    ///
    /// Individual delivery failures are counted, not returned.
    ///
    /// # Errors
    ///
    /// Returns an error if the template fails to render or the customer
    /// list cannot be loaded.
    #[instrument(skip(self, promo), fields(explicit = promo.recipients.len()))]
    pub async fn send_promotional(
        &self,
        promo: &PromotionalEmail,
    ) -> Result<PromotionalOutcome, EmailError> {
        let subject = promo
            .subject
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PROMO_SUBJECT);
        let heading = promo
            .heading
            .as_deref()
            .filter(|s| !s.is_empty())
            .unwrap_or(DEFAULT_PROMO_HEADING);
        let cta = match (promo.cta_text.as_deref(), promo.cta_url.as_deref()) {
            (Some(text), Some(url)) if !text.is_empty() && !url.is_empty() => Some((text, url)),
            _ => None,
        };
        let rendered = templates::promotional(subject, heading, &promo.body_text, cta)?;

        let recipients = if promo.recipients.is_empty() {
            self.store
                .list_users()
                .await?
                .into_iter()
                .filter_map(|u| u.email.filter(|e| !e.trim().is_empty()))
                .collect()
        } else {
            promo.recipients.clone()
        };

        let from_name = self.sender_name().await;
        let mut sent = 0;
        for to in &recipients {
            let email = OutgoingEmail::new(to, from_name.as_str(), rendered.clone());
            match self.mailer.send(&email).await {
                Ok(()) => sent += 1,
                Err(e) => tracing::warn!(to = %to, error = %e, "Promotional email failed"),
            }
        }

        let outcome = PromotionalOutcome {
            sent,
            total: recipients.len(),
        };
        tracing::info!(sent = outcome.sent, total = outcome.total, "Promotional email sent");
        Ok(outcome)
    }

    /// Send the email that goes with a new order status, if any, and log it.
    ///
    /// Only `dispatched` and `delivered` have an email; other statuses
    /// return `None`.
    pub async fn notify_order_status(
        &self,
        order: &Order,
        status: OrderStatus,
    ) -> Option<Result<(), EmailError>> {
        let (kind, result) = match status {
            OrderStatus::Dispatched => (EmailKind::Dispatch, self.send_dispatch(order).await),
            OrderStatus::Delivered => (EmailKind::Delivery, self.send_delivery(order).await),
            OrderStatus::Paid | OrderStatus::Cancelled => return None,
        };
        let subject = match kind {
            EmailKind::Dispatch => "Your Order Has Been Shipped — Sareine",
            _ => "Your Order Has Been Delivered — Sareine",
        };
        self.record(kind, order.contact_email(), subject, &result).await;
        Some(result)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::MemoryStore;
    use crate::models::User;
    use crate::services::email::MemoryMailer;

    fn service() -> (EmailService, MemoryStore, MemoryMailer) {
        let store = MemoryStore::new();
        let mailer = MemoryMailer::new();
        let service = EmailService::new(
            Arc::new(store.clone()),
            Arc::new(mailer.clone()),
            "https://sareine.in",
        );
        (service, store, mailer)
    }

    fn order() -> Order {
        serde_json::from_value(serde_json::json!({
            "id": "ord_1",
            "customerName": "Ananya",
            "customerEmail": "ananya@example.in",
            "amount": 799,
            "status": "paid",
            "items": [{"name": "Saffron Glow", "price": 799, "quantity": 1}]
        }))
        .unwrap()
    }

    #[tokio::test]
    async fn test_sender_name_comes_from_settings() {
        let (service, store, mailer) = service();
        let settings = StoreSettings {
            sender_name: "Sareine Atelier".to_string(),
            ..StoreSettings::default()
        };
        store.save_settings(&settings).await.unwrap();

        service.send_welcome("new@example.in", "Tara").await.unwrap();

        let sent = mailer.sent().await;
        assert_eq!(sent[0].from_name, "Sareine Atelier");
        assert_eq!(sent[0].subject, "Welcome to Sareine 💛");
    }

    #[tokio::test]
    async fn test_default_sender_name() {
        let (service, _, mailer) = service();
        service.send_custom("a@example.in", "Hi", "Hello", "Body").await.unwrap();
        assert_eq!(mailer.sent().await[0].from_name, "Sareine");
    }

    #[tokio::test]
    async fn test_notify_order_status_sends_and_logs() {
        let (service, store, mailer) = service();

        let result = service
            .notify_order_status(&order(), OrderStatus::Dispatched)
            .await;
        assert!(matches!(result, Some(Ok(()))));
        assert_eq!(mailer.sent().await[0].to, "ananya@example.in");

        let logs = store.recent_email_logs(10).await.unwrap();
        assert_eq!(logs.len(), 1);
        assert_eq!(logs[0].kind, EmailKind::Dispatch);
        assert!(logs[0].success);
    }

    #[tokio::test]
    async fn test_notify_order_status_ignores_other_statuses() {
        let (service, store, mailer) = service();
        assert!(
            service
                .notify_order_status(&order(), OrderStatus::Cancelled)
                .await
                .is_none()
        );
        assert!(mailer.sent().await.is_empty());
        assert!(store.recent_email_logs(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_is_logged_with_error() {
        let (service, store, mailer) = service();
        mailer.fail_for("ananya@example.in").await;

        let result = service
            .notify_order_status(&order(), OrderStatus::Delivered)
            .await
            .unwrap();
        assert!(result.is_err());

        let logs = store.recent_email_logs(10).await.unwrap();
        assert!(!logs[0].success);
        assert!(logs[0].error.as_deref().unwrap().contains("ananya@example.in"));
    }

    #[tokio::test]
    async fn test_log_write_failure_is_ignored() {
        let (service, store, _) = service();
        store.set_reject_email_logs(true);
        service
            .record(EmailKind::Custom, "a@example.in", "Hi", &Ok(()))
            .await;
        store.set_reject_email_logs(false);
        assert!(store.recent_email_logs(10).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_promotional_defaults_to_all_users_with_email() {
        let (service, store, mailer) = service();
        for (id, email) in [("u1", Some("one@example.in")), ("u2", None), ("u3", Some("three@example.in"))] {
            let user: User = serde_json::from_value(serde_json::json!({
                "id": id,
                "email": email,
            }))
            .unwrap();
            store.put_user(&user).await.unwrap();
        }
        mailer.fail_for("three@example.in").await;

        let outcome = service
            .send_promotional(&PromotionalEmail {
                body_text: "Our Diwali edit is here.".to_string(),
                ..PromotionalEmail::default()
            })
            .await
            .unwrap();

        assert_eq!(outcome, PromotionalOutcome { sent: 1, total: 2 });
        assert_eq!(outcome.message(), "Sent to 1/2 recipients");
        let sent = mailer.sent().await;
        assert_eq!(sent[0].subject, DEFAULT_PROMO_SUBJECT);
        assert!(sent[0].html.contains(DEFAULT_PROMO_HEADING));
    }

    #[tokio::test]
    async fn test_promotional_explicit_recipients() {
        let (service, _, mailer) = service();
        let outcome = service
            .send_promotional(&PromotionalEmail {
                subject: Some("Launch".to_string()),
                body_text: "New shade".to_string(),
                recipients: vec!["x@example.in".to_string()],
                ..PromotionalEmail::default()
            })
            .await
            .unwrap();
        assert_eq!(outcome.total, 1);
        assert_eq!(mailer.sent().await[0].subject, "Launch");
    }
}
