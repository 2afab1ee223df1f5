//! Application state shared across handlers.

use std::sync::Arc;

use crate::config::AdminConfig;
use crate::db::Store;
use crate::services::{EmailService, Mailer, PaymentGateway};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: AdminConfig,
    store: Arc<dyn Store>,
    email: EmailService,
    payments: Option<Arc<dyn PaymentGateway>>,
}

impl AppState {
    /// Assemble state from its collaborators.
    ///
    /// `payments` is `None` when gateway credentials are not configured.
    #[must_use]
    pub fn new(
        config: AdminConfig,
        store: Arc<dyn Store>,
        mailer: Arc<dyn Mailer>,
        payments: Option<Arc<dyn PaymentGateway>>,
    ) -> Self {
        let email = EmailService::new(Arc::clone(&store), mailer, config.storefront_url.clone());
        Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                email,
                payments,
            }),
        }
    }

    #[must_use]
    pub fn config(&self) -> &AdminConfig {
        &self.inner.config
    }

    /// The document store.
    #[must_use]
    pub fn store(&self) -> &dyn Store {
        self.inner.store.as_ref()
    }

    #[must_use]
    pub fn email(&self) -> &EmailService {
        &self.inner.email
    }

    /// The payment gateway, if configured.
    #[must_use]
    pub fn payments(&self) -> Option<&dyn PaymentGateway> {
        self.inner.payments.as_deref()
    }
}

impl std::fmt::Debug for AppState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("AppState")
            .field("config", &self.inner.config)
            .field("email", &self.inner.email)
            .field("payments", &self.inner.payments.is_some())
            .finish_non_exhaustive()
    }
}
