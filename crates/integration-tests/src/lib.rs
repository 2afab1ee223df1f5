//! Integration tests for the Sareine admin dashboard.
//!
//! Tests drive the complete router in-process: the same routes, session
//! layer and security headers as production, backed by [`MemoryStore`],
//! [`MemoryMailer`] and [`StubGateway`].
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p sareine-integration-tests
//! ```

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Request, Response, StatusCode, header};
use hmac::{Hmac, Mac};
use secrecy::SecretString;
use sha2::Sha256;
use tower::ServiceExt;

use sareine_admin::config::AdminConfig;
use sareine_admin::db::{MemoryStore, Store};
use sareine_admin::middleware::{ADMIN_SECRET_HEADER, session_layer};
use sareine_admin::services::email::{Mailer, MemoryMailer};
use sareine_admin::services::payments::{
    PaymentError, PaymentGateway, PaymentLink, PaymentLinkRequest,
};
use sareine_admin::state::AppState;

/// Admin secret every test app is configured with.
pub const ADMIN_SECRET: &str = "integration-secret-0123456789abcdef";

/// Webhook secret every test app is configured with.
pub const WEBHOOK_SECRET: &str = "whsec_integration";

/// Gateway that hands out predictable links and remembers every request.
#[derive(Debug, Default)]
pub struct StubGateway {
    created: AtomicUsize,
    requests: std::sync::Mutex<Vec<PaymentLinkRequest>>,
}

impl StubGateway {
    /// Requests received so far.
    ///
    /// # Panics
    ///
    /// Panics if the request log mutex was poisoned by a panicking test.
    #[must_use]
    #[allow(clippy::unwrap_used)]
    pub fn requests(&self) -> Vec<PaymentLinkRequest> {
        self.requests.lock().unwrap().clone()
    }
}

#[async_trait]
impl PaymentGateway for StubGateway {
    #[allow(clippy::unwrap_used)]
    async fn create_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, PaymentError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        self.requests.lock().unwrap().push(request.clone());
        Ok(PaymentLink {
            id: format!("plink_test_{n}"),
            short_url: format!("https://rzp.io/i/test{n}"),
            status: "created".to_string(),
        })
    }
}

/// A fully wired app plus handles on its test doubles.
pub struct TestApp {
    pub router: Router,
    pub store: MemoryStore,
    pub mailer: MemoryMailer,
    pub gateway: Arc<StubGateway>,
}

impl TestApp {
    /// App with a payment gateway and webhook secret configured.
    #[must_use]
    pub fn new() -> Self {
        Self::build(true)
    }

    /// App without payment credentials.
    #[must_use]
    pub fn without_gateway() -> Self {
        Self::build(false)
    }

    fn build(with_gateway: bool) -> Self {
        let mut config = AdminConfig::for_tests(ADMIN_SECRET);
        if with_gateway {
            config.razorpay_webhook_secret = Some(SecretString::from(WEBHOOK_SECRET));
        }

        let store = MemoryStore::new();
        let mailer = MemoryMailer::new();
        let gateway = Arc::new(StubGateway::default());

        let payments: Option<Arc<dyn PaymentGateway>> = if with_gateway {
            Some(gateway.clone())
        } else {
            None
        };
        let shared_store: Arc<dyn Store> = Arc::new(store.clone());
        let shared_mailer: Arc<dyn Mailer> = Arc::new(mailer.clone());
        let state = AppState::new(config, shared_store, shared_mailer, payments);

        let sessions = session_layer(tower_sessions::MemoryStore::default(), false);
        let router = sareine_admin::build_app(state, sessions);

        Self {
            router,
            store,
            mailer,
            gateway,
        }
    }

    /// Send one request through the router.
    ///
    /// # Panics
    ///
    /// Panics if the router itself fails, which only happens on a broken build.
    pub async fn send(&self, request: Request<Body>) -> Response<Body> {
        self.router
            .clone()
            .oneshot(request)
            .await
            .unwrap_or_else(|never| match never {})
    }

    /// Authenticated GET.
    pub async fn get(&self, path: &str) -> Response<Body> {
        self.send(authed(Request::get(path)).body(Body::empty()).expect("valid request"))
            .await
    }

    /// Authenticated POST with a JSON body.
    pub async fn post_json(&self, path: &str, body: &serde_json::Value) -> Response<Body> {
        self.send(
            authed(Request::post(path))
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .expect("valid request"),
        )
        .await
    }

    /// POST a urlencoded form with the given cookie (or none).
    pub async fn post_form(&self, path: &str, form: &str, cookie: Option<&str>) -> Response<Body> {
        let mut builder =
            Request::post(path).header(header::CONTENT_TYPE, "application/x-www-form-urlencoded");
        if let Some(cookie) = cookie {
            builder = builder.header(header::COOKIE, cookie);
        }
        self.send(builder.body(Body::from(form.to_string())).expect("valid request"))
            .await
    }

    /// Log in through the form and return the session cookie pair.
    ///
    /// # Panics
    ///
    /// Panics if the login does not set a session cookie.
    pub async fn login(&self) -> String {
        let response = self
            .post_form("/login", &format!("secret={ADMIN_SECRET}"), None)
            .await;
        assert_eq!(response.status(), StatusCode::SEE_OTHER);
        session_cookie(&response).unwrap_or_else(|| panic!("login set no session cookie"))
    }
}

impl Default for TestApp {
    fn default() -> Self {
        Self::new()
    }
}

fn authed(builder: axum::http::request::Builder) -> axum::http::request::Builder {
    builder.header(ADMIN_SECRET_HEADER, ADMIN_SECRET)
}

/// `name=value` of the session cookie set by a response.
#[must_use]
pub fn session_cookie(response: &Response<Body>) -> Option<String> {
    response
        .headers()
        .get_all(header::SET_COOKIE)
        .iter()
        .filter_map(|v| v.to_str().ok())
        .find(|v| v.starts_with(sareine_admin::middleware::SESSION_COOKIE_NAME))
        .and_then(|v| v.split(';').next())
        .map(ToString::to_string)
}

/// Redirect target of a response.
#[must_use]
pub fn location(response: &Response<Body>) -> Option<&str> {
    response
        .headers()
        .get(header::LOCATION)
        .and_then(|v| v.to_str().ok())
}

/// Read a response body as JSON.
///
/// # Panics
///
/// Panics if the body is not valid JSON.
pub async fn json_body(response: Response<Body>) -> serde_json::Value {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    serde_json::from_slice(&bytes)
        .unwrap_or_else(|e| panic!("invalid JSON body {:?}: {e}", String::from_utf8_lossy(&bytes)))
}

/// Read a response body as text.
pub async fn text_body(response: Response<Body>) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap_or_default();
    String::from_utf8_lossy(&bytes).into_owned()
}

/// Hex HMAC-SHA256 of `body` under [`WEBHOOK_SECRET`].
///
/// # Panics
///
/// Never in practice; HMAC accepts keys of any length.
#[must_use]
#[allow(clippy::unwrap_used)]
pub fn sign_webhook(body: &[u8]) -> String {
    let mut mac = Hmac::<Sha256>::new_from_slice(WEBHOOK_SECRET.as_bytes()).unwrap();
    mac.update(body);
    hex::encode(mac.finalize().into_bytes())
}
