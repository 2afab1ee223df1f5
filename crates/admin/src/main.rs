//! Sareine Admin - store administration dashboard.
//!
//! This binary serves the admin panel on port 3001.
//!
//! # Architecture
//!
//! - Axum web framework
//! - Askama templates for server-side rendering
//! - `PostgreSQL` document store for orders, preorders, products and users
//! - SMTP (lettre) for transactional and promotional email
//! - Razorpay for preorder payment links
//!
//! # Security
//!
//! Access requires the shared `ADMIN_SECRET`, either through the login form
//! (server-side session) or the `X-Admin-Secret` header.

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::sync::Arc;

use sareine_admin::config::AdminConfig;
use sareine_admin::db::{self, PgStore, Store};
use sareine_admin::middleware::create_session_layer;
use sareine_admin::services::email::{Mailer, SmtpMailer, UnconfiguredMailer};
use sareine_admin::services::{PaymentGateway, RazorpayClient};
use sareine_admin::state::AppState;
use sentry::integrations::tracing as sentry_tracing;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize Sentry error tracking and return guard that must be kept alive.
fn init_sentry(config: &AdminConfig) -> Option<sentry::ClientInitGuard> {
    let dsn = config.sentry_dsn.as_ref()?;

    let guard = sentry::init((
        dsn.as_str(),
        sentry::ClientOptions {
            release: sentry::release_name!(),
            environment: config
                .sentry_environment
                .clone()
                .map(std::borrow::Cow::Owned),
            sample_rate: config.sentry_sample_rate,
            traces_sample_rate: config.sentry_traces_sample_rate,
            attach_stacktrace: true,
            send_default_pii: true, // Admin panel can include PII for debugging
            ..Default::default()
        },
    ));

    tracing::info!("Sentry initialized");
    Some(guard)
}

/// Filter tracing events to Sentry event types.
fn sentry_event_filter(metadata: &tracing::Metadata<'_>) -> sentry_tracing::EventFilter {
    match *metadata.level() {
        tracing::Level::ERROR | tracing::Level::WARN => sentry_tracing::EventFilter::Event,
        tracing::Level::INFO | tracing::Level::DEBUG => sentry_tracing::EventFilter::Breadcrumb,
        _ => sentry_tracing::EventFilter::Ignore,
    }
}

/// SMTP mailer when credentials are set, otherwise one that names what is missing.
fn build_mailer(config: &AdminConfig) -> Arc<dyn Mailer> {
    let Some(email) = &config.email else {
        tracing::warn!(missing = ?config.email_missing, "SMTP not configured; emails will fail");
        return Arc::new(UnconfiguredMailer::new(config.email_missing.clone()));
    };

    match SmtpMailer::new(email) {
        Ok(mailer) => {
            tracing::info!(host = %email.smtp_host, port = email.smtp_port, "SMTP mailer ready");
            Arc::new(mailer)
        }
        Err(e) => {
            tracing::error!(error = %e, "Invalid SMTP configuration; emails will fail");
            Arc::new(UnconfiguredMailer::new(vec!["SMTP_FROM"]))
        }
    }
}

/// Razorpay client when both keys are set.
fn build_gateway(config: &AdminConfig) -> Option<Arc<dyn PaymentGateway>> {
    let Some(razorpay) = config.razorpay() else {
        tracing::warn!("Razorpay not configured; payment links are disabled");
        return None;
    };

    match RazorpayClient::new(razorpay) {
        Ok(client) => Some(Arc::new(client)),
        Err(e) => {
            tracing::error!(error = %e, "Failed to build Razorpay client");
            None
        }
    }
}

#[tokio::main]
async fn main() {
    // Load configuration from environment (needed for Sentry init)
    let config = AdminConfig::from_env().expect("Failed to load configuration");

    // Initialize Sentry (must be done before tracing subscriber)
    let _sentry_guard = init_sentry(&config);

    // Initialize tracing with EnvFilter and Sentry integration
    // Defaults to info level for our crate if RUST_LOG is not set
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sareine_admin=info,tower_http=debug".into());

    // Use JSON format on Fly.io for structured log parsing, text format locally
    let is_fly = std::env::var("FLY_APP_NAME").is_ok();
    let json_layer = is_fly.then(|| tracing_subscriber::fmt::layer().json().flatten_event(true));
    let text_layer = (!is_fly).then(tracing_subscriber::fmt::layer);

    tracing_subscriber::registry()
        .with(env_filter)
        .with(json_layer)
        .with(text_layer)
        .with(sentry_tracing::layer().event_filter(sentry_event_filter))
        .init();

    // Initialize database connection pool
    let pool = db::create_pool(&config.database_url)
        .await
        .expect("Failed to create database pool");
    tracing::info!("Database pool created");

    // NOTE: Migrations are NOT run automatically on startup.
    // Run them explicitly via: cargo run -p sareine-cli -- migrate

    // Create session layer (PostgreSQL-backed with SameSite=Strict)
    let session_layer = create_session_layer(&pool, &config);

    let store: Arc<dyn Store> = Arc::new(PgStore::new(pool));
    let mailer = build_mailer(&config);
    let gateway = build_gateway(&config);
    let state = AppState::new(config.clone(), store, mailer, gateway);

    let app = sareine_admin::build_app(state, session_layer);

    // Start server
    let addr = config.socket_addr();
    tracing::info!("admin listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .expect("Failed to bind to address");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("Server error");
}

/// Wait for shutdown signal (Ctrl+C or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        tokio::signal::ctrl_c()
            .await
            .expect("Failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate())
            .expect("Failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received, starting graceful shutdown");
}
