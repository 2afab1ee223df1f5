//! HTTP route handlers for admin.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                         - Liveness
//! GET  /health/ready                   - Readiness (store ping)
//!
//! # Auth (shared admin secret)
//! GET  /login                          - Login page
//! POST /login                          - Check secret, start session
//! POST /logout                         - End session
//!
//! # Overview
//! GET  /                               - Dashboard
//!
//! # Management
//! GET  /orders                         - Orders with status filter and search
//! POST /orders/{id}/status             - Change order status
//! GET  /preorders                      - Preorders with status counts
//! POST /preorders/{id}/status          - Change preorder status
//! POST /preorders/{id}/payment-link    - Create and email a payment link
//! GET  /products                       - Product list and create form
//! POST /products                       - Create product
//! GET  /products/{id}/edit             - Edit form
//! POST /products/{id}                  - Update product
//! POST /products/{id}/delete           - Delete product
//! GET  /customers                      - Customers with order aggregates
//!
//! # Communication
//! GET  /emails                         - Compose forms and email log
//! POST /emails/custom                  - Send one custom email
//! POST /emails/promotional             - Send a promotional email
//!
//! # System
//! GET  /settings                       - Settings form
//! POST /settings                       - Save settings
//!
//! # JSON API
//! /api/...                             - See [`api`]
//! ```

pub mod api;
pub mod auth;
pub mod customers;
pub mod dashboard;
pub mod emails;
pub mod health;
pub mod orders;
pub mod preorders;
pub mod products;
pub mod settings;

use askama::Template;
use axum::{
    Router,
    response::{Html, Redirect},
};
use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::AppError;
use crate::state::AppState;

/// Build the full application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .merge(health::router())
        .merge(auth::router())
        .merge(dashboard::router())
        .merge(orders::router())
        .merge(preorders::router())
        .merge(products::router())
        .merge(customers::router())
        .merge(emails::router())
        .merge(settings::router())
        .merge(api::router())
}

/// `?success=` / `?error=` set by form redirects.
#[derive(Debug, Default, Deserialize)]
pub struct FlashQuery {
    pub success: Option<String>,
    pub error: Option<String>,
}

/// Render a page, logging and hiding template failures.
pub(crate) fn render(template: &impl Template) -> Html<String> {
    Html(template.render().unwrap_or_else(|e| {
        tracing::error!("Template render error: {}", e);
        "Internal Server Error".to_string()
    }))
}

fn flash_redirect(path: &str, key: &str, message: &str) -> Redirect {
    let encoded: String = url::form_urlencoded::byte_serialize(message.as_bytes()).collect();
    Redirect::to(&format!("{path}?{key}={encoded}"))
}

/// Redirect back to `path` with a success message.
pub(crate) fn redirect_success(path: &str, message: &str) -> Redirect {
    flash_redirect(path, "success", message)
}

/// Redirect back to `path` with the error's public message.
pub(crate) fn redirect_error(path: &str, err: &AppError) -> Redirect {
    if err.status().is_server_error() {
        tracing::error!(error = %err, path, "Form action failed");
    } else {
        tracing::warn!(error = %err, path, "Form action rejected");
    }
    flash_redirect(path, "error", &err.public_message())
}

/// Display format for timestamps in tables.
pub(crate) fn format_timestamp(at: Option<&DateTime<Utc>>) -> String {
    at.map_or_else(|| "—".to_string(), |t| t.format("%d %b %Y, %H:%M").to_string())
}

/// Option in a status `<select>`.
#[derive(Debug, Clone)]
pub struct StatusOption {
    pub value: &'static str,
    pub label: String,
    pub selected: bool,
}

impl StatusOption {
    /// One option per tag, marking `current` as selected.
    pub(crate) fn all(tags: impl IntoIterator<Item = &'static str>, current: &str) -> Vec<Self> {
        tags.into_iter()
            .map(|value| Self {
                value,
                label: value.replace('_', " "),
                selected: value == current,
            })
            .collect()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use axum::response::IntoResponse;

    use super::*;

    #[test]
    fn test_flash_redirect_encodes_message() {
        let response = redirect_success("/orders", "Order status updated").into_response();
        assert_eq!(
            response.headers()["location"],
            "/orders?success=Order+status+updated"
        );
    }

    #[test]
    fn test_redirect_error_hides_database_details() {
        let err = AppError::Database(crate::db::RepositoryError::DataCorruption(
            "bad row".to_string(),
        ));
        let response = redirect_error("/products", &err).into_response();
        assert_eq!(
            response.headers()["location"],
            "/products?error=Internal+server+error"
        );
    }

    #[test]
    fn test_format_timestamp() {
        let at = DateTime::from_timestamp(1_767_225_600, 0).unwrap();
        assert_eq!(format_timestamp(Some(&at)), "01 Jan 2026, 00:00");
        assert_eq!(format_timestamp(None), "—");
    }

    #[test]
    fn test_status_options_mark_current() {
        let options = StatusOption::all(["paid", "payment_link_sent"], "payment_link_sent");
        assert!(!options[0].selected);
        assert!(options[1].selected);
        assert_eq!(options[1].label, "payment link sent");
    }
}
