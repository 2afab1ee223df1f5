//! JSON API for the dashboard.
//!
//! # Route Structure
//!
//! ```text
//! GET  /api/admin/orders/list                 - Orders, optional status/search
//! POST /api/admin/orders/update-status        - Set order status, optional email
//! GET  /api/admin/preorders/list              - Preorders
//! POST /api/admin/preorders/update-status     - Set preorder status
//! POST /api/admin/preorders/send-payment-link - Create link, email it, record it
//! GET  /api/admin/products/list               - Products
//! POST /api/admin/products/create             - Create product
//! POST /api/admin/products/update             - Partial product update
//! POST /api/admin/products/delete             - Delete product
//! GET  /api/admin/customers/list              - Users with order aggregates
//! GET  /api/admin/settings                    - Store settings
//! POST /api/admin/settings                    - Replace store settings
//! GET  /api/admin/stats                       - Dashboard statistics
//! POST /api/admin/emails/send                 - Send one templated email
//! GET  /api/admin/emails/log                  - Recent email log
//! GET  /api/admin/diagnostics                 - Integration status
//! POST /api/razorpay/create-payment-link      - Create a payment link
//! POST /api/razorpay/webhook                  - Gateway events (signed, no session)
//! ```
//!
//! Every route except the webhook requires [`RequireAdminAuth`].
//!
//! [`RequireAdminAuth`]: crate::middleware::RequireAdminAuth

pub mod customers;
pub mod diagnostics;
pub mod emails;
pub mod orders;
pub mod payments;
pub mod preorders;
pub mod products;
pub mod settings;
pub mod stats;

use axum::Router;
use axum::extract::FromRequest;
use serde::Serialize;

use crate::error::AppError;
use crate::state::AppState;

/// JSON request body. Malformed bodies are answered as 400 `{ "error" }`
/// instead of axum's plain-text rejection.
#[derive(Debug, FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Build the API router.
pub fn router() -> Router<AppState> {
    Router::new()
        .merge(orders::router())
        .merge(preorders::router())
        .merge(products::router())
        .merge(customers::router())
        .merge(settings::router())
        .merge(stats::router())
        .merge(emails::router())
        .merge(payments::router())
        .merge(diagnostics::router())
}

/// `{ "success": true }`.
#[derive(Debug, Serialize)]
pub struct SuccessResponse {
    pub success: bool,
}

impl SuccessResponse {
    #[must_use]
    pub const fn ok() -> Self {
        Self { success: true }
    }
}

/// Trimmed, non-empty value or a 400 with `message`.
pub(crate) fn required(value: Option<String>, message: &str) -> Result<String, AppError> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .ok_or_else(|| AppError::BadRequest(message.to_string()))
}

/// Document id from a body carrying `firestoreId`, `id` or both.
///
/// `firestoreId` wins when both are present; blank values count as absent.
pub(crate) fn document_id(firestore_id: Option<String>, id: Option<String>) -> Option<String> {
    let present = |v: Option<String>| v.filter(|v| !v.trim().is_empty());
    present(firestore_id).or_else(|| present(id))
}

/// Case-insensitive search term, `None` when blank.
pub(crate) fn search_term(search: Option<&str>) -> Option<String> {
    search
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_lowercase)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn some(s: &str) -> Option<String> {
        Some(s.to_string())
    }

    #[test]
    fn test_document_id_prefers_firestore_id() {
        assert_eq!(document_id(some("fs-1"), some("id-1")), some("fs-1"));
        assert_eq!(document_id(None, some("id-1")), some("id-1"));
        assert_eq!(document_id(some("  "), some("id-1")), some("id-1"));
        assert_eq!(document_id(None, Some(String::new())), None);
    }
}
