//! Preorder list page with status and payment-link actions.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use sareine_core::{PreorderId, PreorderStatus};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::Preorder;
use crate::state::AppState;

use super::api::preorders::{change_status, issue_payment_link};
use super::{
    FlashQuery, StatusOption, format_timestamp, redirect_error, redirect_success, render,
};

/// Preorder row for the list.
#[derive(Debug, Clone)]
pub struct PreorderRow {
    pub id: String,
    pub reference: String,
    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    pub amount: String,
    pub status: &'static str,
    pub status_label: String,
    pub items: String,
    pub payment_link: Option<String>,
    /// Payment links can be (re)sent until the preorder is paid or cancelled.
    pub can_send_link: bool,
    pub created_at: String,
    pub status_options: Vec<StatusOption>,
}

impl From<&Preorder> for PreorderRow {
    fn from(preorder: &Preorder) -> Self {
        let items = preorder
            .items
            .iter()
            .map(|item| format!("{} × {}", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: preorder.id.to_string(),
            reference: preorder.reference().to_string(),
            customer_name: preorder.display_name().to_string(),
            customer_email: preorder.contact_email().to_string(),
            phone: preorder.contact_phone().to_string(),
            amount: preorder.amount.to_string(),
            status: preorder.status.as_str(),
            status_label: preorder.status.label(),
            items,
            payment_link: preorder.payment_link.as_ref().map(|l| l.short_url.clone()),
            can_send_link: matches!(
                preorder.status,
                PreorderStatus::PendingConfirmation | PreorderStatus::PaymentLinkSent
            ),
            created_at: format_timestamp(preorder.created_at.as_ref()),
            status_options: StatusOption::all(
                PreorderStatus::ALL.iter().map(PreorderStatus::as_str),
                preorder.status.as_str(),
            ),
        }
    }
}

/// Count of preorders in one status.
#[derive(Debug, Clone)]
pub struct StatusCount {
    pub label: String,
    pub count: usize,
}

pub(crate) fn status_counts(preorders: &[Preorder]) -> Vec<StatusCount> {
    PreorderStatus::ALL
        .iter()
        .map(|status| StatusCount {
            label: status.label(),
            count: preorders.iter().filter(|p| p.status == *status).count(),
        })
        .collect()
}

/// Preorders page template.
#[derive(Template)]
#[template(path = "preorders/index.html")]
pub struct PreordersTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub preorders: Vec<PreorderRow>,
    pub counts: Vec<StatusCount>,
}

/// Build the preorders page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/preorders", get(preorders_page))
        .route("/preorders/{id}/status", post(update_status))
        .route("/preorders/{id}/payment-link", post(send_payment_link))
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
}

/// GET /preorders
#[instrument(skip(_admin, state))]
async fn preorders_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    let (preorders, error_message) = match state.store().list_preorders().await {
        Ok(preorders) => (preorders, flash.error),
        Err(e) => {
            tracing::error!("Failed to load preorders: {e}");
            (Vec::new(), Some(AppError::from(e).public_message()))
        }
    };

    render(&PreordersTemplate {
        current_path: "/preorders".to_string(),
        success_message: flash.success,
        error_message,
        counts: status_counts(&preorders),
        preorders: preorders.iter().map(PreorderRow::from).collect(),
    })
}

async fn apply_status(state: &AppState, id: String, form: &StatusForm) -> Result<(), AppError> {
    let status: PreorderStatus = form.status.parse()?;
    change_status(state, &PreorderId::new(id), status).await
}

/// POST /preorders/{id}/status
#[instrument(skip(_admin, state, form))]
async fn update_status(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    match apply_status(&state, id, &form).await {
        Ok(()) => redirect_success("/preorders", "Preorder status updated"),
        Err(e) => redirect_error("/preorders", &e),
    }
}

/// POST /preorders/{id}/payment-link
#[instrument(skip(_admin, state))]
async fn send_payment_link(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Redirect {
    match issue_payment_link(&state, &PreorderId::new(id)).await {
        Ok(_) => redirect_success("/preorders", "Payment link sent"),
        Err(e) => redirect_error("/preorders", &e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn preorder(json: &str) -> Preorder {
        serde_json::from_str(json).unwrap()
    }

    #[test]
    fn test_status_counts() {
        let preorders = vec![
            preorder(r#"{"id": "a"}"#),
            preorder(r#"{"id": "b"}"#),
            preorder(r#"{"id": "c", "status": "paid"}"#),
        ];
        let counts = status_counts(&preorders);
        assert_eq!(counts[0].label, "pending confirmation");
        assert_eq!(counts[0].count, 2);
        assert_eq!(counts[2].count, 1);
        assert_eq!(counts.len(), PreorderStatus::ALL.len());
    }

    #[test]
    fn test_paid_preorder_cannot_get_link() {
        let row = PreorderRow::from(&preorder(
            r#"{"id": "c", "preorderId": "PRE-9", "status": "paid"}"#,
        ));
        assert!(!row.can_send_link);
        assert_eq!(row.reference, "PRE-9");

        let row = PreorderRow::from(&preorder(r#"{"id": "d"}"#));
        assert!(row.can_send_link);
        assert!(row.payment_link.is_none());
    }
}
