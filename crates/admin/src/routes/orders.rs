//! Order list page and status form.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Path, Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use sareine_core::{OrderId, OrderStatus};

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::Order;
use crate::state::AppState;

use super::api::orders::{OrdersQuery, change_status, load_orders};
use super::{StatusOption, format_timestamp, redirect_error, redirect_success, render};

/// Order row for the list.
#[derive(Debug, Clone)]
pub struct OrderRow {
    pub id: String,
    pub customer_name: String,
    pub customer_email: String,
    pub amount: String,
    pub status: &'static str,
    pub status_label: String,
    pub items: String,
    pub city: String,
    pub created_at: String,
    pub status_options: Vec<StatusOption>,
}

impl From<&Order> for OrderRow {
    fn from(order: &Order) -> Self {
        let items = order
            .items
            .iter()
            .map(|item| format!("{} × {}", item.name, item.quantity))
            .collect::<Vec<_>>()
            .join(", ");
        Self {
            id: order.id.to_string(),
            customer_name: order.display_name().to_string(),
            customer_email: order.contact_email().to_string(),
            amount: order.amount.to_string(),
            status: order.status.as_str(),
            status_label: order.status.label(),
            items,
            city: order
                .shipping_address
                .as_ref()
                .map(|a| a.city.clone())
                .unwrap_or_default(),
            created_at: format_timestamp(order.created_at.as_ref()),
            status_options: status_options(order.status.as_str()),
        }
    }
}

fn status_options(current: &str) -> Vec<StatusOption> {
    StatusOption::all(OrderStatus::ALL.iter().map(OrderStatus::as_str), current)
}

/// Orders page template.
#[derive(Template)]
#[template(path = "orders/index.html")]
pub struct OrdersTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub orders: Vec<OrderRow>,
    pub filter_options: Vec<StatusOption>,
    pub search: String,
}

/// Build the orders page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/orders", get(orders_page))
        .route("/orders/{id}/status", post(update_status))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersPageQuery {
    pub status: Option<String>,
    pub search: Option<String>,
    pub success: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct StatusForm {
    pub status: String,
    /// Checkbox; present only when ticked.
    #[serde(default)]
    pub send_email: Option<String>,
}

/// GET /orders
#[instrument(skip(_admin, state))]
async fn orders_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersPageQuery>,
) -> Html<String> {
    let filter = OrdersQuery {
        status: query.status.clone(),
        search: query.search.clone(),
    };
    let (orders, error_message) = match load_orders(&state, &filter).await {
        Ok(orders) => (orders.iter().map(OrderRow::from).collect(), query.error),
        Err(e) => {
            tracing::error!("Failed to load orders: {e}");
            (Vec::new(), Some(e.public_message()))
        }
    };

    render(&OrdersTemplate {
        current_path: "/orders".to_string(),
        success_message: query.success,
        error_message,
        orders,
        filter_options: status_options(query.status.as_deref().unwrap_or_default()),
        search: query.search.unwrap_or_default(),
    })
}

async fn apply_status(state: &AppState, id: String, form: &StatusForm) -> Result<(), AppError> {
    let status: OrderStatus = form.status.parse()?;
    change_status(state, &OrderId::new(id), status, form.send_email.is_some()).await
}

/// POST /orders/{id}/status
#[instrument(skip(_admin, state, form))]
async fn update_status(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<StatusForm>,
) -> Redirect {
    match apply_status(&state, id, &form).await {
        Ok(()) => redirect_success("/orders", "Order status updated"),
        Err(e) => redirect_error("/orders", &e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_order_row_summarises_items() {
        let order: Order = serde_json::from_str(
            r#"{"id": "o1", "customerName": "Kavya", "amount": 998, "status": "dispatched",
                "items": [{"name": "Rose Balm", "price": 499, "quantity": 2},
                          {"name": "Lip Scrub", "price": 0}]}"#,
        )
        .unwrap();
        let row = OrderRow::from(&order);
        assert_eq!(row.items, "Rose Balm × 2, Lip Scrub × 1");
        assert_eq!(row.amount, "₹998");
        assert_eq!(row.status, "dispatched");
        assert!(
            row.status_options
                .iter()
                .any(|o| o.value == "dispatched" && o.selected)
        );
    }

    #[test]
    fn test_unknown_status_is_bad_request() {
        let err: AppError = "shipped".parse::<OrderStatus>().unwrap_err().into();
        assert_eq!(err.status(), axum::http::StatusCode::BAD_REQUEST);
    }
}
