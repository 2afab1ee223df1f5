//! Order API handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sareine_core::{OrderId, OrderStatus};

use super::{ApiJson, SuccessResponse, document_id, required, search_term};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::Order;
use crate::state::AppState;

const MISSING_FIELDS: &str = "Missing firestoreId or status";

/// Build the orders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/orders/list", get(list))
        .route("/api/admin/orders/update-status", post(update_status))
}

#[derive(Debug, Default, Deserialize)]
pub struct OrdersQuery {
    pub status: Option<String>,
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct OrdersResponse {
    pub orders: Vec<Order>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub firestore_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
    #[serde(default)]
    pub send_email: bool,
}

/// Parse an optional status filter; blank means no filter.
pub(crate) fn parse_status_filter(status: Option<&str>) -> Result<Option<OrderStatus>, AppError> {
    status
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(|s| s.parse().map_err(AppError::from))
        .transpose()
}

/// Orders matching the filter and search, newest first.
pub(crate) async fn load_orders(
    state: &AppState,
    query: &OrdersQuery,
) -> Result<Vec<Order>, AppError> {
    let status = parse_status_filter(query.status.as_deref())?;
    let mut orders = state.store().list_orders(status).await?;
    if let Some(needle) = search_term(query.search.as_deref()) {
        orders.retain(|o| o.matches_search(&needle));
    }
    Ok(orders)
}

/// Set an order's status, then send the matching email when asked.
///
/// Email failures are logged and written to the email log, never returned.
pub(crate) async fn change_status(
    state: &AppState,
    id: &OrderId,
    status: OrderStatus,
    send_email: bool,
) -> Result<(), AppError> {
    let mut order = state
        .store()
        .get_order(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))?;

    let now = Utc::now();
    state.store().set_order_status(id, status, now).await?;
    tracing::info!(order_id = %id, status = %status, "Order status updated");

    if send_email {
        order.status = status;
        order.updated_at = Some(now);
        if let Some(Err(e)) = state.email().notify_order_status(&order, status).await {
            tracing::warn!(order_id = %id, error = %e, "Status email failed");
        }
    }
    Ok(())
}

/// GET /api/admin/orders/list
#[instrument(skip(_admin, state))]
async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<OrdersQuery>,
) -> Result<Json<OrdersResponse>, AppError> {
    let orders = load_orders(&state, &query).await?;
    Ok(Json(OrdersResponse { orders }))
}

/// POST /api/admin/orders/update-status
#[instrument(skip(_admin, state))]
async fn update_status(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = required(document_id(body.firestore_id, body.id), MISSING_FIELDS)?;
    let status: OrderStatus = required(body.status, MISSING_FIELDS)?.parse()?;

    change_status(&state, &OrderId::new(id), status, body.send_email).await?;
    Ok(Json(SuccessResponse::ok()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_status_filter() {
        assert_eq!(parse_status_filter(None).ok(), Some(None));
        assert_eq!(parse_status_filter(Some("  ")).ok(), Some(None));
        assert_eq!(
            parse_status_filter(Some("paid")).ok(),
            Some(Some(OrderStatus::Paid))
        );
        assert!(matches!(
            parse_status_filter(Some("shipped")),
            Err(AppError::BadRequest(_))
        ));
    }
}
