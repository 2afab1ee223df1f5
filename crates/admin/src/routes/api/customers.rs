//! Customer API handlers.

use axum::{
    Json, Router,
    extract::{Query, State},
    routing::get,
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use super::search_term;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::CustomerSummary;
use crate::services::customers;
use crate::state::AppState;

/// Build the customers router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/customers/list", get(list))
}

#[derive(Debug, Default, Deserialize)]
pub struct CustomersQuery {
    pub search: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct CustomersResponse {
    pub customers: Vec<CustomerSummary>,
}

/// Every user with their order aggregates, filtered by `search`.
pub(crate) async fn load_customers(
    state: &AppState,
    search: Option<&str>,
) -> Result<Vec<CustomerSummary>, AppError> {
    let (users, orders) = tokio::try_join!(
        state.store().list_users(),
        state.store().list_orders(None),
    )?;
    let mut summary = customers::summarize(users, &orders);
    if let Some(needle) = search_term(search) {
        summary.retain(|c| customers::matches_search(c, &needle));
    }
    Ok(summary)
}

/// GET /api/admin/customers/list
#[instrument(skip(_admin, state))]
async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(query): Query<CustomersQuery>,
) -> Result<Json<CustomersResponse>, AppError> {
    let customers = load_customers(&state, query.search.as_deref()).await?;
    Ok(Json(CustomersResponse { customers }))
}
