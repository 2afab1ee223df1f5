//! Dashboard statistics API handler.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::stats::{self, DashboardStats};
use crate::state::AppState;

/// Build the stats router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/stats", get(show))
}

pub(crate) async fn load_stats(state: &AppState) -> Result<DashboardStats, AppError> {
    let (orders, preorders) = tokio::try_join!(
        state.store().list_orders(None),
        state.store().list_preorders(),
    )?;
    Ok(stats::compute(&orders, &preorders, Utc::now()))
}

/// GET /api/admin/stats
#[instrument(skip(_admin, state))]
async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<DashboardStats>, AppError> {
    Ok(Json(load_stats(&state).await?))
}
