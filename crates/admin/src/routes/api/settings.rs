//! Store settings API handlers.

use axum::{Json, Router, extract::State, routing::get};
use chrono::Utc;
use serde::Serialize;
use tracing::instrument;

use super::{ApiJson, SuccessResponse};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{SettingsUpdate, StoreSettings};
use crate::state::AppState;

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/settings", get(show).post(save))
}

#[derive(Debug, Serialize)]
pub struct SettingsResponse {
    pub settings: StoreSettings,
}

/// Saved settings, or the defaults when never saved.
pub(crate) async fn load_settings(state: &AppState) -> Result<StoreSettings, AppError> {
    Ok(state.store().load_settings().await?.unwrap_or_default())
}

/// Replace the settings record, stamping `updated_at`.
pub(crate) async fn save_settings(
    state: &AppState,
    mut settings: StoreSettings,
) -> Result<(), AppError> {
    settings.updated_at = Some(Utc::now());
    state.store().save_settings(&settings).await?;
    tracing::info!(
        preorder_enabled = settings.preorder_enabled,
        "Store settings saved"
    );
    Ok(())
}

/// GET /api/admin/settings
#[instrument(skip(_admin, state))]
async fn show(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<SettingsResponse>, AppError> {
    let settings = load_settings(&state).await?;
    Ok(Json(SettingsResponse { settings }))
}

/// POST /api/admin/settings
///
/// Fields missing from the body, or sent as `null`, reset to their defaults.
#[instrument(skip(_admin, state))]
async fn save(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SettingsUpdate>,
) -> Result<Json<SuccessResponse>, AppError> {
    save_settings(&state, body.into()).await?;
    Ok(Json(SuccessResponse::ok()))
}
