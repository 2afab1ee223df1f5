//! Integration status for operators.
//!
//! Reports which integrations are configured. Never includes secret values.

use axum::{Json, Router, extract::State, routing::get};
use serde::Serialize;
use tracing::instrument;

use crate::middleware::RequireAdminAuth;
use crate::state::AppState;

/// Build the diagnostics router.
pub fn router() -> Router<AppState> {
    Router::new().route("/api/admin/diagnostics", get(diagnostics))
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SmtpStatus {
    pub configured: bool,
    /// Names of the variables still to set.
    pub missing: Vec<&'static str>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Diagnostics {
    pub smtp: SmtpStatus,
    pub payment_gateway: bool,
    pub webhook_secret: bool,
    pub store_reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub store_error: Option<String>,
}

/// Collect the current integration status.
pub(crate) async fn collect(state: &AppState) -> Diagnostics {
    let configured = state.email().is_configured();
    let ping = state.store().ping().await;
    if let Err(e) = &ping {
        tracing::warn!(error = %e, "Store ping failed");
    }

    Diagnostics {
        smtp: SmtpStatus {
            configured,
            missing: if configured {
                Vec::new()
            } else {
                state.config().email_missing.clone()
            },
        },
        payment_gateway: state.payments().is_some(),
        webhook_secret: state.config().razorpay_webhook_secret.is_some(),
        store_reachable: ping.is_ok(),
        store_error: ping.err().map(|_| "Store unavailable".to_string()),
    }
}

/// GET /api/admin/diagnostics
#[instrument(skip(_admin, state))]
async fn diagnostics(_admin: RequireAdminAuth, State(state): State<AppState>) -> Json<Diagnostics> {
    Json(collect(&state).await)
}
