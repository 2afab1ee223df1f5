//! Preorder API handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sareine_core::{EmailKind, PreorderId, PreorderStatus};

use super::{ApiJson, SuccessResponse, document_id, required};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{PaymentLinkRef, Preorder};
use crate::services::email::PaymentLinkEmail;
use crate::services::payments::PaymentLinkRequest;
use crate::state::AppState;

const MISSING_FIELDS: &str = "Missing firestoreId or status";

/// Message when no gateway credentials are configured.
pub const GATEWAY_MISSING: &str = "Razorpay configuration missing";

/// Build the preorders router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/preorders/list", get(list))
        .route("/api/admin/preorders/update-status", post(update_status))
        .route(
            "/api/admin/preorders/send-payment-link",
            post(send_payment_link),
        )
}

#[derive(Debug, Serialize)]
pub struct PreordersResponse {
    pub preorders: Vec<Preorder>,
}

#[derive(Debug, Deserialize)]
pub struct UpdateStatusRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "firestoreId")]
    pub firestore_id: Option<String>,
    #[serde(default)]
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct SendPaymentLinkRequest {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default, rename = "firestoreId")]
    pub firestore_id: Option<String>,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SendPaymentLinkResponse {
    pub success: bool,
    pub payment_link: String,
}

async fn find(state: &AppState, id: &PreorderId) -> Result<Preorder, AppError> {
    state
        .store()
        .get_preorder(id)
        .await?
        .ok_or_else(|| AppError::NotFound("Preorder not found".to_string()))
}

pub(crate) async fn change_status(
    state: &AppState,
    id: &PreorderId,
    status: PreorderStatus,
) -> Result<(), AppError> {
    find(state, id).await?;
    state.store().set_preorder_status(id, status, Utc::now()).await?;
    tracing::info!(preorder_id = %id, status = %status, "Preorder status updated");
    Ok(())
}

/// Create a payment link, email it, then record it on the preorder.
///
/// The status only moves to `payment_link_sent` once the email went out.
pub(crate) async fn issue_payment_link(
    state: &AppState,
    id: &PreorderId,
) -> Result<PaymentLinkRef, AppError> {
    let preorder = find(state, id).await?;
    let gateway = state
        .payments()
        .ok_or_else(|| AppError::Internal(GATEWAY_MISSING.to_string()))?;

    let reference = preorder.reference().to_string();
    let link = gateway
        .create_link(&PaymentLinkRequest {
            amount: preorder.amount,
            customer_name: preorder.display_name().to_string(),
            customer_email: preorder.contact_email().to_string(),
            phone: preorder.contact_phone().to_string(),
            preorder_ref: reference.clone(),
        })
        .await?;

    let email = PaymentLinkEmail {
        customer_name: preorder.display_name().to_string(),
        customer_email: preorder.contact_email().to_string(),
        preorder_ref: reference.clone(),
        amount: preorder.amount,
        payment_link: link.short_url.clone(),
    };
    let result = state.email().send_payment_link(&email).await;
    state
        .email()
        .record(
            EmailKind::PaymentLink,
            &email.customer_email,
            &format!("Complete Your Payment — {reference} — Sareine"),
            &result,
        )
        .await;
    if let Err(e) = result {
        tracing::error!(preorder_id = %id, error = %e, "Payment link email failed");
        return Err(AppError::Internal("Failed to send email".to_string()));
    }

    let now = Utc::now();
    let link_ref = PaymentLinkRef {
        id: link.id,
        short_url: link.short_url,
        created_at: Some(now),
    };
    state.store().record_payment_link(id, &link_ref, now).await?;
    tracing::info!(preorder_id = %id, link_id = %link_ref.id, "Payment link sent");
    Ok(link_ref)
}

/// GET /api/admin/preorders/list
#[instrument(skip(_admin, state))]
async fn list(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<PreordersResponse>, AppError> {
    let preorders = state.store().list_preorders().await?;
    Ok(Json(PreordersResponse { preorders }))
}

/// POST /api/admin/preorders/update-status
#[instrument(skip(_admin, state))]
async fn update_status(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<UpdateStatusRequest>,
) -> Result<Json<SuccessResponse>, AppError> {
    let id = required(document_id(body.firestore_id, body.id), MISSING_FIELDS)?;
    let status: PreorderStatus = required(body.status, MISSING_FIELDS)?.parse()?;

    change_status(&state, &PreorderId::new(id), status).await?;
    Ok(Json(SuccessResponse::ok()))
}

/// POST /api/admin/preorders/send-payment-link
#[instrument(skip(_admin, state))]
async fn send_payment_link(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendPaymentLinkRequest>,
) -> Result<Json<SendPaymentLinkResponse>, AppError> {
    let id = required(document_id(body.firestore_id, body.id), "Missing firestoreId")?;
    let link = issue_payment_link(&state, &PreorderId::new(id)).await?;
    Ok(Json(SendPaymentLinkResponse {
        success: true,
        payment_link: link.short_url,
    }))
}
