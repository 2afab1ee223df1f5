//! Payment gateway handlers.
//!
//! The webhook is authenticated by its signature, not by the admin session.

use axum::{
    Json, Router,
    body::Bytes,
    extract::State,
    http::HeaderMap,
    routing::post,
};
use chrono::Utc;
use serde::Deserialize;
use tracing::instrument;

use sareine_core::Amount;

use super::{ApiJson, SuccessResponse};
use super::preorders::GATEWAY_MISSING;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::services::payments::{
    PaymentLink, PaymentLinkRequest, WebhookEvent, verify_webhook_signature,
};
use crate::state::AppState;

/// Header carrying the webhook signature.
pub const SIGNATURE_HEADER: &str = "x-razorpay-signature";

/// Build the payments router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/razorpay/create-payment-link", post(create_payment_link))
        .route("/api/razorpay/webhook", post(webhook))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct CreatePaymentLinkRequest {
    pub amount: Amount,
    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    pub preorder_id: String,
}

/// POST /api/razorpay/create-payment-link
#[instrument(skip(_admin, state, body), fields(preorder_ref = %body.preorder_id))]
async fn create_payment_link(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<CreatePaymentLinkRequest>,
) -> Result<Json<PaymentLink>, AppError> {
    let gateway = state
        .payments()
        .ok_or_else(|| AppError::Internal(GATEWAY_MISSING.to_string()))?;

    let link = gateway
        .create_link(&PaymentLinkRequest {
            amount: body.amount,
            customer_name: body.customer_name,
            customer_email: body.customer_email,
            phone: body.phone,
            preorder_ref: body.preorder_id,
        })
        .await?;
    Ok(Json(link))
}

/// POST /api/razorpay/webhook
///
/// Marks the matching preorder paid on `payment_link.paid`. Other events
/// are acknowledged without action.
#[instrument(skip(state, headers, body))]
async fn webhook(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> Result<Json<SuccessResponse>, AppError> {
    let secret = state
        .config()
        .razorpay_webhook_secret
        .as_ref()
        .ok_or_else(|| AppError::Internal("Razorpay webhook secret missing".to_string()))?;

    let signature = headers
        .get(SIGNATURE_HEADER)
        .and_then(|v| v.to_str().ok())
        .unwrap_or_default();
    if !verify_webhook_signature(secret, &body, signature) {
        tracing::warn!("Rejected webhook with invalid signature");
        return Err(AppError::Unauthorized);
    }

    let event: WebhookEvent = serde_json::from_slice(&body)
        .map_err(|e| AppError::BadRequest(format!("Invalid webhook payload: {e}")))?;

    if event.event != WebhookEvent::PAYMENT_LINK_PAID {
        tracing::debug!(event = %event.event, "Ignoring webhook event");
        return Ok(Json(SuccessResponse::ok()));
    }

    let Some(reference) = event.preorder_ref() else {
        tracing::warn!("Paid payment link without preorderId note");
        return Ok(Json(SuccessResponse::ok()));
    };

    match state.store().find_preorder_by_reference(reference).await? {
        Some(preorder) => {
            let payment_id = event.payment_id();
            state
                .store()
                .mark_preorder_paid(&preorder.id, payment_id, Utc::now())
                .await?;
            tracing::info!(
                preorder_id = %preorder.id,
                reference,
                payment_id = payment_id.unwrap_or_default(),
                "Preorder paid"
            );
        }
        None => tracing::warn!(reference, "Paid payment link for unknown preorder"),
    }
    Ok(Json(SuccessResponse::ok()))
}
