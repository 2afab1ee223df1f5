//! Email API handlers.

use axum::{
    Json, Router,
    extract::State,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use tracing::instrument;

use sareine_core::{Amount, EmailKind, OrderId, PreorderId};

use super::ApiJson;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{EmailLog, Order, Preorder};
use crate::services::email::{EmailError, PaymentLinkEmail, PromotionalEmail};
use crate::state::AppState;

/// Entries returned by the log endpoint.
pub const EMAIL_LOG_LIMIT: usize = 100;

/// Name used for greetings when the request carries none.
const FALLBACK_NAME: &str = "Valued Customer";

/// Build the emails router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/api/admin/emails/send", post(send))
        .route("/api/admin/emails/log", get(log))
}

/// Body of a send request; which fields matter depends on `type`.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SendEmailRequest {
    #[serde(rename = "type")]
    pub kind: String,
    pub id: Option<String>,
    pub firestore_id: Option<String>,
    pub customer_email: Option<String>,
    pub recipient_email: Option<String>,
    pub customer_name: Option<String>,
    pub subject: Option<String>,
    pub heading: Option<String>,
    pub body_text: Option<String>,
    pub cta_text: Option<String>,
    pub cta_url: Option<String>,
    pub preorder_id: Option<String>,
    pub amount: Option<Amount>,
    pub payment_link: Option<String>,
    pub recipients: Vec<String>,
}

#[derive(Debug, Serialize)]
pub struct SendEmailResponse {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct EmailLogResponse {
    pub logs: Vec<EmailLog>,
}

fn present(value: Option<&str>) -> Option<&str> {
    value.map(str::trim).filter(|v| !v.is_empty())
}

impl SendEmailRequest {
    /// Explicit recipient address from the request.
    fn recipient(&self) -> Option<&str> {
        present(self.customer_email.as_deref()).or_else(|| present(self.recipient_email.as_deref()))
    }

    fn name(&self) -> &str {
        present(self.customer_name.as_deref()).unwrap_or(FALLBACK_NAME)
    }

    fn document_id(&self) -> Result<&str, AppError> {
        present(self.firestore_id.as_deref())
            .or_else(|| present(self.id.as_deref()))
            .ok_or_else(|| AppError::BadRequest("Missing firestoreId".to_string()))
    }

    fn require_recipient(&self) -> Result<&str, AppError> {
        self.recipient()
            .ok_or_else(|| AppError::BadRequest("Missing recipient email".to_string()))
    }
}

async fn load_order(state: &AppState, id: &str) -> Result<Order, AppError> {
    state
        .store()
        .get_order(&OrderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Order not found".to_string()))
}

async fn load_preorder(state: &AppState, id: &str) -> Result<Preorder, AppError> {
    state
        .store()
        .get_preorder(&PreorderId::new(id))
        .await?
        .ok_or_else(|| AppError::NotFound("Preorder not found".to_string()))
}

/// Outcome of one send: the delivery result, the logged recipient and a
/// message for bulk sends.
struct Sent {
    result: Result<(), EmailError>,
    recipient: Option<String>,
    message: Option<String>,
}

impl Sent {
    fn single(result: Result<(), EmailError>, recipient: &str) -> Self {
        Self {
            result,
            recipient: Some(recipient.to_string()),
            message: None,
        }
    }
}

async fn dispatch_send(
    state: &AppState,
    kind: EmailKind,
    body: &SendEmailRequest,
) -> Result<Sent, AppError> {
    let email = state.email();
    let sent = match kind {
        EmailKind::OrderConfirmation => {
            let order = load_order(state, body.document_id()?).await?;
            Sent::single(email.send_order_confirmation(&order).await, order.contact_email())
        }
        EmailKind::PreorderConfirmation => {
            let preorder = load_preorder(state, body.document_id()?).await?;
            Sent::single(
                email.send_preorder_confirmation(&preorder).await,
                preorder.contact_email(),
            )
        }
        EmailKind::Dispatch => {
            let order = load_order(state, body.document_id()?).await?;
            Sent::single(email.send_dispatch(&order).await, order.contact_email())
        }
        EmailKind::Delivery => {
            let order = load_order(state, body.document_id()?).await?;
            Sent::single(email.send_delivery(&order).await, order.contact_email())
        }
        EmailKind::PaymentLink => {
            let to = body.require_recipient()?;
            let link = present(body.payment_link.as_deref())
                .ok_or_else(|| AppError::BadRequest("Missing paymentLink".to_string()))?;
            let data = PaymentLinkEmail {
                customer_name: body.name().to_string(),
                customer_email: to.to_string(),
                preorder_ref: present(body.preorder_id.as_deref())
                    .unwrap_or_default()
                    .to_string(),
                amount: body.amount.unwrap_or_default(),
                payment_link: link.to_string(),
            };
            Sent::single(email.send_payment_link(&data).await, to)
        }
        EmailKind::Welcome => {
            let to = body.require_recipient()?;
            Sent::single(email.send_welcome(to, body.name()).await, to)
        }
        EmailKind::Custom => {
            let to = body.require_recipient()?;
            let subject = present(body.subject.as_deref())
                .ok_or_else(|| AppError::BadRequest("Missing subject".to_string()))?;
            let heading = present(body.heading.as_deref()).unwrap_or(subject);
            let text = body.body_text.as_deref().unwrap_or_default();
            Sent::single(email.send_custom(to, subject, heading, text).await, to)
        }
        EmailKind::Promotional => {
            let promo = PromotionalEmail {
                subject: body.subject.clone(),
                heading: body.heading.clone(),
                body_text: body.body_text.clone().unwrap_or_default(),
                cta_text: body.cta_text.clone(),
                cta_url: body.cta_url.clone(),
                recipients: body
                    .recipients
                    .iter()
                    .map(|r| r.trim().to_string())
                    .filter(|r| !r.is_empty())
                    .collect(),
            };
            let outcome = email.send_promotional(&promo).await?;
            Sent {
                result: Ok(()),
                recipient: None,
                message: Some(outcome.message()),
            }
        }
    };
    Ok(sent)
}

/// Send one email described by `body` and append it to the email log.
///
/// Returns the bulk-send message, if any.
pub(crate) async fn send_email(
    state: &AppState,
    body: &SendEmailRequest,
) -> Result<Option<String>, AppError> {
    let kind: EmailKind = body
        .kind
        .parse()
        .map_err(|_| AppError::BadRequest(format!("Unknown email type: {}", body.kind)))?;

    let sent = dispatch_send(state, kind, body).await?;

    let recipient = body
        .recipient()
        .map(ToString::to_string)
        .or(sent.recipient)
        .filter(|r| !r.is_empty())
        .unwrap_or_else(|| "bulk".to_string());
    let subject = present(body.subject.as_deref()).unwrap_or(kind.as_str());
    state
        .email()
        .record(kind, &recipient, subject, &sent.result)
        .await;

    sent.result?;
    tracing::info!(kind = %kind, recipient = %recipient, "Email sent");
    Ok(sent.message)
}

/// POST /api/admin/emails/send
#[instrument(skip(_admin, state, body), fields(kind = %body.kind))]
async fn send(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    ApiJson(body): ApiJson<SendEmailRequest>,
) -> Result<Json<SendEmailResponse>, AppError> {
    let message = send_email(&state, &body).await?;
    Ok(Json(SendEmailResponse {
        success: true,
        message,
    }))
}

/// GET /api/admin/emails/log
#[instrument(skip(_admin, state))]
async fn log(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
) -> Result<Json<EmailLogResponse>, AppError> {
    let logs = state.store().recent_email_logs(EMAIL_LOG_LIMIT).await?;
    Ok(Json(EmailLogResponse { logs }))
}
