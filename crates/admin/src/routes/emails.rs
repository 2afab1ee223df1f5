//! Email compose pages and the email log.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::{get, post},
};
use serde::Deserialize;
use tracing::instrument;

use sareine_core::EmailKind;

use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::EmailLog;
use crate::state::AppState;

use super::api::emails::{EMAIL_LOG_LIMIT, SendEmailRequest, send_email};
use super::{FlashQuery, format_timestamp, redirect_error, redirect_success, render};

/// Email log row.
#[derive(Debug, Clone)]
pub struct EmailLogRow {
    pub kind: String,
    pub recipient: String,
    pub subject: String,
    pub success: bool,
    pub error: String,
    pub sent_at: String,
}

impl From<&EmailLog> for EmailLogRow {
    fn from(entry: &EmailLog) -> Self {
        Self {
            kind: entry.kind.label(),
            recipient: entry.recipient.clone(),
            subject: entry.subject.clone(),
            success: entry.success,
            error: entry.error.clone().unwrap_or_default(),
            sent_at: format_timestamp(Some(&entry.sent_at)),
        }
    }
}

/// Emails page template.
#[derive(Template)]
#[template(path = "emails/index.html")]
pub struct EmailsTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub logs: Vec<EmailLogRow>,
    pub configured: bool,
}

/// Build the emails page router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/emails", get(emails_page))
        .route("/emails/custom", post(send_custom))
        .route("/emails/promotional", post(send_promotional))
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CustomEmailForm {
    pub to: String,
    pub subject: String,
    pub heading: String,
    pub body: String,
}

#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct PromotionalEmailForm {
    pub subject: String,
    pub heading: String,
    pub body: String,
    pub cta_text: String,
    pub cta_url: String,
    /// Comma or newline separated; blank sends to every user.
    pub recipients: String,
}

fn non_blank(value: &str) -> Option<String> {
    let trimmed = value.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

impl From<CustomEmailForm> for SendEmailRequest {
    fn from(form: CustomEmailForm) -> Self {
        Self {
            kind: EmailKind::Custom.as_str().to_string(),
            recipient_email: non_blank(&form.to),
            subject: non_blank(&form.subject),
            heading: non_blank(&form.heading),
            body_text: Some(form.body),
            ..Self::default()
        }
    }
}

impl From<PromotionalEmailForm> for SendEmailRequest {
    fn from(form: PromotionalEmailForm) -> Self {
        let recipients = form
            .recipients
            .split([',', '\n'])
            .map(str::trim)
            .filter(|r| !r.is_empty())
            .map(ToString::to_string)
            .collect();
        Self {
            kind: EmailKind::Promotional.as_str().to_string(),
            subject: non_blank(&form.subject),
            heading: non_blank(&form.heading),
            body_text: Some(form.body),
            cta_text: non_blank(&form.cta_text),
            cta_url: non_blank(&form.cta_url),
            recipients,
            ..Self::default()
        }
    }
}

/// GET /emails
#[instrument(skip(_admin, state))]
async fn emails_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    let (logs, error_message) = match state.store().recent_email_logs(EMAIL_LOG_LIMIT).await {
        Ok(logs) => (logs.iter().map(EmailLogRow::from).collect(), flash.error),
        Err(e) => {
            tracing::error!("Failed to load email log: {e}");
            (Vec::new(), Some(AppError::from(e).public_message()))
        }
    };

    render(&EmailsTemplate {
        current_path: "/emails".to_string(),
        success_message: flash.success,
        error_message,
        logs,
        configured: state.email().is_configured(),
    })
}

/// POST /emails/custom
#[instrument(skip(_admin, state, form))]
async fn send_custom(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<CustomEmailForm>,
) -> Redirect {
    match send_email(&state, &SendEmailRequest::from(form)).await {
        Ok(_) => redirect_success("/emails", "Email sent"),
        Err(e) => redirect_error("/emails", &e),
    }
}

/// POST /emails/promotional
#[instrument(skip(_admin, state, form))]
async fn send_promotional(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<PromotionalEmailForm>,
) -> Redirect {
    match send_email(&state, &SendEmailRequest::from(form)).await {
        Ok(message) => redirect_success("/emails", message.as_deref().unwrap_or("Email sent")),
        Err(e) => redirect_error("/emails", &e),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_promotional_form_splits_recipients() {
        let request = SendEmailRequest::from(PromotionalEmailForm {
            body: "New shades are here".to_string(),
            recipients: "a@example.in, b@example.in\n\nc@example.in".to_string(),
            ..PromotionalEmailForm::default()
        });
        assert_eq!(request.kind, "promotional");
        assert_eq!(request.recipients.len(), 3);
        assert!(request.subject.is_none());
    }

    #[test]
    fn test_custom_form_uses_recipient_email() {
        let request = SendEmailRequest::from(CustomEmailForm {
            to: " meera@example.in ".to_string(),
            subject: "Your order".to_string(),
            ..CustomEmailForm::default()
        });
        assert_eq!(request.recipient_email.as_deref(), Some("meera@example.in"));
        assert!(request.heading.is_none());
    }
}
