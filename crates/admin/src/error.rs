//! Unified error handling for admin.

use axum::{
    Json,
    extract::rejection::JsonRejection,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use thiserror::Error;

use sareine_core::UnknownVariant;

use crate::db::RepositoryError;
use crate::services::{EmailError, PaymentError};

/// Application-level error type for the admin API.
#[derive(Debug, Error)]
pub enum AppError {
    /// Database operation failed.
    #[error("Database error: {0}")]
    Database(#[from] RepositoryError),

    /// Email could not be rendered or sent.
    #[error("{0}")]
    Email(EmailError),

    /// Payment gateway call failed.
    #[error("Payment gateway error: {0}")]
    Payment(#[from] PaymentError),

    /// Resource not found.
    #[error("{0}")]
    NotFound(String),

    /// Caller is not authenticated.
    #[error("Unauthorized")]
    Unauthorized,

    /// Bad request from client.
    #[error("{0}")]
    BadRequest(String),

    /// Internal server error with a message safe to show.
    #[error("{0}")]
    Internal(String),
}

impl From<EmailError> for AppError {
    fn from(err: EmailError) -> Self {
        match err {
            EmailError::Store(e) => Self::Database(e),
            other => Self::Email(other),
        }
    }
}

impl From<UnknownVariant> for AppError {
    fn from(err: UnknownVariant) -> Self {
        Self::BadRequest(err.to_string())
    }
}

impl From<JsonRejection> for AppError {
    fn from(rejection: JsonRejection) -> Self {
        Self::BadRequest(rejection.body_text())
    }
}

impl AppError {
    /// HTTP status for this error.
    #[must_use]
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Database(_) | Self::Email(_) | Self::Internal(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
            Self::Payment(PaymentError::InvalidAmount(_)) | Self::BadRequest(_) => {
                StatusCode::BAD_REQUEST
            }
            Self::Payment(_) => StatusCode::BAD_GATEWAY,
            Self::NotFound(_) => StatusCode::NOT_FOUND,
            Self::Unauthorized => StatusCode::UNAUTHORIZED,
        }
    }

    /// Message safe to show to clients; database details stay in the logs.
    #[must_use]
    pub fn public_message(&self) -> String {
        match self {
            Self::Database(_) => "Internal server error".to_string(),
            _ => self.to_string(),
        }
    }
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let status = self.status();

        // Log server errors with Sentry
        if status.is_server_error() {
            let event_id = sentry::capture_error(&self);
            tracing::error!(
                error = %self,
                sentry_event_id = %event_id,
                "Admin request error"
            );
        }

        (
            status,
            Json(serde_json::json!({ "error": self.public_message() })),
        )
            .into_response()
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    async fn body(err: AppError) -> (StatusCode, serde_json::Value) {
        let response = err.into_response();
        let status = response.status();
        let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
            .await
            .unwrap();
        (status, serde_json::from_slice(&bytes).unwrap())
    }

    #[test]
    fn test_app_error_display() {
        let err = AppError::NotFound("Order not found".to_string());
        assert_eq!(err.to_string(), "Order not found");

        let err = AppError::BadRequest("Missing product id".to_string());
        assert_eq!(err.to_string(), "Missing product id");
    }

    #[test]
    fn test_app_error_status_codes() {
        assert_eq!(
            AppError::NotFound("x".to_string()).status(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(AppError::Unauthorized.status(), StatusCode::UNAUTHORIZED);
        assert_eq!(
            AppError::BadRequest("x".to_string()).status(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            AppError::Payment(PaymentError::Parse("x".to_string())).status(),
            StatusCode::BAD_GATEWAY
        );
        assert_eq!(
            AppError::Payment(PaymentError::InvalidAmount("₹0".to_string())).status(),
            StatusCode::BAD_REQUEST
        );
    }

    #[tokio::test]
    async fn test_database_details_hidden() {
        let (status, json) = body(AppError::Database(RepositoryError::DataCorruption(
            "orders.items: bad json".to_string(),
        )))
        .await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Internal server error");
    }

    #[tokio::test]
    async fn test_email_error_message_shown() {
        let err: AppError = EmailError::NotConfigured(vec!["SMTP_USERNAME", "SMTP_PASSWORD"]).into();
        let (status, json) = body(err).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(json["error"], "Missing env: SMTP_USERNAME, SMTP_PASSWORD");
    }

    #[test]
    fn test_email_store_error_maps_to_database() {
        let err: AppError = EmailError::Store(RepositoryError::NotFound).into();
        assert!(matches!(err, AppError::Database(_)));
    }
}
