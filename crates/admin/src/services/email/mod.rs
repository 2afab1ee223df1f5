//! Transactional and marketing email.
//!
//! Templates render into an [`OutgoingEmail`]; a [`Mailer`] delivers it.
//! [`EmailService`] ties the two together with the store so that every
//! send reads the sender name from settings.

mod mailer;
mod service;
pub mod templates;

use lettre::transport::smtp::Error as SmtpError;
use thiserror::Error;

use crate::db::RepositoryError;

pub use mailer::{Mailer, MemoryMailer, SmtpMailer, UnconfiguredMailer};
pub use service::{EmailService, PaymentLinkEmail, PromotionalEmail, PromotionalOutcome};
pub use templates::RenderedEmail;

/// Errors that can occur when sending email.
#[derive(Debug, Error)]
pub enum EmailError {
    /// SMTP credentials are not configured.
    #[error("Missing env: {}", .0.join(", "))]
    NotConfigured(Vec<&'static str>),

    /// SMTP transport error.
    #[error("SMTP error: {0}")]
    Smtp(#[from] SmtpError),

    /// Failed to build email message.
    #[error("Failed to build message: {0}")]
    MessageBuild(#[from] lettre::error::Error),

    /// Invalid email address.
    #[error("Invalid email address: {0}")]
    InvalidAddress(String),

    /// Template rendering error.
    #[error("Template error: {0}")]
    Template(#[from] askama::Error),

    /// Delivery rejected by a non-SMTP backend.
    #[error("Delivery failed: {0}")]
    Rejected(String),

    /// Recipient lookup failed.
    #[error("Failed to load recipients: {0}")]
    Store(#[from] RepositoryError),
}

/// A rendered message addressed to one recipient.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutgoingEmail {
    pub to: String,
    /// Display name for the From header.
    pub from_name: String,
    pub subject: String,
    pub html: String,
    pub text: String,
}

impl OutgoingEmail {
    /// Address a rendered template.
    #[must_use]
    pub fn new(to: impl Into<String>, from_name: impl Into<String>, rendered: RenderedEmail) -> Self {
        Self {
            to: to.into(),
            from_name: from_name.into(),
            subject: rendered.subject,
            html: rendered.html,
            text: rendered.text,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_configured_names_missing_vars() {
        let err = EmailError::NotConfigured(vec!["SMTP_USERNAME", "SMTP_PASSWORD"]);
        assert_eq!(err.to_string(), "Missing env: SMTP_USERNAME, SMTP_PASSWORD");

        let err = EmailError::NotConfigured(vec!["SMTP_PASSWORD"]);
        assert_eq!(err.to_string(), "Missing env: SMTP_PASSWORD");
    }
}
