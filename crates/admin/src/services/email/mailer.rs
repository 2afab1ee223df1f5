//! Mailer trait and its implementations.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use lettre::message::{Mailbox, MultiPart};
use lettre::transport::smtp::authentication::Credentials;
use lettre::{Address, AsyncSmtpTransport, AsyncTransport, Message, Tokio1Executor};
use secrecy::ExposeSecret;
use tokio::sync::Mutex;

use super::{EmailError, OutgoingEmail};
use crate::config::{EmailConfig, SmtpTls};

const SMTP_TIMEOUT: Duration = Duration::from_secs(15);

/// Async email sending trait.
#[async_trait]
pub trait Mailer: Send + Sync + 'static {
    /// Deliver one message.
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError>;

    /// Whether delivery is possible at all.
    fn is_configured(&self) -> bool {
        true
    }
}

/// SMTP-based mailer using lettre.
#[derive(Clone)]
pub struct SmtpMailer {
    transport: Arc<AsyncSmtpTransport<Tokio1Executor>>,
    from_address: Address,
}

impl std::fmt::Debug for SmtpMailer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SmtpMailer")
            .field("from_address", &self.from_address)
            .finish_non_exhaustive()
    }
}

impl SmtpMailer {
    /// Create a mailer from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the relay host is invalid or the sender address
    /// cannot be parsed.
    pub fn new(config: &EmailConfig) -> Result<Self, EmailError> {
        let from_address: Address = config
            .from_address
            .parse()
            .map_err(|_| EmailError::InvalidAddress(config.from_address.clone()))?;

        let builder = match config.tls {
            SmtpTls::None => {
                AsyncSmtpTransport::<Tokio1Executor>::builder_dangerous(&config.smtp_host)
            }
            SmtpTls::Implicit => AsyncSmtpTransport::<Tokio1Executor>::relay(&config.smtp_host)?,
            SmtpTls::StartTls => {
                AsyncSmtpTransport::<Tokio1Executor>::starttls_relay(&config.smtp_host)?
            }
        };

        let transport = builder
            .port(config.smtp_port)
            .timeout(Some(SMTP_TIMEOUT))
            .credentials(Credentials::new(
                config.smtp_username.clone(),
                config.smtp_password.expose_secret().to_string(),
            ))
            .build();

        Ok(Self {
            transport: Arc::new(transport),
            from_address,
        })
    }

    fn build_message(&self, email: &OutgoingEmail) -> Result<Message, EmailError> {
        let from = Mailbox::new(Some(email.from_name.clone()), self.from_address.clone());
        let to: Mailbox = email
            .to
            .parse()
            .map_err(|_| EmailError::InvalidAddress(email.to.clone()))?;

        let message = Message::builder()
            .from(from)
            .to(to)
            .subject(&email.subject)
            .multipart(MultiPart::alternative_plain_html(
                email.text.clone(),
                email.html.clone(),
            ))?;

        Ok(message)
    }
}

#[async_trait]
impl Mailer for SmtpMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        let message = self.build_message(email)?;
        self.transport.send(message).await?;

        tracing::info!(to = %email.to, subject = %email.subject, "Email sent successfully");
        Ok(())
    }
}

/// Mailer used when SMTP credentials are absent; every send fails.
#[derive(Debug, Clone)]
pub struct UnconfiguredMailer {
    missing: Vec<&'static str>,
}

impl UnconfiguredMailer {
    /// Fail with the given variable names.
    #[must_use]
    pub const fn new(missing: Vec<&'static str>) -> Self {
        Self { missing }
    }
}

#[async_trait]
impl Mailer for UnconfiguredMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        tracing::warn!(to = %email.to, "Email not sent: SMTP is not configured");
        Err(EmailError::NotConfigured(self.missing.clone()))
    }

    fn is_configured(&self) -> bool {
        false
    }
}

/// In-memory mailer for development and testing.
///
/// Keeps every delivered message; recipients added with
/// [`MemoryMailer::fail_for`] are rejected instead.
#[derive(Debug, Clone, Default)]
pub struct MemoryMailer {
    sent: Arc<Mutex<Vec<OutgoingEmail>>>,
    failing: Arc<Mutex<Vec<String>>>,
}

impl MemoryMailer {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Reject messages addressed to `recipient`.
    pub async fn fail_for(&self, recipient: impl Into<String>) {
        self.failing.lock().await.push(recipient.into());
    }

    /// Messages delivered so far, oldest first.
    pub async fn sent(&self) -> Vec<OutgoingEmail> {
        self.sent.lock().await.clone()
    }
}

#[async_trait]
impl Mailer for MemoryMailer {
    async fn send(&self, email: &OutgoingEmail) -> Result<(), EmailError> {
        if self.failing.lock().await.iter().any(|r| r == &email.to) {
            return Err(EmailError::Rejected(format!("mailbox unavailable: {}", email.to)));
        }
        self.sent.lock().await.push(email.clone());
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::SecretString;

    use super::*;

    fn outgoing(to: &str) -> OutgoingEmail {
        OutgoingEmail {
            to: to.to_string(),
            from_name: "Sareine".to_string(),
            subject: "Hello".to_string(),
            html: "<p>Hi</p>".to_string(),
            text: "Hi".to_string(),
        }
    }

    fn smtp_config() -> EmailConfig {
        EmailConfig {
            smtp_host: "localhost".to_string(),
            smtp_port: 2525,
            tls: SmtpTls::None,
            smtp_username: "user".to_string(),
            smtp_password: SecretString::from("pass"),
            from_address: "sareinebeauty@gmail.com".to_string(),
        }
    }

    #[tokio::test]
    async fn test_memory_mailer_records_and_fails() {
        let mailer = MemoryMailer::new();
        mailer.fail_for("bounce@example.in").await;

        mailer.send(&outgoing("ok@example.in")).await.unwrap();
        let err = mailer.send(&outgoing("bounce@example.in")).await.unwrap_err();
        assert!(err.to_string().contains("bounce@example.in"));

        let sent = mailer.sent().await;
        assert_eq!(sent.len(), 1);
        assert_eq!(sent[0].to, "ok@example.in");
    }

    #[tokio::test]
    async fn test_unconfigured_mailer_fails() {
        let mailer = UnconfiguredMailer::new(vec!["SMTP_PASSWORD"]);
        assert!(!mailer.is_configured());
        let err = mailer.send(&outgoing("a@example.in")).await.unwrap_err();
        assert_eq!(err.to_string(), "Missing env: SMTP_PASSWORD");
    }

    #[tokio::test]
    async fn test_build_message_uses_sender_name() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let mut email = outgoing("priya@example.in");
        email.from_name = "Sareine Beauty".to_string();

        let message = mailer.build_message(&email).unwrap();
        let raw = String::from_utf8(message.formatted()).unwrap();
        assert!(raw.contains("Sareine Beauty"));
        assert!(raw.contains("<sareinebeauty@gmail.com>"));
        assert!(raw.contains("priya@example.in"));
    }

    #[tokio::test]
    async fn test_build_message_rejects_bad_recipient() {
        let mailer = SmtpMailer::new(&smtp_config()).unwrap();
        let err = mailer.build_message(&outgoing("not an address")).unwrap_err();
        assert!(matches!(err, EmailError::InvalidAddress(_)));
    }

    #[tokio::test]
    async fn test_new_rejects_bad_sender() {
        let mut config = smtp_config();
        config.from_address = "nobody".to_string();
        assert!(matches!(
            SmtpMailer::new(&config),
            Err(EmailError::InvalidAddress(_))
        ));
    }
}
