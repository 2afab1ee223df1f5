//! Razorpay payment links.
//!
//! # API Reference
//!
//! - Base URL: `https://api.razorpay.com/v1`
//! - Authentication: HTTP basic auth with key id and key secret
//! - Webhooks: `X-Razorpay-Signature` is hex HMAC-SHA256 of the raw body

use async_trait::async_trait;
use hmac::{Hmac, Mac};
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use sha2::Sha256;
use thiserror::Error;
use tracing::instrument;

use sareine_core::Amount;

use crate::config::RazorpayConfig;

type HmacSha256 = Hmac<Sha256>;

/// Errors that can occur when creating payment links.
#[derive(Debug, Error)]
pub enum PaymentError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Gateway returned an error response.
    #[error("Razorpay error: {status} - {message}")]
    Api { status: u16, message: String },

    /// Amount is zero, negative or too large.
    #[error("Invalid amount: {0}")]
    InvalidAmount(String),

    /// Failed to parse response.
    #[error("Parse error: {0}")]
    Parse(String),
}

/// Everything needed to create a link for one preorder.
#[derive(Debug, Clone)]
pub struct PaymentLinkRequest {
    pub amount: Amount,
    pub customer_name: String,
    pub customer_email: String,
    pub phone: String,
    /// Human preorder reference, echoed back in webhook notes.
    pub preorder_ref: String,
}

/// A created payment link.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PaymentLink {
    pub id: String,
    pub short_url: String,
    #[serde(default)]
    pub status: String,
}

/// Creates hosted payment pages.
#[async_trait]
pub trait PaymentGateway: Send + Sync + 'static {
    async fn create_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, PaymentError>;
}

#[derive(Serialize)]
struct CreateLinkBody<'a> {
    amount: i64,
    currency: &'static str,
    accept_partial: bool,
    description: String,
    customer: Customer<'a>,
    notify: Notify,
    reminder_enable: bool,
    notes: Notes<'a>,
}

#[derive(Serialize)]
struct Customer<'a> {
    name: &'a str,
    email: &'a str,
    contact: &'a str,
}

#[derive(Serialize)]
struct Notify {
    sms: bool,
    email: bool,
}

#[derive(Serialize)]
struct Notes<'a> {
    #[serde(rename = "preorderId")]
    preorder_id: &'a str,
}

impl<'a> CreateLinkBody<'a> {
    fn new(request: &'a PaymentLinkRequest) -> Result<Self, PaymentError> {
        if !request.amount.is_positive() {
            return Err(PaymentError::InvalidAmount(request.amount.to_string()));
        }
        let amount = request
            .amount
            .to_paise()
            .ok_or_else(|| PaymentError::InvalidAmount(request.amount.to_string()))?;

        Ok(Self {
            amount,
            currency: "INR",
            accept_partial: false,
            description: format!("Payment for Preorder #{}", request.preorder_ref),
            customer: Customer {
                name: &request.customer_name,
                email: &request.customer_email,
                contact: &request.phone,
            },
            notify: Notify {
                sms: true,
                email: true,
            },
            reminder_enable: true,
            notes: Notes {
                preorder_id: &request.preorder_ref,
            },
        })
    }
}

/// Razorpay REST client.
#[derive(Clone)]
pub struct RazorpayClient {
    client: reqwest::Client,
    key_id: String,
    key_secret: SecretString,
    api_base: String,
}

impl std::fmt::Debug for RazorpayClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayClient")
            .field("key_id", &self.key_id)
            .field("api_base", &self.api_base)
            .finish_non_exhaustive()
    }
}

impl RazorpayClient {
    /// Create a client from configuration.
    ///
    /// # Errors
    ///
    /// Returns error if the HTTP client fails to build.
    pub fn new(config: &RazorpayConfig) -> Result<Self, PaymentError> {
        let client = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(20))
            .build()?;

        Ok(Self {
            client,
            key_id: config.key_id.clone(),
            key_secret: config.key_secret.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
        })
    }
}

#[async_trait]
impl PaymentGateway for RazorpayClient {
    #[instrument(skip(self, request), fields(preorder_ref = %request.preorder_ref))]
    async fn create_link(&self, request: &PaymentLinkRequest) -> Result<PaymentLink, PaymentError> {
        let body = CreateLinkBody::new(request)?;
        let url = format!("{}/payment_links", self.api_base);

        let response = self
            .client
            .post(&url)
            .basic_auth(&self.key_id, Some(self.key_secret.expose_secret()))
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let message = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            tracing::error!(status = status.as_u16(), "Razorpay rejected payment link");
            return Err(PaymentError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let link: PaymentLink = response
            .json()
            .await
            .map_err(|e| PaymentError::Parse(format!("Failed to parse response: {e}")))?;

        tracing::info!(link_id = %link.id, "Payment link created");
        Ok(link)
    }
}

/// Check a webhook signature against the raw request body.
#[must_use]
pub fn verify_webhook_signature(secret: &SecretString, body: &[u8], signature: &str) -> bool {
    let Ok(expected) = hex::decode(signature.trim()) else {
        return false;
    };
    let Ok(mut mac) = HmacSha256::new_from_slice(secret.expose_secret().as_bytes()) else {
        return false;
    };
    mac.update(body);
    mac.verify_slice(&expected).is_ok()
}

/// Webhook envelope; only the fields we act on.
#[derive(Debug, Deserialize)]
pub struct WebhookEvent {
    pub event: String,
    #[serde(default)]
    pub payload: serde_json::Value,
}

impl WebhookEvent {
    pub const PAYMENT_LINK_PAID: &'static str = "payment_link.paid";

    /// `notes.preorderId` of the paid link, if present and not blank.
    #[must_use]
    pub fn preorder_ref(&self) -> Option<&str> {
        self.payload
            .pointer("/payment_link/entity/notes/preorderId")
            .and_then(serde_json::Value::as_str)
            .map(str::trim)
            .filter(|r| !r.is_empty())
    }

    /// Gateway payment id, if present.
    #[must_use]
    pub fn payment_id(&self) -> Option<&str> {
        self.payload
            .pointer("/payment/entity/id")
            .and_then(serde_json::Value::as_str)
    }
}
