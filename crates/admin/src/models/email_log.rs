//! Record of an attempted email send.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use sareine_core::{EmailKind, EmailLogId};

/// One entry in the email log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EmailLog {
    pub id: EmailLogId,
    #[serde(rename = "type")]
    pub kind: EmailKind,
    pub recipient: String,
    pub subject: String,
    pub success: bool,
    #[serde(default)]
    pub error: Option<String>,
    #[serde(with = "sareine_core::timestamp")]
    pub sent_at: DateTime<Utc>,
}

impl EmailLog {
    /// New entry stamped now with a generated id.
    #[must_use]
    pub fn new(
        kind: EmailKind,
        recipient: impl Into<String>,
        subject: impl Into<String>,
        success: bool,
        error: Option<String>,
    ) -> Self {
        Self {
            id: EmailLogId::generate(),
            kind,
            recipient: recipient.into(),
            subject: subject.into(),
            success,
            error,
            sent_at: Utc::now(),
        }
    }
}
