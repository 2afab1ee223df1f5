//! Session-related types for admin authentication.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Session-stored marker for a logged-in admin.
///
/// There is a single shared secret, so the session only records that it
/// was presented and when.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// When the secret was accepted.
    pub logged_in_at: DateTime<Utc>,
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for storing the current logged-in admin.
    pub const CURRENT_ADMIN: &str = "current_admin";
}
