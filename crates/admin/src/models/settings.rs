//! Store-wide settings.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Sender display name used when settings were never saved.
pub const DEFAULT_SENDER_NAME: &str = "Sareine";

/// The single settings record.
///
/// Deserializing fills every missing field with its default, so a save
/// with a partial body resets the omitted fields.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct StoreSettings {
    pub preorder_enabled: bool,
    pub announcement_text: String,
    pub sender_name: String,
    #[serde(with = "sareine_core::timestamp::option")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl Default for StoreSettings {
    fn default() -> Self {
        Self {
            preorder_enabled: false,
            announcement_text: String::new(),
            sender_name: DEFAULT_SENDER_NAME.to_string(),
            updated_at: None,
        }
    }
}

impl StoreSettings {
    /// Sender name for the From header; blank names fall back to the default.
    #[must_use]
    pub fn sender_display_name(&self) -> &str {
        let name = self.sender_name.trim();
        if name.is_empty() {
            DEFAULT_SENDER_NAME
        } else {
            name
        }
    }
}

/// Body of a settings save. Absent and `null` fields both take the default.
#[derive(Debug, Default, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SettingsUpdate {
    pub preorder_enabled: Option<bool>,
    pub announcement_text: Option<String>,
    pub sender_name: Option<String>,
}

impl From<SettingsUpdate> for StoreSettings {
    fn from(update: SettingsUpdate) -> Self {
        let defaults = Self::default();
        Self {
            preorder_enabled: update.preorder_enabled.unwrap_or(defaults.preorder_enabled),
            announcement_text: update
                .announcement_text
                .unwrap_or(defaults.announcement_text),
            sender_name: update.sender_name.unwrap_or(defaults.sender_name),
            updated_at: None,
        }
    }
}
