//! Store settings page.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{Html, Redirect},
    routing::get,
};
use serde::Deserialize;
use tracing::instrument;

use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::StoreSettings;
use crate::state::AppState;

use super::api::settings::{load_settings, save_settings};
use super::{FlashQuery, format_timestamp, redirect_error, redirect_success, render};

/// Settings page template.
#[derive(Template)]
#[template(path = "settings/index.html")]
pub struct SettingsTemplate {
    pub current_path: String,
    pub success_message: Option<String>,
    pub error_message: Option<String>,
    pub settings: StoreSettings,
    pub updated_at: String,
}

/// Build the settings router.
pub fn router() -> Router<AppState> {
    Router::new().route("/settings", get(settings_page).post(save))
}

/// Submitted settings form. Unticked checkboxes are absent.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct SettingsForm {
    pub preorder_enabled: Option<String>,
    pub announcement_text: String,
    pub sender_name: String,
}

impl From<SettingsForm> for StoreSettings {
    fn from(form: SettingsForm) -> Self {
        Self {
            preorder_enabled: form.preorder_enabled.is_some(),
            announcement_text: form.announcement_text.trim().to_string(),
            sender_name: form.sender_name.trim().to_string(),
            ..Self::default()
        }
    }
}

/// GET /settings
#[instrument(skip(_admin, state))]
async fn settings_page(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Query(flash): Query<FlashQuery>,
) -> Html<String> {
    let (settings, error_message) = match load_settings(&state).await {
        Ok(settings) => (settings, flash.error),
        Err(e) => {
            tracing::error!("Failed to load settings: {e}");
            (StoreSettings::default(), Some(e.public_message()))
        }
    };

    render(&SettingsTemplate {
        current_path: "/settings".to_string(),
        success_message: flash.success,
        error_message,
        updated_at: format_timestamp(settings.updated_at.as_ref()),
        settings,
    })
}

/// POST /settings
#[instrument(skip(_admin, state, form))]
async fn save(
    _admin: RequireAdminAuth,
    State(state): State<AppState>,
    Form(form): Form<SettingsForm>,
) -> Redirect {
    match save_settings(&state, StoreSettings::from(form)).await {
        Ok(()) => redirect_success("/settings", "Settings saved"),
        Err(e) => redirect_error("/settings", &e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_unticked_checkbox_disables_preorders() {
        let settings = StoreSettings::from(SettingsForm {
            preorder_enabled: None,
            announcement_text: " Free shipping over ₹999 ".to_string(),
            sender_name: "Sareine Beauty".to_string(),
        });
        assert!(!settings.preorder_enabled);
        assert_eq!(settings.announcement_text, "Free shipping over ₹999");
        assert_eq!(settings.sender_display_name(), "Sareine Beauty");
    }
}
