//! Authentication route handlers for admin.
//!
//! A single shared secret guards the dashboard. A correct secret starts a
//! session; logout ends it.

use askama::Template;
use axum::{
    Form, Router,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
    routing::{get, post},
};
use chrono::Utc;
use serde::Deserialize;
use tower_sessions::Session;
use tracing::instrument;

use crate::error::AppError;
use crate::middleware::{OptionalAdminAuth, clear_current_admin, secret_matches, set_current_admin};
use crate::models::CurrentAdmin;
use crate::state::AppState;

use super::{FlashQuery, redirect_error, render};

/// Login page template.
#[derive(Template)]
#[template(path = "auth/login.html")]
struct LoginPageTemplate {
    error_message: Option<String>,
}

/// Build the auth router.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/login", get(login_page).post(login))
        .route("/logout", post(logout))
}

#[derive(Debug, Deserialize)]
pub struct LoginForm {
    #[serde(default)]
    pub secret: String,
}

/// Render the login page, or go home when already logged in.
///
/// GET /login
async fn login_page(
    OptionalAdminAuth(admin): OptionalAdminAuth,
    Query(flash): Query<FlashQuery>,
) -> Response {
    if admin.is_some() {
        return Redirect::to("/").into_response();
    }
    render(&LoginPageTemplate {
        error_message: flash.error,
    })
    .into_response()
}

/// Check the secret and start a session.
///
/// POST /login
#[instrument(skip(state, session, form))]
async fn login(
    State(state): State<AppState>,
    session: Session,
    Form(form): Form<LoginForm>,
) -> Redirect {
    if !secret_matches(&state.config().admin_secret, form.secret.trim()) {
        return redirect_error(
            "/login",
            &AppError::BadRequest("Invalid admin secret".to_string()),
        );
    }

    let admin = CurrentAdmin {
        logged_in_at: Utc::now(),
    };
    if let Err(e) = set_current_admin(&session, &admin).await {
        tracing::error!(error = %e, "Failed to store admin session");
        return redirect_error(
            "/login",
            &AppError::Internal("Could not start session".to_string()),
        );
    }

    tracing::info!("Admin logged in");
    Redirect::to("/")
}

/// Logout and clear session.
///
/// POST /logout
async fn logout(session: Session) -> Redirect {
    if let Err(e) = clear_current_admin(&session).await {
        tracing::warn!(error = %e, "Failed to clear admin session");
    }
    Redirect::to("/login")
}
