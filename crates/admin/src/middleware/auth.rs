//! Authentication extractors for admin.
//!
//! A request is authenticated when its session carries a [`CurrentAdmin`]
//! (set by the login form) or when it presents the shared secret in the
//! `X-Admin-Secret` header.

use axum::{
    Json,
    extract::{FromRef, FromRequestParts, OriginalUri},
    http::{StatusCode, request::Parts},
    response::{IntoResponse, Redirect, Response},
};
use chrono::Utc;
use secrecy::{ExposeSecret, SecretString};
use sha2::{Digest, Sha256};
use tower_sessions::Session;

use crate::models::{CurrentAdmin, session_keys};
use crate::state::AppState;

/// Header carrying the shared secret for API clients.
pub const ADMIN_SECRET_HEADER: &str = "x-admin-secret";

/// Extractor that requires admin authentication.
///
/// If the admin is not logged in, returns a redirect to the login page
/// for HTML requests, or 401 Unauthorized for API requests.
///
/// # Example
///
/// ```rust,ignore
/// async fn protected_handler(
///     RequireAdminAuth(admin): RequireAdminAuth,
/// ) -> impl IntoResponse {
///     format!("Logged in since {}", admin.logged_in_at)
/// }
/// ```
pub struct RequireAdminAuth(pub CurrentAdmin);

/// Error returned when admin authentication is required but missing.
#[derive(Debug)]
pub enum AdminAuthRejection {
    /// Redirect to login page (for HTML requests).
    RedirectToLogin,
    /// Unauthorized response (for API requests).
    Unauthorized,
}

impl IntoResponse for AdminAuthRejection {
    fn into_response(self) -> Response {
        match self {
            Self::RedirectToLogin => Redirect::to("/login").into_response(),
            Self::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                Json(serde_json::json!({ "error": "Unauthorized" })),
            )
                .into_response(),
        }
    }
}

impl<S> FromRequestParts<S> for RequireAdminAuth
where
    AppState: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = AdminAuthRejection;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let app = AppState::from_ref(state);

        if let Some(provided) = parts
            .headers
            .get(ADMIN_SECRET_HEADER)
            .and_then(|v| v.to_str().ok())
        {
            if secret_matches(&app.config().admin_secret, provided) {
                return Ok(Self(CurrentAdmin {
                    logged_in_at: Utc::now(),
                }));
            }
            tracing::warn!("Rejected request with invalid admin secret header");
            return Err(AdminAuthRejection::Unauthorized);
        }

        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        admin.map(Self).ok_or_else(|| {
            // Nested routers see a stripped URI; the original tells API from pages
            let path = parts
                .extensions
                .get::<OriginalUri>()
                .map_or_else(|| parts.uri.path(), |uri| uri.0.path());
            if path.starts_with("/api/") {
                AdminAuthRejection::Unauthorized
            } else {
                AdminAuthRejection::RedirectToLogin
            }
        })
    }
}

/// Extractor that optionally gets the current admin.
///
/// Unlike `RequireAdminAuth`, this does not reject the request if the admin
/// is not logged in or the session layer is missing.
pub struct OptionalAdminAuth(pub Option<CurrentAdmin>);

impl<S> FromRequestParts<S> for OptionalAdminAuth
where
    S: Send + Sync,
{
    type Rejection = std::convert::Infallible;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let admin = match parts.extensions.get::<Session>() {
            Some(session) => session
                .get::<CurrentAdmin>(session_keys::CURRENT_ADMIN)
                .await
                .ok()
                .flatten(),
            None => None,
        };

        Ok(Self(admin))
    }
}

/// Compare a presented secret with the configured one.
///
/// Both sides are hashed first so the comparison runs over equal-length
/// digests in constant time.
#[must_use]
pub fn secret_matches(expected: &SecretString, provided: &str) -> bool {
    let expected = Sha256::digest(expected.expose_secret().as_bytes());
    let provided = Sha256::digest(provided.as_bytes());

    let mut result: u8 = 0;
    for (x, y) in expected.iter().zip(provided.iter()) {
        result |= x ^ y;
    }
    result == 0
}

/// Mark the session as logged in, with a fresh session id.
///
/// # Errors
///
/// Returns an error if the session cannot be modified.
pub async fn set_current_admin(
    session: &Session,
    admin: &CurrentAdmin,
) -> Result<(), tower_sessions::session::Error> {
    session.cycle_id().await?;
    session.insert(session_keys::CURRENT_ADMIN, admin).await
}

/// Drop all session data (logout).
///
/// # Errors
///
/// Returns an error if the session cannot be deleted.
pub async fn clear_current_admin(session: &Session) -> Result<(), tower_sessions::session::Error> {
    session.flush().await
}
