//! HTTP middleware stack for admin.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Security headers
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler with the [`RequireAdminAuth`]
//! extractor.

pub mod auth;
pub mod security_headers;
pub mod session;

pub use auth::{
    ADMIN_SECRET_HEADER, OptionalAdminAuth, RequireAdminAuth, clear_current_admin, secret_matches,
    set_current_admin,
};
pub use security_headers::security_headers_middleware;
pub use session::{SESSION_COOKIE_NAME, create_session_layer, session_layer};
