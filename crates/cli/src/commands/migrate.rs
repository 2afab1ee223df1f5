//! Database migration command.
//!
//! # Usage
//!
//! ```bash
//! sareine migrate
//! ```
//!
//! # Environment Variables
//!
//! - `ADMIN_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//!
//! # Migration Files
//!
//! Migrations live in `crates/admin/migrations/` and are embedded at build
//! time:
//! ```text
//! migrations/
//! ├── 20260101000000_create_shop_schema.sql
//! └── 20260101000001_create_admin_sessions.sql
//! ```

use sareine_admin::db;

use super::{CliError, database_url};

/// Run the admin database migrations.
///
/// # Errors
///
/// Returns an error if the database URL is missing, the connection fails,
/// or a migration cannot be applied.
pub async fn run() -> Result<(), CliError> {
    let database_url = database_url()?;

    tracing::info!("Connecting to database...");
    let pool = db::create_pool(&database_url).await?;

    tracing::info!("Running admin migrations...");
    db::run_migrations(&pool).await?;

    tracing::info!("Admin migrations complete!");
    Ok(())
}
