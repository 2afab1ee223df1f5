//! CLI command implementations.

pub mod import;
pub mod migrate;

use secrecy::SecretString;

/// Errors shared by every command.
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(&'static str),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Migration error: {0}")]
    Migration(#[from] sqlx::migrate::MigrateError),

    #[error("Store error: {0}")]
    Store(#[from] sareine_admin::db::RepositoryError),

    #[error("Failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },

    #[error("Invalid import file: {0}")]
    Parse(String),

    #[error("Unsupported file extension (expected .yaml, .yml or .json): {0}")]
    UnsupportedFormat(String),
}

/// Database URL from `ADMIN_DATABASE_URL`, falling back to `DATABASE_URL`.
pub(crate) fn database_url() -> Result<SecretString, CliError> {
    let _ = dotenvy::dotenv();

    std::env::var("ADMIN_DATABASE_URL")
        .or_else(|_| std::env::var("DATABASE_URL"))
        .map(SecretString::from)
        .map_err(|_| CliError::MissingEnvVar("ADMIN_DATABASE_URL"))
}
