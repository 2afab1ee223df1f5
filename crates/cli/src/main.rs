//! Sareine CLI - database migrations and data import.
//!
//! # Usage
//!
//! ```bash
//! # Run admin database migrations
//! sareine migrate
//!
//! # Import an export of orders, preorders, products, users and settings
//! sareine import ./export.yaml
//!
//! # Parse and count without writing
//! sareine import ./export.json --dry-run
//! ```
//!
//! # Commands
//!
//! - `migrate` - Run database migrations
//! - `import` - Upsert documents from a YAML or JSON file

#![cfg_attr(not(test), forbid(unsafe_code))]

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "sareine")]
#[command(author, version, about = "Sareine admin CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Import documents from a YAML or JSON export
    Import {
        /// Path to the export file (.yaml, .yml or .json)
        file: String,

        /// Parse the file and report counts without writing
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    // Initialize tracing
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| "sareine_cli=info,sareine_admin=info".into());
    tracing_subscriber::fmt().with_env_filter(env_filter).init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CliError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await?,
        Commands::Import { file, dry_run } => {
            let summary = commands::import::run(&file, dry_run).await?;
            tracing::info!(?summary, dry_run, "Processed {file}");
        }
    }
    Ok(())
}
