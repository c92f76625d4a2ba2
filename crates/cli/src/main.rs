//! Distrimart CLI - Database migrations and seeding.
//!
//! # Usage
//!
//! ```bash
//! # Apply pending migrations to the commerce schema
//! dm-cli migrate
//!
//! # Check a seed file without touching the database
//! dm-cli seed crates/cli/seed/demo.yaml --dry-run
//!
//! # Load categories, products, distributors and pricing rules
//! dm-cli seed crates/cli/seed/demo.yaml
//! ```
//!
//! Both commands read `DATABASE_URL` (a `.env` file is honored).

#![cfg_attr(not(test), forbid(unsafe_code))]

use std::path::PathBuf;

use clap::{Parser, Subcommand};

mod commands;

#[derive(Parser)]
#[command(name = "dm-cli")]
#[command(author, version, about = "Distrimart CLI tools")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Run database migrations
    Migrate,
    /// Load seed data from a YAML file
    Seed {
        /// Path to the seed file
        file: PathBuf,

        /// Validate the file and exit without connecting
        #[arg(long)]
        dry_run: bool,
    },
}

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let cli = Cli::parse();

    if let Err(e) = run(cli).await {
        tracing::error!("Command failed: {e}");
        std::process::exit(1);
    }
}

async fn run(cli: Cli) -> Result<(), commands::CommandError> {
    match cli.command {
        Commands::Migrate => commands::migrate::run().await,
        Commands::Seed { file, dry_run } => commands::seed::run(&file, dry_run).await,
    }
}
