//! Database migration command.
//!
//! Migrations live in `crates/storefront/migrations/` and are embedded at
//! compile time. Servers never migrate on startup.

use super::{CommandError, connect};

/// Apply every pending migration.
pub async fn run() -> Result<(), CommandError> {
    let pool = connect().await?;

    let migrator = sqlx::migrate!("../storefront/migrations");
    tracing::info!(
        available = migrator.iter().count(),
        "Running commerce migrations..."
    );
    migrator.run(&pool).await?;

    tracing::info!("Migrations complete!");
    Ok(())
}
