//! # Turfy Admin API Main Entry Point
//!
//! This is the main entry point for the Turfy admin API service.

use anyhow::Context;
use clap::{Parser, Subcommand};
use migration::{Migrator, MigratorTrait};
use turfy_admin::{
    config::ConfigLoader, db::init_pool, seeds::seed_reference_data, server::run_server,
    telemetry::init_tracing,
};

/// Turfy admin API
#[derive(Parser, Debug)]
#[command(name = "turfy-admin")]
#[command(author, version, about, long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Default)]
enum Command {
    /// Run migrations, optionally seed reference data, then serve HTTP
    #[default]
    Serve,
    /// Apply pending database migrations
    Migrate,
    /// Insert default sports types and amenities
    Seed,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Load configuration from layered env files and variables
    let config = ConfigLoader::new()
        .load()
        .context("Failed to load configuration")?;

    init_tracing(&config).context("Failed to initialize tracing")?;

    tracing::info!(profile = %config.profile, "Loaded configuration");
    if let Ok(redacted_json) = config.redacted_json() {
        tracing::debug!(config = %redacted_json, "Effective configuration");
    }

    let db = init_pool(&config).await?;

    match cli.command.unwrap_or_default() {
        Command::Serve => {
            Migrator::up(&db, None)
                .await
                .context("Failed to run migrations")?;
            if config.seed_reference_data {
                seed_reference_data(&db).await?;
            }
            run_server(config, db).await
        }
        Command::Migrate => {
            Migrator::up(&db, None)
                .await
                .context("Failed to run migrations")?;
            tracing::info!("Migrations applied");
            Ok(())
        }
        Command::Seed => {
            seed_reference_data(&db).await?;
            Ok(())
        }
    }
}
