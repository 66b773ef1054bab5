//! Schema command

use anyhow::{Context, Result};
use clap::Parser;

use realty_server::db::{create_pool, migrations};

/// Arguments for the migrate command
#[derive(Parser, Debug)]
pub struct MigrateArgs {
    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,
}

/// Apply every schema statement; safe to run repeatedly
pub async fn run_migrate(args: MigrateArgs) -> Result<()> {
    let pool = create_pool(&args.database_url)
        .await
        .context("Failed to create database pool")?;

    migrations::run(&pool)
        .await
        .context("Failed to apply database schema")?;

    pool.close().await;
    println!("Schema is up to date");
    Ok(())
}
