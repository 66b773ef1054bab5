//! HTTP server command
//!
//! Connects to PostgreSQL, applies the schema unless told not to, and runs
//! the API until Ctrl+C or SIGTERM.

use std::net::{IpAddr, SocketAddr};

use anyhow::{Context, Result};
use clap::Parser;

use realty_server::auth::TOKEN_COOKIE;
use realty_server::db::{create_pool_with_options, migrations};
use realty_server::{run_server, ServerConfig};

/// Arguments for the serve command
#[derive(Parser, Debug)]
pub struct ServeArgs {
    /// Interface to bind to
    #[arg(long, env = "BIND_HOST", default_value = "127.0.0.1")]
    pub host: IpAddr,

    /// Port to listen on
    #[arg(long, short = 'p', env = "PORT", default_value_t = 8800)]
    pub port: u16,

    /// Origin allowed to make credentialed cross-origin requests
    #[arg(long, env = "CLIENT_URL", default_value = "http://localhost:5173")]
    pub client_url: String,

    /// Secret used to verify identity tokens
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub jwt_secret: String,

    /// Database URL
    #[arg(long, env = "DATABASE_URL", hide_env_values = true)]
    pub database_url: String,

    /// Maximum pooled database connections
    #[arg(long, env = "MAX_CONNECTIONS", default_value_t = 5)]
    pub max_connections: u32,

    /// Do not apply the schema before serving
    #[arg(long)]
    pub skip_migrations: bool,
}

/// Run the HTTP server
pub async fn run_serve(args: ServeArgs) -> Result<()> {
    let bind_addr = SocketAddr::new(args.host, args.port);
    tracing::info!("Starting realty server on {}", bind_addr);

    let pool = create_pool_with_options(&args.database_url, args.max_connections)
        .await
        .context("Failed to create database pool")?;

    if args.skip_migrations {
        tracing::debug!("skipping migrations");
    } else {
        migrations::run(&pool)
            .await
            .context("Failed to apply database schema")?;
    }

    let config = ServerConfig {
        bind_addr,
        client_origin: args.client_url,
        jwt_secret: args.jwt_secret,
        cookie_name: TOKEN_COOKIE.to_string(),
    };

    // Blocks until shutdown
    run_server(pool, config).await.context("Server error")?;

    Ok(())
}
