//! Token command
//!
//! Prints a token the server accepts in the `token` cookie. Registration and
//! login live outside this service, so this is how local clients get one.

use anyhow::{bail, Context, Result};
use clap::Parser;
use uuid::Uuid;

use realty_server::auth::jwt::DEFAULT_TOKEN_TTL_DAYS;
use realty_server::auth::{AuthError, TokenKeys};

/// Arguments for the token command
#[derive(Parser, Debug)]
pub struct TokenArgs {
    /// User id to embed in the token
    #[arg(long)]
    pub user_id: Uuid,

    /// Signing secret (must match the server's)
    #[arg(long, env = "JWT_SECRET_KEY", hide_env_values = true)]
    pub secret: String,

    /// Days until the token expires
    #[arg(long, default_value_t = DEFAULT_TOKEN_TTL_DAYS)]
    pub ttl_days: i64,
}

pub fn run_token(args: TokenArgs) -> Result<()> {
    if args.secret.is_empty() {
        bail!("secret must not be empty");
    }

    let ttl = chrono::Duration::try_days(args.ttl_days).ok_or(AuthError::InvalidLifetime)?;

    let keys = TokenKeys::from_secret(args.secret.as_bytes());
    let token = keys
        .issue(args.user_id, ttl)
        .context("Failed to sign token")?;

    println!("{token}");
    Ok(())
}
