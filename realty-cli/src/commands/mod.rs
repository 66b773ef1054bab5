//! Command implementations

mod migrate;
mod serve;
mod token;

pub use migrate::{run_migrate, MigrateArgs};
pub use serve::{run_serve, ServeArgs};
pub use token::{run_token, TokenArgs};
