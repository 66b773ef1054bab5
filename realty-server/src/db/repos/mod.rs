//! Postgres repository implementations
//!
//! Each repository follows these patterns:
//! - Single JOIN queries for reads (no N+1)
//! - Ownership and membership checked in the WHERE clause
//! - Transactions for parent/child writes

pub mod posts;
pub mod chats;
pub mod users;

pub use posts::PostRepo;
pub use chats::ChatRepo;
pub use users::UserRepo;

/// Database error type
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error("database error: {0}")]
    Sqlx(#[from] sqlx::Error),

    #[error("not found: {resource} '{id}'")]
    NotFound { resource: &'static str, id: String },
}

impl DbError {
    pub(crate) fn not_found(resource: &'static str, id: impl ToString) -> Self {
        Self::NotFound {
            resource,
            id: id.to_string(),
        }
    }
}
