//! Public user fields

use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::Post;

/// Public profile of a user
#[derive(Debug, Clone, PartialEq, Eq, Serialize, FromRow)]
pub struct Profile {
    pub id: Uuid,
    pub username: String,
    pub avatar: Option<String>,
}

/// The caller's own listings and bookmarks
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProfilePosts {
    pub user_posts: Vec<Post>,
    pub saved_posts: Vec<Post>,
}

/// Result of toggling a bookmark
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Saved,
    Removed,
}
