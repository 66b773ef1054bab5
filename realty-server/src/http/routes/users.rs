//! User endpoints: bookmarks, profile listings and unread count

use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, post},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use super::StatusMessage;
use crate::auth::Caller;
use crate::http::error::ApiError;
use crate::http::extractors::ApiJson;
use crate::http::server::AppState;
use crate::models::{ProfilePosts, SaveOutcome};

/// Save post request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SavePostRequest {
    pub post_id: Uuid,
}

/// POST /api/users/save - bookmark a post, or remove the bookmark if present
async fn toggle_saved(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<SavePostRequest>,
) -> Result<Json<StatusMessage>, ApiError> {
    let message = match state.posts.toggle_saved(caller, req.post_id).await? {
        SaveOutcome::Saved => "Post saved",
        SaveOutcome::Removed => "Post removed from saved list",
    };
    Ok(Json(StatusMessage::new(message)))
}

/// GET /api/users/profilePosts - caller's own and bookmarked posts
async fn profile_posts(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<Json<ProfilePosts>, ApiError> {
    let (user_posts, saved_posts) = tokio::try_join!(
        state.posts.list_by_owner(caller),
        state.posts.list_saved(caller),
    )?;

    Ok(Json(ProfilePosts {
        user_posts,
        saved_posts,
    }))
}

/// GET /api/users/notification - number of chats the caller has not seen
async fn notification_count(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<Json<i64>, ApiError> {
    let count = state.chats.count_unseen(caller).await?;
    Ok(Json(count))
}

/// User routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/users/save", post(toggle_saved))
        .route("/api/users/profilePosts", get(profile_posts))
        .route("/api/users/notification", get(notification_count))
}
