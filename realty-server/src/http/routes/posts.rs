//! Post endpoints
//!
//! Reads are public. Writes need a caller, and update/delete need the caller
//! to own the post.

use std::sync::Arc;

use axum::{
    extract::{Query, State},
    routing::get,
    Json, Router,
};
use uuid::Uuid;

use super::StatusMessage;
use crate::auth::{Caller, MaybeCaller};
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Post, PostFilter, PostInput, PostPatch, PostQuery, PostView};

/// GET /api/posts - list posts matching the query filters
async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<PostQuery>,
) -> Result<Json<Vec<Post>>, ApiError> {
    let filter = PostFilter::from(query);
    let posts = state.posts.list(&filter).await?;
    Ok(Json(posts))
}

/// GET /api/posts/{id} - one post with detail, owner and bookmark state
async fn get_post(
    State(state): State<Arc<AppState>>,
    ValidUuid(id): ValidUuid,
    MaybeCaller(caller): MaybeCaller,
) -> Result<Json<PostView>, ApiError> {
    let found = state.posts.get(id).await?;

    let is_saved = match caller {
        Some(user) => state.posts.is_saved(user, id).await?,
        None => false,
    };

    Ok(Json(PostView::new(found, is_saved)))
}

/// POST /api/posts - create a post owned by the caller
async fn create_post(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiJson(input): ApiJson<PostInput>,
) -> Result<Json<Post>, ApiError> {
    input.validate()?;

    let post = state.posts.create(caller, &input).await?;
    tracing::info!(post_id = %post.id, owner = %caller, "post created");
    Ok(Json(post))
}

async fn ensure_owner(state: &AppState, id: Uuid, caller: Uuid) -> Result<(), ApiError> {
    let owner = state.posts.owner_of(id).await?;
    if owner != caller {
        return Err(ApiError::forbidden("not authorized to modify this post"));
    }
    Ok(())
}

/// PUT /api/posts/{id} - change the post and detail fields that are sent
///
/// Ownership is checked before the body is looked at, so a non-owner always
/// gets 403.
async fn update_post(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ValidUuid(id): ValidUuid,
    body: Result<ApiJson<PostPatch>, ApiError>,
) -> Result<Json<Post>, ApiError> {
    ensure_owner(&state, id, caller).await?;
    let ApiJson(patch) = body?;
    patch.validate()?;

    let post = state.posts.update(id, &patch).await?;
    Ok(Json(post))
}

/// DELETE /api/posts/{id}
async fn delete_post(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ValidUuid(id): ValidUuid,
) -> Result<Json<StatusMessage>, ApiError> {
    ensure_owner(&state, id, caller).await?;

    state.posts.delete(id).await?;
    tracing::info!(post_id = %id, "post deleted");
    Ok(Json(StatusMessage::new("Post deleted")))
}

/// Post routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/posts", get(list_posts).post(create_post))
        .route(
            "/api/posts/{id}",
            get(get_post).put(update_post).delete(delete_post),
        )
}
