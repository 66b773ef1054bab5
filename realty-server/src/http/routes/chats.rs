//! Chat endpoints
//!
//! All routes require a caller. A chat the caller is not a member of is
//! reported as not found.

use std::collections::HashMap;
use std::sync::Arc;

use axum::{
    extract::State,
    routing::{get, put},
    Json, Router,
};
use serde::Deserialize;
use uuid::Uuid;

use crate::auth::Caller;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Chat, ChatSummary, ChatWithMessages, SeenUpdate};

/// Create chat request
#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CreateChatRequest {
    pub receiver_id: Option<Uuid>,
}

/// GET /api/chats - the caller's chats with the other member's profile
async fn list_chats(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
) -> Result<Json<Vec<ChatSummary>>, ApiError> {
    let chats = state.chats.list_for_member(caller).await?;

    let mut receiver_ids: Vec<Uuid> = chats.iter().filter_map(|c| c.counterpart(caller)).collect();
    receiver_ids.sort_unstable();
    receiver_ids.dedup();

    let profiles: HashMap<Uuid, _> = state
        .users
        .profiles(&receiver_ids)
        .await?
        .into_iter()
        .map(|p| (p.id, p))
        .collect();

    let summaries = chats
        .into_iter()
        .map(|chat| {
            let receiver = chat
                .counterpart(caller)
                .and_then(|id| profiles.get(&id).cloned());
            if receiver.is_none() {
                tracing::warn!(chat_id = %chat.id, "chat counterpart could not be resolved");
            }
            ChatSummary { chat, receiver }
        })
        .collect();

    Ok(Json(summaries))
}

/// GET /api/chats/{id} - chat with messages; marks it seen by the caller
async fn get_chat(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ValidUuid(id): ValidUuid,
) -> Result<Json<ChatWithMessages>, ApiError> {
    let mut found = state.chats.get_for_member(id, caller).await?;
    found.chat = state.chats.mark_seen(id, caller, SeenUpdate::Add).await?;
    Ok(Json(found))
}

/// POST /api/chats - start a chat with another user
async fn create_chat(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ApiJson(req): ApiJson<CreateChatRequest>,
) -> Result<Json<Chat>, ApiError> {
    let receiver = req
        .receiver_id
        .ok_or_else(|| ApiError::bad_request("receiverId is required"))?;
    if receiver == caller {
        return Err(ApiError::bad_request("cannot start a chat with yourself"));
    }

    let chat = state.chats.create([caller, receiver]).await?;
    tracing::info!(chat_id = %chat.id, "chat created");
    Ok(Json(chat))
}

/// PUT /api/chats/{id}/read - caller becomes the only reader of the latest state
async fn read_chat(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ValidUuid(id): ValidUuid,
) -> Result<Json<Chat>, ApiError> {
    let chat = state.chats.mark_seen(id, caller, SeenUpdate::Reset).await?;
    Ok(Json(chat))
}

/// Chat routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new()
        .route("/api/chats", get(list_chats).post(create_chat))
        .route("/api/chats/{id}", get(get_chat))
        .route("/api/chats/{id}/read", put(read_chat).patch(read_chat))
}
