//! Message endpoints

use std::sync::Arc;

use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;

use crate::auth::Caller;
use crate::http::error::ApiError;
use crate::http::extractors::{ApiJson, ValidUuid};
use crate::http::server::AppState;
use crate::models::{Message, MessageText};

/// Add message request
#[derive(Deserialize)]
pub struct AddMessageRequest {
    pub text: String,
}

/// POST /api/messages/{chatId} - add a message to a chat the caller belongs to
async fn add_message(
    State(state): State<Arc<AppState>>,
    Caller(caller): Caller,
    ValidUuid(chat_id): ValidUuid,
    ApiJson(req): ApiJson<AddMessageRequest>,
) -> Result<Json<Message>, ApiError> {
    let text = MessageText::new(&req.text)?;

    let message = state.chats.add_message(chat_id, caller, &text).await?;
    Ok(Json(message))
}

/// Message routes
pub fn router() -> Router<Arc<AppState>> {
    Router::new().route("/api/messages/{chat_id}", post(add_message))
}
