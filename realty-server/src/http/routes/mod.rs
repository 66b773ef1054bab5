//! Route handlers organized by resource

pub mod health;
pub mod posts;
pub mod chats;
pub mod messages;
pub mod users;

use serde::Serialize;

/// `{"message": ...}` body for endpoints without a resource to return
#[derive(Debug, Serialize)]
pub struct StatusMessage {
    pub message: String,
}

impl StatusMessage {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}
