//! Two-party chats and their messages

use chrono::{DateTime, Utc};
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

use super::{Profile, ValidationError};

/// Maximum length for message text (64KB)
const MAX_TEXT_LEN: usize = 65536;

/// Chat record from database
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Chat {
    pub id: Uuid,
    #[serde(rename = "userIDs")]
    pub user_ids: Vec<Uuid>,
    pub seen_by: Vec<Uuid>,
    pub last_message: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Chat {
    pub fn is_member(&self, user: Uuid) -> bool {
        self.user_ids.contains(&user)
    }

    /// The member that is not `caller`, if any.
    pub fn counterpart(&self, caller: Uuid) -> Option<Uuid> {
        self.user_ids.iter().copied().find(|id| *id != caller)
    }

    pub fn has_seen(&self, user: Uuid) -> bool {
        self.seen_by.contains(&user)
    }

    /// Apply a read-state change in place.
    pub fn apply_seen(&mut self, member: Uuid, update: SeenUpdate) {
        match update {
            SeenUpdate::Add => {
                if !self.has_seen(member) {
                    self.seen_by.push(member);
                }
            }
            SeenUpdate::Reset => self.seen_by = vec![member],
        }
    }
}

/// How a member's read-state is recorded.
///
/// Opening a chat adds the member to `seenBy` at most once. An explicit read or a
/// new message makes the member the only one who has seen the latest state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SeenUpdate {
    Add,
    Reset,
}

/// Message record from database
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Message {
    pub id: Uuid,
    pub chat_id: Uuid,
    pub user_id: Uuid,
    pub text: String,
    pub created_at: DateTime<Utc>,
}

/// Chat in the caller's list, with the other member's profile
#[derive(Debug, Clone, Serialize)]
pub struct ChatSummary {
    #[serde(flatten)]
    pub chat: Chat,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub receiver: Option<Profile>,
}

/// Chat with its messages, oldest first
#[derive(Debug, Clone, Serialize)]
pub struct ChatWithMessages {
    #[serde(flatten)]
    pub chat: Chat,
    pub messages: Vec<Message>,
}

/// Validated message text
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MessageText(String);

impl MessageText {
    /// Create message text.
    ///
    /// # Rules
    /// - Must contain a non-whitespace character
    /// - Max 64KB (65536 bytes)
    ///
    /// # Example
    /// ```
    /// use realty_server::models::MessageText;
    ///
    /// assert!(MessageText::new("Is it still available?").is_ok());
    /// assert!(MessageText::new("   ").is_err());
    /// ```
    pub fn new(s: &str) -> Result<Self, ValidationError> {
        if s.trim().is_empty() {
            return Err(ValidationError::Empty { field: "text" });
        }
        if s.len() > MAX_TEXT_LEN {
            return Err(ValidationError::TooLong {
                field: "text",
                max: MAX_TEXT_LEN,
            });
        }

        Ok(Self(s.to_owned()))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for MessageText {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn chat_between(a: Uuid, b: Uuid) -> Chat {
        Chat {
            id: Uuid::new_v4(),
            user_ids: vec![a, b],
            seen_by: vec![],
            last_message: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn counterpart_is_other_member() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let chat = chat_between(a, b);
        assert_eq!(chat.counterpart(a), Some(b));
        assert_eq!(chat.counterpart(b), Some(a));
    }

    #[test]
    fn seen_add_is_idempotent() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut chat = chat_between(a, b);
        chat.apply_seen(a, SeenUpdate::Add);
        chat.apply_seen(a, SeenUpdate::Add);
        chat.apply_seen(b, SeenUpdate::Add);
        assert_eq!(chat.seen_by, vec![a, b]);
    }

    #[test]
    fn seen_reset_discards_prior() {
        let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
        let mut chat = chat_between(a, b);
        chat.seen_by = vec![a, b, a];
        chat.apply_seen(b, SeenUpdate::Reset);
        assert_eq!(chat.seen_by, vec![b]);
    }

    #[test]
    fn text_limits() {
        assert!(MessageText::new("hi").is_ok());
        assert_eq!(
            MessageText::new("\n\t ").unwrap_err(),
            ValidationError::Empty { field: "text" }
        );

        let over = "a".repeat(65537);
        assert!(matches!(
            MessageText::new(&over).unwrap_err(),
            ValidationError::TooLong { max: 65536, .. }
        ));
    }

    #[test]
    fn summary_omits_missing_receiver() {
        let chat = chat_between(Uuid::new_v4(), Uuid::new_v4());
        let value = serde_json::to_value(ChatSummary {
            chat,
            receiver: None,
        })
        .unwrap();
        assert!(value.get("receiver").is_none());
        assert_eq!(value["userIDs"].as_array().unwrap().len(), 2);
    }
}
