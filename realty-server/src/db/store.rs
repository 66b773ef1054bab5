//! Store traits the handlers depend on
//!
//! Postgres repositories implement these for production, and
//! [`MemoryStore`](super::memory::MemoryStore) implements them for tests.
//! Membership and ownership predicates are evaluated by the store, so a
//! membership miss comes back as `DbError::NotFound`.

use async_trait::async_trait;
use uuid::Uuid;

use super::DbError;
use crate::models::{
    Chat, ChatWithMessages, Message, MessageText, Post, PostFilter, PostInput, PostPatch,
    PostWithDetail, Profile, SaveOutcome, SeenUpdate,
};

/// Listings, their details and bookmarks
#[async_trait]
pub trait PostStore: Send + Sync {
    /// Posts matching every supplied filter, newest first.
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DbError>;

    /// Post with detail and owner profile.
    async fn get(&self, id: Uuid) -> Result<PostWithDetail, DbError>;

    /// Owner of a post.
    async fn owner_of(&self, id: Uuid) -> Result<Uuid, DbError>;

    /// Insert post and detail as one unit, owned by `owner`.
    async fn create(&self, owner: Uuid, input: &PostInput) -> Result<Post, DbError>;

    /// Change the fields present in `patch` as one unit.
    async fn update(&self, id: Uuid, patch: &PostPatch) -> Result<Post, DbError>;

    async fn delete(&self, id: Uuid) -> Result<(), DbError>;

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, DbError>;

    async fn is_saved(&self, user: Uuid, post: Uuid) -> Result<bool, DbError>;

    /// Remove the bookmark if present, otherwise create it.
    async fn toggle_saved(&self, user: Uuid, post: Uuid) -> Result<SaveOutcome, DbError>;

    /// Posts bookmarked by `user`, most recently saved first.
    async fn list_saved(&self, user: Uuid) -> Result<Vec<Post>, DbError>;
}

/// Chats scoped to their members
#[async_trait]
pub trait ChatStore: Send + Sync {
    /// Chats containing `member`, newest first.
    async fn list_for_member(&self, member: Uuid) -> Result<Vec<Chat>, DbError>;

    /// Chat with messages oldest first, if `member` belongs to it.
    async fn get_for_member(&self, id: Uuid, member: Uuid) -> Result<ChatWithMessages, DbError>;

    /// New chat with membership exactly `members`, in order.
    async fn create(&self, members: [Uuid; 2]) -> Result<Chat, DbError>;

    /// Record that `member` has seen the chat.
    async fn mark_seen(&self, id: Uuid, member: Uuid, update: SeenUpdate)
        -> Result<Chat, DbError>;

    /// Append a message and make the sender the only reader of the new state.
    async fn add_message(
        &self,
        chat_id: Uuid,
        sender: Uuid,
        text: &MessageText,
    ) -> Result<Message, DbError>;

    /// Number of `member`'s chats they have not seen.
    async fn count_unseen(&self, member: Uuid) -> Result<i64, DbError>;
}

/// Public user lookups
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Profiles for the given ids. Unknown ids are skipped.
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DbError>;
}
