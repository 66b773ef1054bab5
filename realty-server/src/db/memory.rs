//! In-memory store
//!
//! Implements every store trait over plain vectors behind one mutex.
//! Used by the router tests and for running the API without Postgres.

use std::cmp::Reverse;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use super::store::{ChatStore, PostStore, UserStore};
use super::DbError;
use crate::models::{
    Chat, ChatWithMessages, Message, MessageText, Post, PostDetail, PostDetailData,
    PostDetailPatch, PostFilter, PostInput, PostPatch, PostWithDetail, Profile, SaveOutcome,
    SeenUpdate,
};

#[derive(Default)]
struct Tables {
    users: Vec<Profile>,
    posts: Vec<Post>,
    details: Vec<PostDetail>,
    saved: Vec<(Uuid, Uuid, DateTime<Utc>)>,
    chats: Vec<Chat>,
    messages: Vec<Message>,
}

impl Tables {
    fn post(&self, id: Uuid) -> Result<&Post, DbError> {
        self.posts
            .iter()
            .find(|p| p.id == id)
            .ok_or_else(|| DbError::not_found("post", id))
    }

    fn member_chat_mut(&mut self, id: Uuid, member: Uuid) -> Result<&mut Chat, DbError> {
        self.chats
            .iter_mut()
            .find(|c| c.id == id && c.is_member(member))
            .ok_or_else(|| DbError::not_found("chat", id))
    }

    fn write_detail(&mut self, post_id: Uuid, data: &PostDetailData) {
        let existing = self.details.iter().position(|d| d.post_id == post_id);
        let detail = PostDetail {
            id: existing.map_or_else(Uuid::new_v4, |i| self.details[i].id),
            description: data.description.clone(),
            utilities: data.utilities.clone(),
            pet: data.pet.clone(),
            income: data.income.clone(),
            size: data.size,
            school: data.school,
            bus: data.bus,
            restaurant: data.restaurant,
            post_id,
        };
        match existing {
            Some(i) => self.details[i] = detail,
            None => self.details.push(detail),
        }
    }

    fn patch_detail(&mut self, post_id: Uuid, patch: &PostDetailPatch) {
        if !self.details.iter().any(|d| d.post_id == post_id) {
            self.write_detail(post_id, &PostDetailData::default());
        }
        if let Some(detail) = self.details.iter_mut().find(|d| d.post_id == post_id) {
            patch.apply(detail);
        }
    }
}

fn newest_first(mut posts: Vec<Post>) -> Vec<Post> {
    posts.sort_by_key(|p| Reverse(p.created_at));
    posts
}

/// Store backed by process memory
#[derive(Clone, Default)]
pub struct MemoryStore {
    tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn lock(&self) -> MutexGuard<'_, Tables> {
        // A poisoned lock only means another test panicked mid-write
        self.tables.lock().unwrap_or_else(|e| e.into_inner())
    }

    /// Add a user and return its profile.
    pub fn insert_user(&self, username: &str, avatar: Option<&str>) -> Profile {
        let profile = Profile {
            id: Uuid::new_v4(),
            username: username.to_owned(),
            avatar: avatar.map(str::to_owned),
        };
        self.lock().users.push(profile.clone());
        profile
    }

    /// Number of detail records stored for a post.
    pub fn detail_count(&self, post_id: Uuid) -> usize {
        self.lock()
            .details
            .iter()
            .filter(|d| d.post_id == post_id)
            .count()
    }
}

#[async_trait]
impl PostStore for MemoryStore {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DbError> {
        let tables = self.lock();
        let posts = tables
            .posts
            .iter()
            .filter(|p| filter.matches(p))
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn get(&self, id: Uuid) -> Result<PostWithDetail, DbError> {
        let tables = self.lock();
        let post = tables.post(id)?.clone();
        let owner = tables
            .users
            .iter()
            .find(|u| u.id == post.user_id)
            .cloned()
            .ok_or_else(|| DbError::not_found("post", id))?;
        let detail = tables.details.iter().find(|d| d.post_id == id).cloned();

        Ok(PostWithDetail {
            post,
            detail,
            owner,
        })
    }

    async fn owner_of(&self, id: Uuid) -> Result<Uuid, DbError> {
        Ok(self.lock().post(id)?.user_id)
    }

    async fn create(&self, owner: Uuid, input: &PostInput) -> Result<Post, DbError> {
        let data = &input.post_data;
        let post = Post {
            id: Uuid::new_v4(),
            title: data.title.clone(),
            price: data.price,
            images: data.images.clone(),
            address: data.address.clone(),
            city: data.city.clone(),
            bedroom: data.bedroom,
            bathroom: data.bathroom,
            latitude: data.latitude.clone(),
            longitude: data.longitude.clone(),
            listing_type: data.listing_type,
            property: data.property,
            user_id: owner,
            created_at: Utc::now(),
        };

        let mut tables = self.lock();
        tables.posts.push(post.clone());
        tables.write_detail(post.id, &input.post_detail);
        Ok(post)
    }

    async fn update(&self, id: Uuid, patch: &PostPatch) -> Result<Post, DbError> {
        let mut tables = self.lock();
        let post = tables
            .posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or_else(|| DbError::not_found("post", id))?;

        patch.post_data.apply(post);
        let updated = post.clone();

        if let Some(detail_patch) = &patch.post_detail {
            tables.patch_detail(id, detail_patch);
        }
        Ok(updated)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let mut tables = self.lock();
        tables.post(id)?;

        tables.posts.retain(|p| p.id != id);
        tables.details.retain(|d| d.post_id != id);
        tables.saved.retain(|(_, post, _)| *post != id);
        Ok(())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, DbError> {
        let tables = self.lock();
        let posts = tables
            .posts
            .iter()
            .filter(|p| p.user_id == owner)
            .cloned()
            .collect();
        Ok(newest_first(posts))
    }

    async fn is_saved(&self, user: Uuid, post: Uuid) -> Result<bool, DbError> {
        Ok(self
            .lock()
            .saved
            .iter()
            .any(|(u, p, _)| *u == user && *p == post))
    }

    async fn toggle_saved(&self, user: Uuid, post: Uuid) -> Result<SaveOutcome, DbError> {
        let mut tables = self.lock();
        let before = tables.saved.len();
        tables.saved.retain(|(u, p, _)| !(*u == user && *p == post));
        if tables.saved.len() < before {
            return Ok(SaveOutcome::Removed);
        }

        tables.post(post)?;
        tables.saved.push((user, post, Utc::now()));
        Ok(SaveOutcome::Saved)
    }

    async fn list_saved(&self, user: Uuid) -> Result<Vec<Post>, DbError> {
        let tables = self.lock();
        let mut saved: Vec<_> = tables
            .saved
            .iter()
            .filter(|(u, _, _)| *u == user)
            .collect();
        saved.sort_by_key(|(_, _, at)| Reverse(*at));

        Ok(saved
            .into_iter()
            .filter_map(|(_, post, _)| tables.posts.iter().find(|p| p.id == *post).cloned())
            .collect())
    }
}

#[async_trait]
impl ChatStore for MemoryStore {
    async fn list_for_member(&self, member: Uuid) -> Result<Vec<Chat>, DbError> {
        let tables = self.lock();
        let mut chats: Vec<Chat> = tables
            .chats
            .iter()
            .filter(|c| c.is_member(member))
            .cloned()
            .collect();
        chats.sort_by_key(|c| Reverse(c.created_at));
        Ok(chats)
    }

    async fn get_for_member(&self, id: Uuid, member: Uuid) -> Result<ChatWithMessages, DbError> {
        let mut tables = self.lock();
        let chat = tables.member_chat_mut(id, member)?.clone();
        let mut messages: Vec<Message> = tables
            .messages
            .iter()
            .filter(|m| m.chat_id == id)
            .cloned()
            .collect();
        messages.sort_by_key(|m| m.created_at);

        Ok(ChatWithMessages { chat, messages })
    }

    async fn create(&self, members: [Uuid; 2]) -> Result<Chat, DbError> {
        let chat = Chat {
            id: Uuid::new_v4(),
            user_ids: members.to_vec(),
            seen_by: vec![],
            last_message: None,
            created_at: Utc::now(),
        };
        self.lock().chats.push(chat.clone());
        Ok(chat)
    }

    async fn mark_seen(
        &self,
        id: Uuid,
        member: Uuid,
        update: SeenUpdate,
    ) -> Result<Chat, DbError> {
        let mut tables = self.lock();
        let chat = tables.member_chat_mut(id, member)?;
        chat.apply_seen(member, update);
        Ok(chat.clone())
    }

    async fn add_message(
        &self,
        chat_id: Uuid,
        sender: Uuid,
        text: &MessageText,
    ) -> Result<Message, DbError> {
        let mut tables = self.lock();
        let chat = tables.member_chat_mut(chat_id, sender)?;
        chat.apply_seen(sender, SeenUpdate::Reset);
        chat.last_message = Some(text.as_str().to_owned());

        let message = Message {
            id: Uuid::new_v4(),
            chat_id,
            user_id: sender,
            text: text.as_str().to_owned(),
            created_at: Utc::now(),
        };
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn count_unseen(&self, member: Uuid) -> Result<i64, DbError> {
        let count = self
            .lock()
            .chats
            .iter()
            .filter(|c| c.is_member(member) && !c.has_seen(member))
            .count();
        Ok(count as i64)
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DbError> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }
}
