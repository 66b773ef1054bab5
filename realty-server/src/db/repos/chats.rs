//! Chat repository
//!
//! Every statement carries `$member = ANY(user_ids)`, so non-members see
//! the same result as a missing chat.

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::db::store::ChatStore;
use crate::models::{Chat, ChatWithMessages, Message, MessageText, SeenUpdate};

/// Chat repository
#[derive(Clone)]
pub struct ChatRepo {
    pool: PgPool,
}

impl ChatRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ChatStore for ChatRepo {
    async fn list_for_member(&self, member: Uuid) -> Result<Vec<Chat>, DbError> {
        let chats = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_ids, seen_by, last_message, created_at
            FROM chats
            WHERE $1 = ANY(user_ids)
            ORDER BY created_at DESC
            "#,
        )
        .bind(member)
        .fetch_all(&self.pool)
        .await?;

        Ok(chats)
    }

    async fn get_for_member(&self, id: Uuid, member: Uuid) -> Result<ChatWithMessages, DbError> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            SELECT id, user_ids, seen_by, last_message, created_at
            FROM chats
            WHERE id = $1 AND $2 = ANY(user_ids)
            "#,
        )
        .bind(id)
        .bind(member)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("chat", id))?;

        let messages = sqlx::query_as::<_, Message>(
            r#"
            SELECT id, chat_id, user_id, text, created_at
            FROM messages
            WHERE chat_id = $1
            ORDER BY created_at ASC
            "#,
        )
        .bind(id)
        .fetch_all(&self.pool)
        .await?;

        Ok(ChatWithMessages { chat, messages })
    }

    async fn create(&self, members: [Uuid; 2]) -> Result<Chat, DbError> {
        let chat = sqlx::query_as::<_, Chat>(
            r#"
            INSERT INTO chats (user_ids)
            VALUES ($1)
            RETURNING id, user_ids, seen_by, last_message, created_at
            "#,
        )
        .bind(&members[..])
        .fetch_one(&self.pool)
        .await?;

        Ok(chat)
    }

    async fn mark_seen(
        &self,
        id: Uuid,
        member: Uuid,
        update: SeenUpdate,
    ) -> Result<Chat, DbError> {
        let sql = match update {
            SeenUpdate::Add => {
                r#"
                UPDATE chats SET seen_by = CASE
                    WHEN $2 = ANY(seen_by) THEN seen_by
                    ELSE array_append(seen_by, $2)
                END
                WHERE id = $1 AND $2 = ANY(user_ids)
                RETURNING id, user_ids, seen_by, last_message, created_at
                "#
            }
            SeenUpdate::Reset => {
                r#"
                UPDATE chats SET seen_by = ARRAY[$2]::uuid[]
                WHERE id = $1 AND $2 = ANY(user_ids)
                RETURNING id, user_ids, seen_by, last_message, created_at
                "#
            }
        };

        sqlx::query_as::<_, Chat>(sql)
            .bind(id)
            .bind(member)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DbError::not_found("chat", id))
    }

    async fn add_message(
        &self,
        chat_id: Uuid,
        sender: Uuid,
        text: &MessageText,
    ) -> Result<Message, DbError> {
        let mut tx = self.pool.begin().await?;

        let updated = sqlx::query(
            r#"
            UPDATE chats SET seen_by = ARRAY[$2]::uuid[], last_message = $3
            WHERE id = $1 AND $2 = ANY(user_ids)
            "#,
        )
        .bind(chat_id)
        .bind(sender)
        .bind(text.as_str())
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            return Err(DbError::not_found("chat", chat_id));
        }

        let message = sqlx::query_as::<_, Message>(
            r#"
            INSERT INTO messages (chat_id, user_id, text)
            VALUES ($1, $2, $3)
            RETURNING id, chat_id, user_id, text, created_at
            "#,
        )
        .bind(chat_id)
        .bind(sender)
        .bind(text.as_str())
        .fetch_one(&mut *tx)
        .await?;

        tx.commit().await?;
        Ok(message)
    }

    async fn count_unseen(&self, member: Uuid) -> Result<i64, DbError> {
        let (count,): (i64,) = sqlx::query_as(
            r#"
            SELECT COUNT(*)
            FROM chats
            WHERE $1 = ANY(user_ids) AND NOT ($1 = ANY(seen_by))
            "#,
        )
        .bind(member)
        .fetch_one(&self.pool)
        .await?;

        Ok(count)
    }
}
