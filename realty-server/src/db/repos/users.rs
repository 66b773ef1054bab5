//! User repository

use async_trait::async_trait;
use sqlx::PgPool;
use uuid::Uuid;

use super::DbError;
use crate::db::store::UserStore;
use crate::models::Profile;

/// User repository
#[derive(Clone)]
pub struct UserRepo {
    pool: PgPool,
}

impl UserRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl UserStore for UserRepo {
    async fn profiles(&self, ids: &[Uuid]) -> Result<Vec<Profile>, DbError> {
        if ids.is_empty() {
            return Ok(vec![]);
        }

        let profiles = sqlx::query_as::<_, Profile>(
            "SELECT id, username, avatar FROM users WHERE id = ANY($1)",
        )
        .bind(ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(profiles)
    }
}
