//! Post repository
//!
//! Posts and their details are written together in one transaction.
//! Updates merge: a column absent from the patch keeps its stored value.
//! Bookmark uniqueness is left to the `(user_id, post_id)` constraint.

use async_trait::async_trait;
use sqlx::postgres::PgRow;
use sqlx::{FromRow, PgPool, Postgres, Row, Transaction};
use uuid::Uuid;

use super::DbError;
use crate::db::store::PostStore;
use crate::models::{
    Post, PostDetail, PostDetailData, PostDetailPatch, PostFilter, PostInput, PostPatch,
    PostWithDetail, Profile, SaveOutcome,
};

macro_rules! post_columns {
    () => {
        "p.id, p.title, p.price, p.images, p.address, p.city, p.bedroom, p.bathroom, \
         p.latitude, p.longitude, p.type, p.property, p.user_id, p.created_at"
    };
}

/// Post repository
#[derive(Clone)]
pub struct PostRepo {
    pool: PgPool,
}

impl PostRepo {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert_detail(
        tx: &mut Transaction<'_, Postgres>,
        post_id: Uuid,
        detail: &PostDetailData,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO post_details
                (post_id, description, utilities, pet, income, size, school, bus, restaurant)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
            "#,
        )
        .bind(post_id)
        .bind(&detail.description)
        .bind(detail.utilities.as_deref())
        .bind(detail.pet.as_deref())
        .bind(detail.income.as_deref())
        .bind(detail.size)
        .bind(detail.school)
        .bind(detail.bus)
        .bind(detail.restaurant)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }

    /// Merge the present detail fields, creating the row if it is missing.
    async fn patch_detail(
        tx: &mut Transaction<'_, Postgres>,
        post_id: Uuid,
        detail: &PostDetailPatch,
    ) -> Result<(), DbError> {
        sqlx::query(
            r#"
            INSERT INTO post_details
                (post_id, description, utilities, pet, income, size, school, bus, restaurant)
            VALUES ($1, COALESCE($2::text, ''), $3, $4, $5, $6, $7, $8, $9)
            ON CONFLICT (post_id) DO UPDATE SET
                description = COALESCE($2::text, post_details.description),
                utilities = COALESCE($3, post_details.utilities),
                pet = COALESCE($4, post_details.pet),
                income = COALESCE($5, post_details.income),
                size = COALESCE($6, post_details.size),
                school = COALESCE($7, post_details.school),
                bus = COALESCE($8, post_details.bus),
                restaurant = COALESCE($9, post_details.restaurant)
            "#,
        )
        .bind(post_id)
        .bind(detail.description.as_deref())
        .bind(detail.utilities.as_deref())
        .bind(detail.pet.as_deref())
        .bind(detail.income.as_deref())
        .bind(detail.size)
        .bind(detail.school)
        .bind(detail.bus)
        .bind(detail.restaurant)
        .execute(&mut **tx)
        .await?;

        Ok(())
    }
}

fn detail_from_row(row: &PgRow, post_id: Uuid) -> Result<Option<PostDetail>, sqlx::Error> {
    let Some(id) = row.try_get::<Option<Uuid>, _>("detail_id")? else {
        return Ok(None);
    };

    Ok(Some(PostDetail {
        id,
        description: row.try_get("description")?,
        utilities: row.try_get("utilities")?,
        pet: row.try_get("pet")?,
        income: row.try_get("income")?,
        size: row.try_get("size")?,
        school: row.try_get("school")?,
        bus: row.try_get("bus")?,
        restaurant: row.try_get("restaurant")?,
        post_id,
    }))
}

#[async_trait]
impl PostStore for PostRepo {
    async fn list(&self, filter: &PostFilter) -> Result<Vec<Post>, DbError> {
        let posts = sqlx::query_as::<_, Post>(concat!(
            "SELECT ",
            post_columns!(),
            r#"
            FROM posts p
            WHERE ($1::text IS NULL OR p.city = $1)
              AND ($2::text IS NULL OR p.type = $2)
              AND ($3::text IS NULL OR p.property = $3)
              AND ($4::int IS NULL OR p.bedroom = $4)
              AND ($5::bigint IS NULL OR p.price >= $5)
              AND ($6::bigint IS NULL OR p.price <= $6)
            ORDER BY p.created_at DESC
            "#
        ))
        .bind(filter.city.as_deref())
        .bind(filter.listing_type.map(|t| t.as_str()))
        .bind(filter.property.map(|p| p.as_str()))
        .bind(filter.bedroom)
        .bind(filter.min_price)
        .bind(filter.max_price)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn get(&self, id: Uuid) -> Result<PostWithDetail, DbError> {
        let row = sqlx::query(concat!(
            "SELECT ",
            post_columns!(),
            r#",
                d.id AS detail_id, d.description, d.utilities, d.pet, d.income,
                d.size, d.school, d.bus, d.restaurant,
                u.username, u.avatar
            FROM posts p
            JOIN users u ON u.id = p.user_id
            LEFT JOIN post_details d ON d.post_id = p.id
            WHERE p.id = $1
            "#
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .ok_or_else(|| DbError::not_found("post", id))?;

        let post = Post::from_row(&row)?;
        let detail = detail_from_row(&row, post.id)?;
        let owner = Profile {
            id: post.user_id,
            username: row.try_get("username")?,
            avatar: row.try_get("avatar")?,
        };

        Ok(PostWithDetail {
            post,
            detail,
            owner,
        })
    }

    async fn owner_of(&self, id: Uuid) -> Result<Uuid, DbError> {
        let owner: Option<(Uuid,)> = sqlx::query_as("SELECT user_id FROM posts WHERE id = $1")
            .bind(id)
            .fetch_optional(&self.pool)
            .await?;

        owner
            .map(|(user_id,)| user_id)
            .ok_or_else(|| DbError::not_found("post", id))
    }

    async fn create(&self, owner: Uuid, input: &PostInput) -> Result<Post, DbError> {
        let data = &input.post_data;
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(concat!(
            r#"
            INSERT INTO posts AS p
                (title, price, images, address, city, bedroom, bathroom,
                 latitude, longitude, type, property, user_id)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12)
            RETURNING "#,
            post_columns!()
        ))
        .bind(&data.title)
        .bind(data.price)
        .bind(&data.images)
        .bind(&data.address)
        .bind(&data.city)
        .bind(data.bedroom)
        .bind(data.bathroom)
        .bind(&data.latitude)
        .bind(&data.longitude)
        .bind(data.listing_type.as_str())
        .bind(data.property.as_str())
        .bind(owner)
        .fetch_one(&mut *tx)
        .await?;

        Self::insert_detail(&mut tx, post.id, &input.post_detail).await?;

        tx.commit().await?;
        Ok(post)
    }

    async fn update(&self, id: Uuid, patch: &PostPatch) -> Result<Post, DbError> {
        let data = &patch.post_data;
        let mut tx = self.pool.begin().await?;

        let post = sqlx::query_as::<_, Post>(concat!(
            r#"
            UPDATE posts AS p SET
                title = COALESCE($2, p.title),
                price = COALESCE($3, p.price),
                images = COALESCE($4, p.images),
                address = COALESCE($5, p.address),
                city = COALESCE($6, p.city),
                bedroom = COALESCE($7, p.bedroom),
                bathroom = COALESCE($8, p.bathroom),
                latitude = COALESCE($9, p.latitude),
                longitude = COALESCE($10, p.longitude),
                type = COALESCE($11, p.type),
                property = COALESCE($12, p.property)
            WHERE p.id = $1
            RETURNING "#,
            post_columns!()
        ))
        .bind(id)
        .bind(data.title.as_deref())
        .bind(data.price)
        .bind(&data.images)
        .bind(data.address.as_deref())
        .bind(data.city.as_deref())
        .bind(data.bedroom)
        .bind(data.bathroom)
        .bind(data.latitude.as_deref())
        .bind(data.longitude.as_deref())
        .bind(data.listing_type.map(|t| t.as_str()))
        .bind(data.property.map(|p| p.as_str()))
        .fetch_optional(&mut *tx)
        .await?
        .ok_or_else(|| DbError::not_found("post", id))?;

        if let Some(detail) = &patch.post_detail {
            Self::patch_detail(&mut tx, post.id, detail).await?;
        }

        tx.commit().await?;
        Ok(post)
    }

    async fn delete(&self, id: Uuid) -> Result<(), DbError> {
        let result = sqlx::query("DELETE FROM posts WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        if result.rows_affected() == 0 {
            return Err(DbError::not_found("post", id));
        }
        Ok(())
    }

    async fn list_by_owner(&self, owner: Uuid) -> Result<Vec<Post>, DbError> {
        let posts = sqlx::query_as::<_, Post>(concat!(
            "SELECT ",
            post_columns!(),
            " FROM posts p WHERE p.user_id = $1 ORDER BY p.created_at DESC"
        ))
        .bind(owner)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }

    async fn is_saved(&self, user: Uuid, post: Uuid) -> Result<bool, DbError> {
        let (saved,): (bool,) = sqlx::query_as(
            "SELECT EXISTS(SELECT 1 FROM saved_posts WHERE user_id = $1 AND post_id = $2)",
        )
        .bind(user)
        .bind(post)
        .fetch_one(&self.pool)
        .await?;

        Ok(saved)
    }

    async fn toggle_saved(&self, user: Uuid, post: Uuid) -> Result<SaveOutcome, DbError> {
        let mut tx = self.pool.begin().await?;

        let removed = sqlx::query("DELETE FROM saved_posts WHERE user_id = $1 AND post_id = $2")
            .bind(user)
            .bind(post)
            .execute(&mut *tx)
            .await?;

        if removed.rows_affected() > 0 {
            tx.commit().await?;
            return Ok(SaveOutcome::Removed);
        }

        // Insert only when the post exists, so a missing post reads as 404
        let inserted = sqlx::query(
            r#"
            INSERT INTO saved_posts (user_id, post_id)
            SELECT $1, id FROM posts WHERE id = $2
            ON CONFLICT (user_id, post_id) DO NOTHING
            "#,
        )
        .bind(user)
        .bind(post)
        .execute(&mut *tx)
        .await?;

        if inserted.rows_affected() == 0 {
            let (exists,): (bool,) =
                sqlx::query_as("SELECT EXISTS(SELECT 1 FROM posts WHERE id = $1)")
                    .bind(post)
                    .fetch_one(&mut *tx)
                    .await?;
            if !exists {
                return Err(DbError::not_found("post", post));
            }
        }

        tx.commit().await?;
        Ok(SaveOutcome::Saved)
    }

    async fn list_saved(&self, user: Uuid) -> Result<Vec<Post>, DbError> {
        let posts = sqlx::query_as::<_, Post>(concat!(
            "SELECT ",
            post_columns!(),
            r#"
            FROM saved_posts s
            JOIN posts p ON p.id = s.post_id
            WHERE s.user_id = $1
            ORDER BY s.created_at DESC
            "#
        ))
        .bind(user)
        .fetch_all(&self.pool)
        .await?;

        Ok(posts)
    }
}
