//! Schema migrations
//!
//! Every statement is idempotent, so `run` is safe on each start.
//! Cascades for details, bookmarks and messages live here, not in handlers.

use sqlx::PgPool;

const STATEMENTS: &[(&str, &str)] = &[
    (
        "users",
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            username TEXT NOT NULL UNIQUE,
            email TEXT NOT NULL UNIQUE,
            avatar TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "posts",
        r#"
        CREATE TABLE IF NOT EXISTS posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            title TEXT NOT NULL,
            price BIGINT NOT NULL CHECK (price >= 0),
            images TEXT[] NOT NULL DEFAULT '{}',
            address TEXT NOT NULL,
            city TEXT NOT NULL,
            bedroom INTEGER NOT NULL,
            bathroom INTEGER NOT NULL,
            latitude TEXT NOT NULL DEFAULT '',
            longitude TEXT NOT NULL DEFAULT '',
            type TEXT NOT NULL CHECK (type IN ('buy', 'rent')),
            property TEXT NOT NULL CHECK (property IN ('apartment', 'house', 'condo', 'land')),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "post_details",
        r#"
        CREATE TABLE IF NOT EXISTS post_details (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            description TEXT NOT NULL DEFAULT '',
            utilities TEXT,
            pet TEXT,
            income TEXT,
            size INTEGER,
            school INTEGER,
            bus INTEGER,
            restaurant INTEGER,
            post_id UUID NOT NULL UNIQUE REFERENCES posts(id) ON DELETE CASCADE
        )
        "#,
    ),
    (
        "saved_posts",
        r#"
        CREATE TABLE IF NOT EXISTS saved_posts (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            post_id UUID NOT NULL REFERENCES posts(id) ON DELETE CASCADE,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW(),
            UNIQUE (user_id, post_id)
        )
        "#,
    ),
    (
        "chats",
        r#"
        CREATE TABLE IF NOT EXISTS chats (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            user_ids UUID[] NOT NULL CHECK (
                cardinality(user_ids) = 2 AND user_ids[1] <> user_ids[2]
            ),
            seen_by UUID[] NOT NULL DEFAULT '{}',
            last_message TEXT,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "messages",
        r#"
        CREATE TABLE IF NOT EXISTS messages (
            id UUID PRIMARY KEY DEFAULT gen_random_uuid(),
            chat_id UUID NOT NULL REFERENCES chats(id) ON DELETE CASCADE,
            user_id UUID NOT NULL REFERENCES users(id) ON DELETE CASCADE,
            text TEXT NOT NULL,
            created_at TIMESTAMPTZ NOT NULL DEFAULT NOW()
        )
        "#,
    ),
    (
        "indexes",
        r#"
        CREATE INDEX IF NOT EXISTS idx_posts_city ON posts(city);
        CREATE INDEX IF NOT EXISTS idx_posts_user ON posts(user_id);
        CREATE INDEX IF NOT EXISTS idx_chats_members ON chats USING GIN (user_ids);
        CREATE INDEX IF NOT EXISTS idx_messages_chat ON messages(chat_id, created_at)
        "#,
    ),
];

/// Run all migrations in order.
pub async fn run(pool: &PgPool) -> Result<(), sqlx::Error> {
    tracing::info!("Running migrations...");

    for &(name, sql) in STATEMENTS {
        tracing::debug!(step = name, "applying migration");
        sqlx::raw_sql(sql).execute(pool).await?;
    }

    tracing::info!("Migrations complete");
    Ok(())
}
