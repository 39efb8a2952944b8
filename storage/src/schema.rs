//! Table and index definitions.
//!
//! Uniqueness lives in the schema: one contact per phone, one thread per contact, one message per
//! provider id. Find-or-create paths rely on these constraints rather than read-then-write.

use sqlx::SqlitePool;
use tracing::info;

pub async fn init_schema(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    info!("Creating database tables if not exist");

    sqlx::query(
        r#"
        CREATE TABLE IF NOT EXISTS users (
            id TEXT PRIMARY KEY,
            email TEXT NOT NULL UNIQUE,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            role TEXT NOT NULL,
            email_verified INTEGER NOT NULL DEFAULT 0,
            image TEXT,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS contacts (
            id TEXT PRIMARY KEY,
            phone TEXT UNIQUE,
            email TEXT,
            first_name TEXT,
            last_name TEXT,
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS threads (
            id TEXT PRIMARY KEY,
            contact_id TEXT NOT NULL UNIQUE REFERENCES contacts(id),
            last_activity TEXT NOT NULL,
            unread_count INTEGER NOT NULL DEFAULT 0 CHECK (unread_count >= 0),
            created_at TEXT NOT NULL
        );

        CREATE TABLE IF NOT EXISTS messages (
            id TEXT PRIMARY KEY,
            thread_id TEXT NOT NULL REFERENCES threads(id),
            user_id TEXT REFERENCES users(id),
            channel TEXT NOT NULL,
            direction TEXT NOT NULL,
            status TEXT NOT NULL,
            content TEXT NOT NULL,
            from_address TEXT NOT NULL,
            to_address TEXT NOT NULL,
            external_id TEXT UNIQUE,
            created_at TEXT NOT NULL,
            sent_at TEXT,
            scheduled_at TEXT,
            claimed_at TEXT
        );

        CREATE TABLE IF NOT EXISTS notes (
            id TEXT PRIMARY KEY,
            contact_id TEXT NOT NULL REFERENCES contacts(id),
            user_id TEXT NOT NULL REFERENCES users(id),
            content TEXT NOT NULL,
            is_public INTEGER NOT NULL DEFAULT 1,
            created_at TEXT NOT NULL,
            updated_at TEXT NOT NULL
        );
        "#,
    )
    .execute(pool)
    .await?;

    add_claimed_at_column(pool).await?;

    sqlx::query(
        r#"
        CREATE INDEX IF NOT EXISTS idx_messages_thread_created ON messages(thread_id, created_at);
        CREATE INDEX IF NOT EXISTS idx_messages_status_scheduled ON messages(status, scheduled_at);
        CREATE INDEX IF NOT EXISTS idx_messages_created_at ON messages(created_at);
        CREATE INDEX IF NOT EXISTS idx_threads_last_activity ON threads(last_activity);
        CREATE INDEX IF NOT EXISTS idx_notes_contact_created ON notes(contact_id, created_at);
        "#,
    )
    .execute(pool)
    .await?;

    info!("Database tables created successfully");
    Ok(())
}

/// Databases created before sweep claims were timestamped lack `messages.claimed_at`.
async fn add_claimed_at_column(pool: &SqlitePool) -> Result<(), sqlx::Error> {
    let (present,): (i64,) = sqlx::query_as(
        "SELECT COUNT(*) FROM pragma_table_info('messages') WHERE name = 'claimed_at'",
    )
    .fetch_one(pool)
    .await?;

    if present == 0 {
        info!("Adding claimed_at column to messages");
        sqlx::query("ALTER TABLE messages ADD COLUMN claimed_at TEXT")
            .execute(pool)
            .await?;
    }
    Ok(())
}
