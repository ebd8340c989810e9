//! Memory Module
//!
//! Conversation memory for the agent. Each Telegram chat maps to a thread;
//! messages are appended in order and the most recent ones are replayed to
//! the model as context. Backed by SQLite through `sqlx`.

use chrono::{DateTime, Utc};
use sqlx::sqlite::{SqlitePool, SqlitePoolOptions};
use sqlx::Row;
use std::fmt;
use std::path::Path;
use std::time::Duration;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MemoryError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Failed to create database directory: {0}")]
    Io(#[from] std::io::Error),

    #[error("Unknown message role '{0}' in store")]
    UnknownRole(String),
}

pub type Result<T> = std::result::Result<T, MemoryError>;

/// Who authored a stored message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageRole {
    User,
    Assistant,
}

impl MessageRole {
    pub fn as_str(self) -> &'static str {
        match self {
            MessageRole::User => "user",
            MessageRole::Assistant => "assistant",
        }
    }
}

impl fmt::Display for MessageRole {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl TryFrom<&str> for MessageRole {
    type Error = MemoryError;

    fn try_from(value: &str) -> Result<Self> {
        match value {
            "user" => Ok(MessageRole::User),
            "assistant" => Ok(MessageRole::Assistant),
            other => Err(MemoryError::UnknownRole(other.to_string())),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct StoredMessage {
    pub id: i64,
    pub thread_id: String,
    pub role: MessageRole,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Handle to the conversation database. Cheap to clone.
#[derive(Debug, Clone)]
pub struct MemoryStore {
    pool: SqlitePool,
}

impl MemoryStore {
    /// Opens (creating if needed) the database file at `path`.
    pub async fn open(path: &Path) -> Result<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let url = format!("sqlite://{}?mode=rwc", path.display());

        let pool = SqlitePoolOptions::new()
            .max_connections(4)
            .acquire_timeout(Duration::from_secs(5))
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA busy_timeout = 3000")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA journal_mode = WAL")
                        .execute(&mut *conn)
                        .await?;
                    sqlx::query("PRAGMA foreign_keys = ON")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect(&url)
            .await?;

        let store = Self { pool };
        store.init().await?;
        tracing::info!("Conversation memory ready at {}", path.display());
        Ok(store)
    }

    /// Private in-memory database, gone when the store is dropped.
    pub async fn open_in_memory() -> Result<Self> {
        // A single connection that never expires keeps the in-memory database alive.
        let pool = SqlitePoolOptions::new()
            .max_connections(1)
            .idle_timeout(None)
            .max_lifetime(None)
            .after_connect(|conn, _meta| {
                Box::pin(async move {
                    sqlx::query("PRAGMA foreign_keys = ON")
                        .execute(&mut *conn)
                        .await?;
                    Ok(())
                })
            })
            .connect("sqlite::memory:")
            .await?;

        let store = Self { pool };
        store.init().await?;
        Ok(store)
    }

    async fn init(&self) -> Result<()> {
        sqlx::query(
            "CREATE TABLE IF NOT EXISTS threads (
                id         TEXT PRIMARY KEY,
                created_at TEXT NOT NULL,
                updated_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE TABLE IF NOT EXISTS messages (
                id         INTEGER PRIMARY KEY AUTOINCREMENT,
                thread_id  TEXT NOT NULL REFERENCES threads(id),
                role       TEXT NOT NULL,
                content    TEXT NOT NULL,
                created_at TEXT NOT NULL
            )",
        )
        .execute(&self.pool)
        .await?;

        sqlx::query(
            "CREATE INDEX IF NOT EXISTS idx_messages_thread ON messages(thread_id, id)",
        )
        .execute(&self.pool)
        .await?;

        Ok(())
    }

    /// Creates the thread if it does not exist yet.
    pub async fn ensure_thread(&self, thread_id: &str) -> Result<()> {
        let now = Utc::now();
        sqlx::query(
            "INSERT INTO threads (id, created_at, updated_at) VALUES (?1, ?2, ?2)
             ON CONFLICT(id) DO NOTHING",
        )
        .bind(thread_id)
        .bind(now)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// Appends a message and returns its id. The thread is created on demand.
    pub async fn append(&self, thread_id: &str, role: MessageRole, content: &str) -> Result<i64> {
        self.ensure_thread(thread_id).await?;
        let now = Utc::now();

        let mut tx = self.pool.begin().await?;
        let id = sqlx::query(
            "INSERT INTO messages (thread_id, role, content, created_at) VALUES (?1, ?2, ?3, ?4)",
        )
        .bind(thread_id)
        .bind(role.as_str())
        .bind(content)
        .bind(now)
        .execute(&mut *tx)
        .await?
        .last_insert_rowid();

        sqlx::query("UPDATE threads SET updated_at = ?1 WHERE id = ?2")
            .bind(now)
            .bind(thread_id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;

        tracing::debug!(thread = thread_id, role = %role, id, "Stored message");
        Ok(id)
    }

    /// The last `limit` messages of a thread, oldest first.
    pub async fn recent(&self, thread_id: &str, limit: usize) -> Result<Vec<StoredMessage>> {
        let rows = sqlx::query(
            "SELECT id, thread_id, role, content, created_at FROM (
                SELECT id, thread_id, role, content, created_at
                FROM messages
                WHERE thread_id = ?1
                ORDER BY id DESC
                LIMIT ?2
             ) ORDER BY id ASC",
        )
        .bind(thread_id)
        .bind(i64::try_from(limit).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter()
            .map(|r| {
                let role: String = r.try_get("role")?;
                Ok(StoredMessage {
                    id: r.try_get("id")?,
                    thread_id: r.try_get("thread_id")?,
                    role: MessageRole::try_from(role.as_str())?,
                    content: r.try_get("content")?,
                    created_at: r.try_get("created_at")?,
                })
            })
            .collect()
    }

    pub async fn count(&self, thread_id: &str) -> Result<i64> {
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM messages WHERE thread_id = ?1")
            .bind(thread_id)
            .fetch_one(&self.pool)
            .await?;
        Ok(count)
    }

    /// Closes the pool, waiting for open connections to finish.
    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_append_and_recent_in_order() {
        let store = MemoryStore::open_in_memory().await.expect("store");
        store
            .append("chat:1", MessageRole::User, "Is Jupiter up?")
            .await
            .expect("append");
        store
            .append("chat:1", MessageRole::Assistant, "Yes, high in the west.")
            .await
            .expect("append");
        store
            .append("chat:1", MessageRole::User, "And Saturn?")
            .await
            .expect("append");

        let all = store.recent("chat:1", 10).await.expect("recent");
        assert_eq!(all.len(), 3);
        assert_eq!(all[0].content, "Is Jupiter up?");
        assert_eq!(all[1].role, MessageRole::Assistant);

        let last_two = store.recent("chat:1", 2).await.expect("recent");
        assert_eq!(last_two.len(), 2);
        assert_eq!(last_two[0].content, "Yes, high in the west.");
        assert_eq!(last_two[1].content, "And Saturn?");
        assert!(last_two[0].id < last_two[1].id);
    }

    #[tokio::test]
    async fn test_threads_are_isolated() {
        let store = MemoryStore::open_in_memory().await.expect("store");
        store.append("a", MessageRole::User, "one").await.expect("append");
        store.append("b", MessageRole::User, "two").await.expect("append");
        store.append("b", MessageRole::User, "three").await.expect("append");

        assert_eq!(store.count("a").await.expect("count"), 1);
        assert_eq!(store.count("b").await.expect("count"), 2);
        assert_eq!(store.count("c").await.expect("count"), 0);
        assert!(store.recent("c", 5).await.expect("recent").is_empty());
    }

    #[tokio::test]
    async fn test_ensure_thread_is_idempotent() {
        let store = MemoryStore::open_in_memory().await.expect("store");
        store.ensure_thread("t").await.expect("first");
        store.ensure_thread("t").await.expect("second");
        assert_eq!(store.count("t").await.expect("count"), 0);
    }

    #[tokio::test]
    async fn test_file_database_persists() {
        let dir = tempfile::tempdir().expect("tempdir");
        let path = dir.path().join("nested").join("memory.db");

        let store = MemoryStore::open(&path).await.expect("open");
        store
            .append("chat:42", MessageRole::User, "Where is Mars?")
            .await
            .expect("append");
        store.close().await;

        let reopened = MemoryStore::open(&path).await.expect("reopen");
        let messages = reopened.recent("chat:42", 5).await.expect("recent");
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].content, "Where is Mars?");
    }

    #[test]
    fn test_role_parsing() {
        assert_eq!(MessageRole::try_from("user").expect("role"), MessageRole::User);
        assert!(matches!(
            MessageRole::try_from("system"),
            Err(MemoryError::UnknownRole(ref r)) if r == "system"
        ));
    }
}
