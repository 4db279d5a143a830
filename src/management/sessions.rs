use chrono::Utc;
use sqlx::SqlitePool;

use super::StoreError;

/// Registry of session ids handed out to clients.
#[derive(Clone)]
pub struct SessionStore {
    pool: SqlitePool,
}

impl SessionStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Records a session id; registering an existing id is a no-op.
    pub async fn register(&self, session_id: &str) -> Result<(), StoreError> {
        sqlx::query("INSERT OR IGNORE INTO sessions (session_id, created_at) VALUES (?, ?)")
            .bind(session_id)
            .bind(Utc::now())
            .execute(&self.pool)
            .await?;
        Ok(())
    }

    pub async fn exists(&self, session_id: &str) -> Result<bool, StoreError> {
        let row: Option<(String,)> =
            sqlx::query_as("SELECT session_id FROM sessions WHERE session_id = ?")
                .bind(session_id)
                .fetch_optional(&self.pool)
                .await?;
        Ok(row.is_some())
    }
}
