use sqlx::SqlitePool;

use crate::types::SearchHistoryEntry;

use super::StoreError;

/// Number of entries returned by [`HistoryStore::recent`].
pub const HISTORY_LIMIT: i64 = 10;

/// Append-only log of created playlists per catalog account.
#[derive(Clone)]
pub struct HistoryStore {
    pool: SqlitePool,
}

impl HistoryStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub async fn record(&self, entry: &SearchHistoryEntry) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO search_history (catalog_user_id, search_query, spotify_link, timestamp)
             VALUES (?, ?, ?, ?)",
        )
        .bind(&entry.catalog_user_id)
        .bind(&entry.search_query)
        .bind(&entry.spotify_link)
        .bind(entry.timestamp)
        .execute(&self.pool)
        .await?;
        Ok(())
    }

    /// The most recent entries for an account, newest first.
    pub async fn recent(&self, catalog_user_id: &str) -> Result<Vec<SearchHistoryEntry>, StoreError> {
        let entries = sqlx::query_as::<_, SearchHistoryEntry>(
            "SELECT catalog_user_id, search_query, spotify_link, timestamp
             FROM search_history
             WHERE catalog_user_id = ?
             ORDER BY timestamp DESC, id DESC
             LIMIT ?",
        )
        .bind(catalog_user_id)
        .bind(HISTORY_LIMIT)
        .fetch_all(&self.pool)
        .await?;
        Ok(entries)
    }
}
