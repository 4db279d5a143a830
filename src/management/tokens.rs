use std::sync::Arc;

use chrono::Utc;
use sqlx::SqlitePool;
use tracing::debug;

use crate::{
    spotify::{AuthError, Authorizer},
    types::Credential,
};

use super::StoreError;

/// Owner of the per-session OAuth credentials.
#[derive(Clone)]
pub struct TokenStore {
    pool: SqlitePool,
    authorizer: Arc<dyn Authorizer>,
}

impl TokenStore {
    pub fn new(pool: SqlitePool, authorizer: Arc<dyn Authorizer>) -> Self {
        Self { pool, authorizer }
    }

    /// Inserts or updates the credential for `session_id`.
    ///
    /// Tokens are overwritten (last writer wins). The catalog user id is
    /// kept once set; `None` never clears it.
    pub async fn store(
        &self,
        session_id: &str,
        access_token: &str,
        refresh_token: &str,
        catalog_user_id: Option<&str>,
    ) -> Result<(), StoreError> {
        sqlx::query(
            "INSERT INTO credentials (session_id, access_token, refresh_token, catalog_user_id, updated_at)
             VALUES (?, ?, ?, ?, ?)
             ON CONFLICT(session_id) DO UPDATE SET
                access_token = excluded.access_token,
                refresh_token = excluded.refresh_token,
                catalog_user_id = COALESCE(credentials.catalog_user_id, excluded.catalog_user_id),
                updated_at = excluded.updated_at",
        )
        .bind(session_id)
        .bind(access_token)
        .bind(refresh_token)
        .bind(catalog_user_id)
        .bind(Utc::now())
        .execute(&self.pool)
        .await?;

        debug!(session_id, "credential stored");
        Ok(())
    }

    pub async fn retrieve(&self, session_id: &str) -> Result<Option<Credential>, StoreError> {
        let credential = sqlx::query_as::<_, Credential>(
            "SELECT session_id, access_token, refresh_token, catalog_user_id
             FROM credentials WHERE session_id = ?",
        )
        .bind(session_id)
        .fetch_optional(&self.pool)
        .await?;
        Ok(credential)
    }

    /// Trades a refresh token for a new access token.
    ///
    /// Nothing is persisted here; the caller writes the new token back with
    /// [`Self::store`]. There is no retry.
    pub async fn refresh(&self, refresh_token: &str) -> Result<String, AuthError> {
        self.authorizer.refresh_access_token(refresh_token).await
    }
}
