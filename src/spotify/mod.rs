//! # Spotify Integration Module
//!
//! Everything MoodMix needs from the Spotify Web API and accounts service.
//!
//! ```text
//! Pipeline (description -> playlist)
//!          ↓
//! Spotify Integration Layer
//!     ├── Authentication (OAuth 2.0 authorization code, refresh)
//!     ├── Catalog (search, current user, playlists)
//!     ├── Resolution (song strings -> track URIs)
//!     └── Playlist orchestration (create + attach)
//!          ↓
//! HTTP Layer (reqwest, JSON)
//! ```
//!
//! ## Seams
//!
//! The provider is reached through two traits so components can be built
//! against fakes:
//!
//! - [`Authorizer`] - code exchange and token refresh on the accounts service
//! - [`Catalog`] - the Web API calls made with a user's bearer token
//!
//! [`SpotifyClient`] implements both over `reqwest`.
//!
//! ## Error Types
//!
//! - [`AuthError`] - token endpoint failures, including the provider's
//!   status and body for diagnostics
//! - [`CatalogError`] - Web API failures tagged with the operation name;
//!   a 401 is reported as [`CatalogError::Unauthorized`] so callers can
//!   refresh the token
//!
//! ## API Coverage
//!
//! - `GET /search?type=track&limit=1` - song lookup
//! - `GET /me` - current user id
//! - `POST /users/{user_id}/playlists` - create a private playlist
//! - `POST /playlists/{playlist_id}/tracks` - add tracks
//! - `POST /api/token` - code exchange and refresh

pub mod auth;
mod catalog;
pub mod playlist;
pub mod resolve;

use async_trait::async_trait;
use reqwest::Client;
use thiserror::Error;

use crate::{
    config::SpotifyConfig,
    types::{CreatePlaylistRequest, CreatePlaylistResponse, Token, Track},
};

pub use playlist::{AttachPolicy, PLAYLIST_DESCRIPTION, PlaylistError, PlaylistOrchestrator};
pub use resolve::{CatalogResolver, ResolveError};

#[derive(Debug, Error)]
pub enum AuthError {
    #[error("token request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("code exchange failed with {status}: {body}")]
    ExchangeFailed { status: u16, body: String },

    #[error("refresh failed with {status}: {body}")]
    RefreshFailed { status: u16, body: String },

    #[error("malformed token response: {0}")]
    Malformed(String),

    #[error("invalid authorize url {0}")]
    InvalidUrl(String),
}

#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("{operation} request failed: {source}")]
    Transport {
        operation: &'static str,
        #[source]
        source: reqwest::Error,
    },

    #[error("{operation} was rejected: access token invalid or expired")]
    Unauthorized { operation: &'static str },

    #[error("{operation} returned {status}: {body}")]
    Status {
        operation: &'static str,
        status: u16,
        body: String,
    },

    #[error("{operation} returned a malformed body: {reason}")]
    Malformed {
        operation: &'static str,
        reason: String,
    },
}

impl CatalogError {
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, CatalogError::Unauthorized { .. })
    }
}

#[async_trait]
pub trait Authorizer: Send + Sync {
    /// Exchanges an authorization code for an access/refresh token pair.
    async fn exchange_code(&self, code: &str) -> Result<Token, AuthError>;

    /// Obtains a new access token with a refresh token grant.
    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError>;
}

#[async_trait]
pub trait Catalog: Send + Sync {
    /// Free-text track search; returns at most `limit` items.
    async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError>;

    /// Id of the account the token belongs to.
    async fn current_user_id(&self, token: &str) -> Result<String, CatalogError>;

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, CatalogError>;

    async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError>;
}

/// `reqwest` backed implementation of [`Authorizer`] and [`Catalog`].
pub struct SpotifyClient {
    http: Client,
    config: SpotifyConfig,
}

impl SpotifyClient {
    pub fn new(config: SpotifyConfig) -> Self {
        Self {
            http: Client::new(),
            config,
        }
    }

    pub fn config(&self) -> &SpotifyConfig {
        &self.config
    }

    fn api_url(&self, path: &str) -> String {
        format!(
            "{base}{path}",
            base = self.config.api_url.trim_end_matches('/')
        )
    }
}
