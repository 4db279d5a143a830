//! Configuration management for MoodMix.
//!
//! Configuration comes from environment variables, optionally seeded from
//! `.env` files. Values are grouped into three sections so that each
//! subcommand only requires what it actually uses:
//!
//! - [`ServerConfig`] - bind address, database and front-end location
//! - [`OpenAiConfig`] - language-model endpoint and credentials
//! - [`SpotifyConfig`] - OAuth client, catalog endpoints and attach policy
//!
//! Lookup order:
//! 1. Environment variables (highest priority)
//! 2. `.env` in the working directory
//! 3. `.env` in the local data directory
//! 4. Application defaults (where applicable)

use std::{env, path::PathBuf, str::FromStr};

use thiserror::Error;

use crate::spotify::AttachPolicy;

pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:8080";
pub const DEFAULT_DATABASE_URL: &str = "sqlite://moodmix.db";
pub const DEFAULT_FRONTEND_URL: &str = "http://localhost:3000";

pub const DEFAULT_OPENAI_API_URL: &str = "https://api.openai.com/v1";
pub const DEFAULT_OPENAI_MODEL: &str = "gpt-4o-mini";
pub const DEFAULT_OPENAI_MAX_TOKENS: u32 = 50;

pub const DEFAULT_SPOTIFY_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_SPOTIFY_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_SPOTIFY_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_SPOTIFY_OPEN_URL: &str = "https://open.spotify.com";
pub const DEFAULT_SPOTIFY_SCOPE: &str =
    "playlist-modify-public playlist-modify-private user-read-private user-read-email";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),

    #[error("{key} has an invalid value: {value}")]
    Invalid { key: &'static str, value: String },

    #[error("cannot prepare configuration directory: {0}")]
    Io(#[from] std::io::Error),
}

/// Loads environment variables from `.env` files.
///
/// The working directory is consulted first, then the platform-specific
/// local data directory under `moodmix/.env`:
/// - Linux: `~/.local/share/moodmix/.env`
/// - macOS: `~/Library/Application Support/moodmix/.env`
/// - Windows: `%LOCALAPPDATA%/moodmix/.env`
///
/// Variables already present in the environment are never overridden, and
/// a missing file is not an error.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] if the data directory cannot be created.
pub async fn load_env() -> Result<(), ConfigError> {
    let _ = dotenv::dotenv();

    let path = data_env_path();
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        let _ = dotenv::from_path(&path);
    }
    Ok(())
}

fn data_env_path() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push("moodmix/.env");
    path
}

fn required(key: &'static str) -> Result<String, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => Ok(value),
        _ => Err(ConfigError::Missing(key)),
    }
}

fn optional(key: &'static str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}

fn parsed<T: FromStr>(key: &'static str, default: T) -> Result<T, ConfigError> {
    match env::var(key) {
        Ok(value) if !value.trim().is_empty() => {
            value.trim().parse().map_err(|_| ConfigError::Invalid { key, value })
        }
        _ => Ok(default),
    }
}

/// HTTP server settings.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Address the API server binds to, e.g. `127.0.0.1:8080`.
    pub address: String,
    /// sqlx connection URL for the credential and history store.
    pub database_url: String,
    /// Front-end the OAuth callback redirects back to.
    pub frontend_url: String,
}

impl ServerConfig {
    /// Reads `SERVER_ADDRESS`, `DATABASE_URL` and `FRONTEND_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            address: optional("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            database_url: optional("DATABASE_URL", DEFAULT_DATABASE_URL),
            frontend_url: optional("FRONTEND_URL", DEFAULT_FRONTEND_URL),
        })
    }
}

/// Language-model settings.
#[derive(Debug, Clone)]
pub struct OpenAiConfig {
    pub api_key: String,
    pub api_url: String,
    pub model: String,
    /// Output token cap sent with every completion request.
    pub max_tokens: u32,
}

impl OpenAiConfig {
    /// Reads `OPENAI_API_KEY` (required), `OPENAI_API_URL`, `OPENAI_MODEL`
    /// and `OPENAI_MAX_TOKENS`.
    ///
    /// # Security Note
    ///
    /// The API key must never be written to logs.
    pub fn from_env() -> Result<Self, ConfigError> {
        Ok(Self {
            api_key: required("OPENAI_API_KEY")?,
            api_url: optional("OPENAI_API_URL", DEFAULT_OPENAI_API_URL),
            model: optional("OPENAI_MODEL", DEFAULT_OPENAI_MODEL),
            max_tokens: parsed("OPENAI_MAX_TOKENS", DEFAULT_OPENAI_MAX_TOKENS)?,
        })
    }
}

/// Spotify OAuth client and Web API settings.
#[derive(Debug, Clone)]
pub struct SpotifyConfig {
    pub client_id: String,
    pub client_secret: String,
    /// Must match the redirect URI registered with the Spotify application.
    pub redirect_uri: String,
    pub auth_url: String,
    pub token_url: String,
    pub api_url: String,
    /// Base for shareable playlist links.
    pub open_url: String,
    /// Space separated list of requested scopes.
    pub scope: String,
    pub attach_policy: AttachPolicy,
}

impl SpotifyConfig {
    /// Reads the `SPOTIFY_*` variables.
    ///
    /// `SPOTIFY_CLIENT_ID`, `SPOTIFY_CLIENT_SECRET` and
    /// `SPOTIFY_REDIRECT_URI` are required; every endpoint defaults to the
    /// public Spotify service. `SPOTIFY_VERIFY_TRACK_ATTACH=true` makes a
    /// failed track attachment fail the whole playlist operation.
    pub fn from_env() -> Result<Self, ConfigError> {
        let verify: bool = parsed("SPOTIFY_VERIFY_TRACK_ATTACH", false)?;

        Ok(Self {
            client_id: required("SPOTIFY_CLIENT_ID")?,
            client_secret: required("SPOTIFY_CLIENT_SECRET")?,
            redirect_uri: required("SPOTIFY_REDIRECT_URI")?,
            auth_url: optional("SPOTIFY_API_AUTH_URL", DEFAULT_SPOTIFY_AUTH_URL),
            token_url: optional("SPOTIFY_API_TOKEN_URL", DEFAULT_SPOTIFY_TOKEN_URL),
            api_url: optional("SPOTIFY_API_URL", DEFAULT_SPOTIFY_API_URL),
            open_url: optional("SPOTIFY_OPEN_URL", DEFAULT_SPOTIFY_OPEN_URL),
            scope: optional("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SPOTIFY_SCOPE),
            attach_policy: if verify {
                AttachPolicy::Verify
            } else {
                AttachPolicy::FireAndForget
            },
        })
    }
}
