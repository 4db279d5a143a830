//! # API Module
//!
//! HTTP endpoints of the MoodMix server.
//!
//! ## Endpoints
//!
//! ### Authentication
//!
//! - [`login`] - redirects to the Spotify authorize page, carrying the
//!   session id in `state`
//! - [`callback`] - exchanges the authorization code, stores the
//!   credential and redirects back to the front-end with `session_id`
//! - [`check_session`] - reports whether the session is authorized
//!
//! ### Recommendations and playlists
//!
//! - [`recommendations`] - language-model suggestion only
//! - [`playlists`] - description → Spotify playlist
//! - [`history`] - the account's most recent playlists
//!
//! ### Monitoring
//!
//! - [`health`] - status and version
//!
//! Every request passes [`ensure_session`], which assigns a session id to
//! clients that did not send a `Session-Id` header.
//!
//! Handlers never forward internal error detail; see [`error`].

mod callback;
pub mod error;
mod health;
mod history;
mod playlists;
mod recommendations;
mod session;

pub use callback::{callback, login};
pub use health::health;
pub use history::history;
pub use playlists::playlists;
pub use recommendations::recommendations;
pub use session::{SESSION_HEADER, SessionId, check_session, ensure_session};

use serde::Deserialize;

/// Body of the recommendation and playlist endpoints.
#[derive(Debug, Deserialize)]
pub struct DescriptionRequest {
    pub description: Option<String>,
    pub session_id: Option<String>,
}

impl DescriptionRequest {
    /// The trimmed description, `None` when missing or blank.
    pub fn description(&self) -> Option<&str> {
        self.description
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
    }
}
