use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::{
    types::{CreatePlaylistRequest, PlaylistRef},
    utils,
};

use super::{Catalog, CatalogError};

pub const PLAYLIST_DESCRIPTION: &str = "Created by MoodMix from your description";

/// What happens when adding tracks to a fresh playlist fails.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AttachPolicy {
    /// Log the failure and report the playlist anyway.
    #[default]
    FireAndForget,
    /// Fail the operation with [`PlaylistError::AttachFailed`].
    Verify,
}

#[derive(Debug, Error)]
pub enum PlaylistError {
    #[error("No tracks found")]
    NoTracks,

    #[error("Failed to create playlist")]
    CreationFailed,

    #[error("failed to add tracks to playlist {playlist_id}: {source}")]
    AttachFailed {
        playlist_id: String,
        #[source]
        source: CatalogError,
    },

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

pub struct PlaylistOrchestrator {
    catalog: Arc<dyn Catalog>,
    open_url: String,
    policy: AttachPolicy,
}

impl PlaylistOrchestrator {
    pub fn new(catalog: Arc<dyn Catalog>, open_url: impl Into<String>, policy: AttachPolicy) -> Self {
        Self {
            catalog,
            open_url: open_url.into(),
            policy,
        }
    }

    /// Creates a private playlist owned by `user_id` and adds `uris` to it
    /// in one batch.
    pub async fn create_with_tracks(
        &self,
        token: &str,
        user_id: &str,
        name: &str,
        uris: &[String],
    ) -> Result<PlaylistRef, PlaylistError> {
        if uris.is_empty() {
            return Err(PlaylistError::NoTracks);
        }

        let request = CreatePlaylistRequest {
            name: name.to_string(),
            description: PLAYLIST_DESCRIPTION.to_string(),
            public: false,
        };

        let created = match self.catalog.create_playlist(token, user_id, &request).await {
            Ok(created) => created,
            Err(e @ CatalogError::Transport { .. }) | Err(e @ CatalogError::Unauthorized { .. }) => {
                return Err(e.into());
            }
            Err(e) => {
                warn!(error = %e, "playlist creation rejected");
                return Err(PlaylistError::CreationFailed);
            }
        };

        let Some(playlist_id) = created.id.filter(|id| !id.is_empty()) else {
            warn!(user_id, "create playlist response has no id");
            return Err(PlaylistError::CreationFailed);
        };

        info!(playlist_id = %playlist_id, tracks = uris.len(), "playlist created");

        if let Err(source) = self.catalog.add_tracks(token, &playlist_id, uris).await {
            match self.policy {
                AttachPolicy::FireAndForget => {
                    warn!(playlist_id = %playlist_id, error = %source, "adding tracks failed");
                }
                AttachPolicy::Verify => {
                    return Err(PlaylistError::AttachFailed {
                        playlist_id,
                        source,
                    });
                }
            }
        }

        Ok(PlaylistRef {
            link: utils::playlist_link(&self.open_url, &playlist_id),
            id: playlist_id,
        })
    }
}
