use std::sync::Arc;

use thiserror::Error;
use tracing::{info, warn};

use crate::types::ResolvedTrack;

use super::{Catalog, CatalogError};

#[derive(Debug, Error)]
pub enum ResolveError {
    #[error("no recommended song could be found in the catalog")]
    NoTracksFound,

    #[error(transparent)]
    Catalog(#[from] CatalogError),
}

/// Maps "Title by Artist" strings to catalog track URIs.
pub struct CatalogResolver {
    catalog: Arc<dyn Catalog>,
}

impl CatalogResolver {
    pub fn new(catalog: Arc<dyn Catalog>) -> Self {
        Self { catalog }
    }

    /// Searches every song in order, one request at a time.
    ///
    /// A song without a match resolves to `uri: None`; any failed request
    /// aborts the whole resolution.
    pub async fn resolve_tracks(
        &self,
        token: &str,
        songs: &[String],
    ) -> Result<Vec<ResolvedTrack>, CatalogError> {
        let mut resolved = Vec::with_capacity(songs.len());

        for song in songs {
            let items = self.catalog.search_tracks(token, song, 1).await?;
            let uri = items.into_iter().next().map(|track| track.uri);
            if uri.is_none() {
                warn!(song = %song, "no catalog match");
            }
            resolved.push(ResolvedTrack {
                query: song.clone(),
                uri,
            });
        }

        Ok(resolved)
    }

    /// Like [`Self::resolve_tracks`] but keeps only the URIs that were found.
    pub async fn resolve_uris(
        &self,
        token: &str,
        songs: &[String],
    ) -> Result<Vec<String>, ResolveError> {
        let uris: Vec<String> = self
            .resolve_tracks(token, songs)
            .await?
            .into_iter()
            .filter_map(|track| track.uri)
            .collect();

        if uris.is_empty() {
            return Err(ResolveError::NoTracksFound);
        }

        info!(found = uris.len(), requested = songs.len(), "songs resolved");
        Ok(uris)
    }

    pub async fn resolve_account(&self, token: &str) -> Result<String, CatalogError> {
        self.catalog.current_user_id(token).await
    }
}
