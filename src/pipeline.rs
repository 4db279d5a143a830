//! Description → playlist orchestration.
//!
//! Every outbound call runs sequentially inside one request:
//!
//! ```text
//! credentials -> recommendation -> per-song search -> account lookup
//!             -> create playlist -> attach tracks -> history entry
//! ```
//!
//! Failures of the individual components are folded into
//! [`PipelineError`], the small set of outcomes callers are allowed to see.

use std::sync::Arc;

use chrono::Utc;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    management::{HistoryStore, StoreError, TokenStore},
    openai::{LlmError, RecommendError, Recommender},
    spotify::{CatalogError, CatalogResolver, PlaylistError, PlaylistOrchestrator, ResolveError},
    types::{Credential, PlaylistRef, Recommendation, SearchHistoryEntry},
};

#[derive(Debug, Error)]
pub enum PipelineError {
    #[error("session has no valid Spotify authorization")]
    Unauthorized,

    #[error("description must not be empty")]
    InvalidInput,

    #[error("no usable recommendation after {attempts} attempts")]
    Unparsable { attempts: u32 },

    #[error(transparent)]
    LanguageModel(LlmError),

    #[error(transparent)]
    Catalog(CatalogError),

    #[error("No tracks found")]
    NoTracksFound,

    #[error("Failed to create playlist")]
    PlaylistCreationFailed,

    #[error("failed to add tracks to playlist {playlist_id}")]
    TrackAttachFailed { playlist_id: String },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl From<RecommendError> for PipelineError {
    fn from(err: RecommendError) -> Self {
        match err {
            RecommendError::EmptyDescription => PipelineError::InvalidInput,
            RecommendError::Upstream(e) => PipelineError::LanguageModel(e),
            RecommendError::Unparsable { attempts } => PipelineError::Unparsable { attempts },
        }
    }
}

impl From<CatalogError> for PipelineError {
    fn from(err: CatalogError) -> Self {
        if err.is_unauthorized() {
            PipelineError::Unauthorized
        } else {
            PipelineError::Catalog(err)
        }
    }
}

impl From<ResolveError> for PipelineError {
    fn from(err: ResolveError) -> Self {
        match err {
            ResolveError::NoTracksFound => PipelineError::NoTracksFound,
            ResolveError::Catalog(e) => e.into(),
        }
    }
}

impl From<PlaylistError> for PipelineError {
    fn from(err: PlaylistError) -> Self {
        match err {
            PlaylistError::NoTracks => PipelineError::NoTracksFound,
            PlaylistError::CreationFailed => PipelineError::PlaylistCreationFailed,
            PlaylistError::AttachFailed { playlist_id, source } => {
                warn!(playlist_id = %playlist_id, error = %source, "track attachment failed");
                PipelineError::TrackAttachFailed { playlist_id }
            }
            PlaylistError::Catalog(e) => e.into(),
        }
    }
}

#[derive(Debug, Clone)]
pub struct PipelineOutcome {
    pub recommendation: Recommendation,
    pub playlist: PlaylistRef,
    pub user_id: String,
}

struct Resolved {
    access_token: String,
    uris: Vec<String>,
    user_id: String,
}

pub struct PlaylistPipeline {
    recommender: Arc<Recommender>,
    resolver: CatalogResolver,
    orchestrator: PlaylistOrchestrator,
    tokens: TokenStore,
    history: HistoryStore,
}

impl PlaylistPipeline {
    pub fn new(
        recommender: Arc<Recommender>,
        resolver: CatalogResolver,
        orchestrator: PlaylistOrchestrator,
        tokens: TokenStore,
        history: HistoryStore,
    ) -> Self {
        Self {
            recommender,
            resolver,
            orchestrator,
            tokens,
            history,
        }
    }

    /// Runs the whole chain for one request.
    ///
    /// Fails closed with [`PipelineError::Unauthorized`] when the session is
    /// missing or has no stored credential.
    pub async fn run(
        &self,
        session_id: Option<&str>,
        description: &str,
    ) -> Result<PipelineOutcome, PipelineError> {
        let session_id = session_id
            .map(str::trim)
            .filter(|id| !id.is_empty())
            .ok_or(PipelineError::Unauthorized)?;

        let credential = self
            .tokens
            .retrieve(session_id)
            .await?
            .ok_or(PipelineError::Unauthorized)?;

        let recommendation = self.recommender.recommend(description).await?;

        let resolved = self.resolve(&credential, &recommendation.songs).await?;

        if credential.catalog_user_id.is_none() {
            self.tokens
                .store(
                    &credential.session_id,
                    &resolved.access_token,
                    &credential.refresh_token,
                    Some(&resolved.user_id),
                )
                .await?;
        }

        let playlist = self
            .orchestrator
            .create_with_tracks(
                &resolved.access_token,
                &resolved.user_id,
                &recommendation.playlist_name,
                &resolved.uris,
            )
            .await?;

        self.history
            .record(&SearchHistoryEntry {
                catalog_user_id: resolved.user_id.clone(),
                search_query: description.trim().to_string(),
                spotify_link: playlist.link.clone(),
                timestamp: Utc::now(),
            })
            .await?;

        info!(
            session_id,
            playlist_id = %playlist.id,
            user_id = %resolved.user_id,
            "playlist pipeline finished"
        );

        Ok(PipelineOutcome {
            recommendation,
            playlist,
            user_id: resolved.user_id,
        })
    }

    /// Resolves songs and account, refreshing the access token once when
    /// the catalog rejects it.
    async fn resolve(
        &self,
        credential: &Credential,
        songs: &[String],
    ) -> Result<Resolved, PipelineError> {
        match self.resolve_with(&credential.access_token, songs).await {
            Err(ResolveError::Catalog(e)) if e.is_unauthorized() => {
                info!(session_id = %credential.session_id, "access token rejected, refreshing");
            }
            other => return Ok(other?),
        }

        let access_token = match self.tokens.refresh(&credential.refresh_token).await {
            Ok(token) => token,
            Err(e) => {
                warn!(session_id = %credential.session_id, error = %e, "token refresh failed");
                return Err(PipelineError::Unauthorized);
            }
        };

        self.tokens
            .store(
                &credential.session_id,
                &access_token,
                &credential.refresh_token,
                None,
            )
            .await?;

        Ok(self.resolve_with(&access_token, songs).await?)
    }

    async fn resolve_with(&self, access_token: &str, songs: &[String]) -> Result<Resolved, ResolveError> {
        let uris = self.resolver.resolve_uris(access_token, songs).await?;
        let user_id = self.resolver.resolve_account(access_token).await?;
        Ok(Resolved {
            access_token: access_token.to_string(),
            uris,
            user_id,
        })
    }
}
