use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{
    Router, middleware,
    routing::{get, post},
};
use sqlx::SqlitePool;
use tower_http::trace::TraceLayer;
use tracing::info;

use crate::{
    Res, api,
    config::SpotifyConfig,
    management::{HistoryStore, SessionStore, TokenStore},
    openai::{ChatCompletion, Recommender},
    pipeline::PlaylistPipeline,
    spotify::{Authorizer, Catalog, CatalogResolver, PlaylistOrchestrator},
};

/// Shared handles of every request handler.
#[derive(Clone)]
pub struct AppState {
    pub pool: SqlitePool,
    pub pipeline: Arc<PlaylistPipeline>,
    pub recommender: Arc<Recommender>,
    pub authorizer: Arc<dyn Authorizer>,
    pub catalog: Arc<dyn Catalog>,
    pub tokens: TokenStore,
    pub sessions: SessionStore,
    pub history: HistoryStore,
    pub spotify: SpotifyConfig,
    pub frontend_url: String,
}

impl AppState {
    /// Wires the components around one chat client and one Spotify client.
    pub fn new<S>(
        pool: SqlitePool,
        chat: Arc<dyn ChatCompletion>,
        spotify_client: Arc<S>,
        spotify: SpotifyConfig,
        frontend_url: String,
    ) -> Self
    where
        S: Authorizer + Catalog + 'static,
    {
        let authorizer: Arc<dyn Authorizer> = spotify_client.clone();
        let catalog: Arc<dyn Catalog> = spotify_client;

        let recommender = Arc::new(Recommender::new(chat));
        let tokens = TokenStore::new(pool.clone(), Arc::clone(&authorizer));
        let sessions = SessionStore::new(pool.clone());
        let history = HistoryStore::new(pool.clone());

        let pipeline = PlaylistPipeline::new(
            Arc::clone(&recommender),
            CatalogResolver::new(Arc::clone(&catalog)),
            PlaylistOrchestrator::new(
                Arc::clone(&catalog),
                spotify.open_url.clone(),
                spotify.attach_policy,
            ),
            tokens.clone(),
            history.clone(),
        );

        Self {
            pool,
            pipeline: Arc::new(pipeline),
            recommender,
            authorizer,
            catalog,
            tokens,
            sessions,
            history,
            spotify,
            frontend_url,
        }
    }
}

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route("/auth/login", get(api::login))
        .route("/auth/callback", get(api::callback))
        .route("/check_session", get(api::check_session))
        .route("/recommendations", post(api::recommendations))
        .route("/playlists", post(api::playlists))
        .route("/history", get(api::history))
        .layer(middleware::from_fn_with_state(
            state.clone(),
            api::ensure_session,
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

pub async fn start_api_server(address: &str, state: AppState) -> Res<()> {
    let addr = SocketAddr::from_str(address)?;
    let app = build_router(state);

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    info!(%addr, "api server listening");
    axum::serve(listener, app).await?;
    Ok(())
}
