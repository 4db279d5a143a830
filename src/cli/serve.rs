use std::sync::Arc;

use crate::{
    config::{OpenAiConfig, ServerConfig, SpotifyConfig},
    error, info, management,
    openai::OpenAiClient,
    server::{self, AppState},
    spotify::SpotifyClient,
};

pub async fn serve() {
    let server_config = match ServerConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid server configuration: {}", e),
    };
    let openai_config = match OpenAiConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid OpenAI configuration: {}", e),
    };
    let spotify_config = match SpotifyConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid Spotify configuration: {}", e),
    };

    let pool = match management::connect(&server_config.database_url).await {
        Ok(pool) => pool,
        Err(e) => error!("Cannot open database: {}", e),
    };

    let state = AppState::new(
        pool,
        Arc::new(OpenAiClient::new(openai_config)),
        Arc::new(SpotifyClient::new(spotify_config.clone())),
        spotify_config,
        server_config.frontend_url.clone(),
    );

    info!("Starting server on {}", server_config.address);
    if let Err(e) = server::start_api_server(&server_config.address, state).await {
        error!("Server stopped: {}", e);
    }
}
