use std::{sync::Arc, time::Duration};

use indicatif::{ProgressBar, ProgressStyle};

use crate::{
    config::OpenAiConfig,
    error, info,
    openai::{OpenAiClient, Recommender},
    success, warning,
};

pub async fn recommend(description: String) {
    let config = match OpenAiConfig::from_env() {
        Ok(config) => config,
        Err(e) => error!("Invalid OpenAI configuration: {}", e),
    };
    let recommender = Recommender::new(Arc::new(OpenAiClient::new(config)));

    let pb = ProgressBar::new_spinner();
    pb.enable_steady_tick(Duration::from_millis(120));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style);
    }
    pb.set_message("Asking the language model for songs...");

    let result = recommender.recommend(&description).await;
    pb.finish_and_clear();

    match result {
        Ok(recommendation) => {
            success!("{}", recommendation.playlist_name);
            if recommendation.songs.len() != 3 {
                warning!(
                    "Model returned {} songs instead of 3",
                    recommendation.songs.len()
                );
            }
            for (i, song) in recommendation.songs.iter().enumerate() {
                info!("{}. {}", i + 1, song);
            }
        }
        Err(e) => error!("No recommendation: {}", e),
    }
}
