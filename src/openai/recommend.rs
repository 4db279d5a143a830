use std::sync::Arc;

use serde_json::Value;
use thiserror::Error;
use tracing::{info, warn};

use crate::{
    normalize::{self, NormalizeError, Normalized},
    types::{ChatMessage, Recommendation},
};

use super::{ChatCompletion, LlmError};

/// Initial call plus two retries.
pub const MAX_ATTEMPTS: u32 = 3;

pub const SYSTEM_PROMPT: &str = "You are a music recommendation assistant.";

const PLAYLIST_NAME_KEY: &str = "Playlist name";
const SONGS_KEY: &str = "Songs";

#[derive(Debug, Error)]
pub enum RecommendError {
    #[error("description must not be empty")]
    EmptyDescription,

    #[error(transparent)]
    Upstream(#[from] LlmError),

    #[error("no usable recommendation after {attempts} attempts")]
    Unparsable { attempts: u32 },
}

/// Why a single reply could not be turned into a [`Recommendation`].
#[derive(Debug, Error)]
pub enum ReplyError {
    #[error(transparent)]
    Malformed(#[from] NormalizeError),

    #[error("reply contains no structure: {0}")]
    Unstructured(String),

    #[error("reply has the wrong shape: {0}")]
    Shape(&'static str),
}

impl TryFrom<Value> for Recommendation {
    type Error = ReplyError;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        let Value::Object(map) = value else {
            return Err(ReplyError::Shape("not an object"));
        };

        let playlist_name = map
            .get(PLAYLIST_NAME_KEY)
            .and_then(Value::as_str)
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .ok_or(ReplyError::Shape("missing playlist name"))?
            .to_string();

        let songs = map
            .get(SONGS_KEY)
            .and_then(Value::as_array)
            .ok_or(ReplyError::Shape("missing songs"))?
            .iter()
            .map(|song| song.as_str().map(|s| s.trim().to_string()))
            .collect::<Option<Vec<_>>>()
            .ok_or(ReplyError::Shape("songs must be strings"))?;

        if songs.is_empty() {
            return Err(ReplyError::Shape("no songs"));
        }

        Ok(Recommendation {
            playlist_name,
            songs,
        })
    }
}

pub fn build_messages(description: &str) -> Vec<ChatMessage> {
    let instruction = format!(
        "Please recommend 3 songs based on the following description: {description}. \
         Respond only with a dictionary in this exact format: \
         {{\"Playlist name\": \"MM<playlist name>\", \"Songs\": [\"Song Title by Artist\", \"Song Title by Artist\", \"Song Title by Artist\"]}}. \
         \"Songs\" must be an array of exactly 3 strings and the playlist name must start with \"MM\"."
    );

    vec![ChatMessage::system(SYSTEM_PROMPT), ChatMessage::user(instruction)]
}

/// Normalizes one model reply and checks it has the recommendation shape.
pub fn interpret_reply(reply: &str) -> Result<Recommendation, ReplyError> {
    match normalize::normalize(reply)? {
        Normalized::Parsed(value) => Recommendation::try_from(value),
        Normalized::Unparsed(text) => Err(ReplyError::Unstructured(text)),
    }
}

pub struct Recommender {
    client: Arc<dyn ChatCompletion>,
}

impl Recommender {
    pub fn new(client: Arc<dyn ChatCompletion>) -> Self {
        Self { client }
    }

    /// Asks the model for a playlist name and three songs.
    ///
    /// Replies that cannot be normalized are retried with a fresh call, up
    /// to [`MAX_ATTEMPTS`] calls in total. A failing upstream call ends the
    /// request immediately.
    pub async fn recommend(&self, description: &str) -> Result<Recommendation, RecommendError> {
        let description = description.trim();
        if description.is_empty() {
            return Err(RecommendError::EmptyDescription);
        }

        let messages = build_messages(description);

        for attempt in 1..=MAX_ATTEMPTS {
            let reply = self.client.complete(&messages).await?;

            match interpret_reply(&reply) {
                Ok(recommendation) => {
                    if recommendation.songs.len() != 3 {
                        warn!(
                            songs = recommendation.songs.len(),
                            "model returned an unexpected number of songs"
                        );
                    }
                    info!(attempt, playlist = %recommendation.playlist_name, "recommendation ready");
                    return Ok(recommendation);
                }
                Err(e) => warn!(attempt, error = %e, reply = %reply, "unusable model reply"),
            }
        }

        Err(RecommendError::Unparsable {
            attempts: MAX_ATTEMPTS,
        })
    }
}
