//! Mapping of internal failures to caller-facing responses.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::{pipeline::PipelineError, server::AppState, spotify::auth};

pub const MSG_DESCRIPTION_REQUIRED: &str = "Description is required";
pub const MSG_TRY_AGAIN: &str = "Could not generate a recommendation right now. Please try again later.";
pub const MSG_LLM_UNAVAILABLE: &str = "Recommendation service unavailable";
pub const MSG_SPOTIFY_UNAVAILABLE: &str = "Spotify request failed";
pub const MSG_NO_TRACKS: &str = "No tracks found";
pub const MSG_PLAYLIST_FAILED: &str = "Failed to create playlist";
pub const MSG_ATTACH_FAILED: &str = "Failed to add tracks to playlist";
pub const MSG_INTERNAL: &str = "Internal server error";

pub fn error_response(status: StatusCode, message: &str) -> Response {
    (status, Json(json!({ "error": message }))).into_response()
}

/// Response for a session without usable credentials: not an error, but a
/// link the client can follow to log in again.
///
/// The session is registered so the callback accepts it as `state`.
pub async fn unauthorized_response(state: &AppState, session_id: &str) -> Response {
    if let Err(e) = state.sessions.register(session_id).await {
        error!(error = %e, "cannot record session");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
    }

    let auth_url = match auth::authorize_url(&state.spotify, session_id) {
        Ok(url) => url,
        Err(e) => {
            error!(error = %e, "cannot build authorize url");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
        }
    };

    Json(json!({
        "authorized": false,
        "auth_url": auth_url,
    }))
    .into_response()
}

pub async fn pipeline_error_response(state: &AppState, session_id: &str, err: PipelineError) -> Response {
    error!(operation = "playlist_pipeline", session_id, error = %err, "request failed");

    let (status, message) = match err {
        PipelineError::Unauthorized => return unauthorized_response(state, session_id).await,
        PipelineError::InvalidInput => (StatusCode::BAD_REQUEST, MSG_DESCRIPTION_REQUIRED),
        PipelineError::Unparsable { .. } => (StatusCode::INTERNAL_SERVER_ERROR, MSG_TRY_AGAIN),
        PipelineError::LanguageModel(_) => (StatusCode::BAD_GATEWAY, MSG_LLM_UNAVAILABLE),
        PipelineError::Catalog(_) => (StatusCode::BAD_GATEWAY, MSG_SPOTIFY_UNAVAILABLE),
        PipelineError::NoTracksFound => (StatusCode::NOT_FOUND, MSG_NO_TRACKS),
        PipelineError::PlaylistCreationFailed => {
            (StatusCode::INTERNAL_SERVER_ERROR, MSG_PLAYLIST_FAILED)
        }
        PipelineError::TrackAttachFailed { .. } => (StatusCode::BAD_GATEWAY, MSG_ATTACH_FAILED),
        PipelineError::Store(_) => (StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL),
    };

    error_response(status, message)
}
