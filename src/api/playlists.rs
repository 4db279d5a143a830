use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde::Serialize;

use crate::{pipeline::PipelineOutcome, server::AppState};

use super::{
    DescriptionRequest, SessionId,
    error::{MSG_DESCRIPTION_REQUIRED, error_response, pipeline_error_response},
};

#[derive(Debug, Serialize)]
pub struct PlaylistResponse {
    pub authorized: bool,
    pub playlist_name: String,
    pub recommendation: Vec<String>,
    pub spotify_link: String,
    pub playlist_id: String,
    pub user_id: String,
}

impl From<PipelineOutcome> for PlaylistResponse {
    fn from(outcome: PipelineOutcome) -> Self {
        Self {
            authorized: true,
            playlist_name: outcome.recommendation.playlist_name,
            recommendation: outcome.recommendation.songs,
            spotify_link: outcome.playlist.link,
            playlist_id: outcome.playlist.id,
            user_id: outcome.user_id,
        }
    }
}

pub async fn playlists(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Json(body): Json<DescriptionRequest>,
) -> Response {
    let Some(description) = body.description() else {
        return error_response(StatusCode::BAD_REQUEST, MSG_DESCRIPTION_REQUIRED);
    };

    let session_id = session.or_body(body.session_id.as_deref());

    match state.pipeline.run(Some(&session_id), description).await {
        Ok(outcome) => Json(PlaylistResponse::from(outcome)).into_response(),
        Err(e) => pipeline_error_response(&state, &session_id, e).await,
    }
}
