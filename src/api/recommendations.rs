use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::{openai::RecommendError, server::AppState};

use super::{
    DescriptionRequest,
    error::{MSG_DESCRIPTION_REQUIRED, MSG_LLM_UNAVAILABLE, MSG_TRY_AGAIN, error_response},
};

pub async fn recommendations(
    State(state): State<AppState>,
    Json(body): Json<DescriptionRequest>,
) -> Response {
    let Some(description) = body.description() else {
        return error_response(StatusCode::BAD_REQUEST, MSG_DESCRIPTION_REQUIRED);
    };

    match state.recommender.recommend(description).await {
        Ok(recommendation) => Json(json!({ "recommendation": recommendation })).into_response(),
        Err(e) => {
            error!(operation = "recommendation", error = %e, "request failed");
            match e {
                RecommendError::EmptyDescription => {
                    error_response(StatusCode::BAD_REQUEST, MSG_DESCRIPTION_REQUIRED)
                }
                RecommendError::Upstream(_) => {
                    error_response(StatusCode::BAD_GATEWAY, MSG_LLM_UNAVAILABLE)
                }
                RecommendError::Unparsable { .. } => {
                    error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_TRY_AGAIN)
                }
            }
        }
    }
}
