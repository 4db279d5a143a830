use axum::{
    Extension,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Json, Response},
};
use serde_json::json;
use tracing::error;

use crate::server::AppState;

use super::{
    SessionId,
    error::{MSG_INTERNAL, error_response, unauthorized_response},
};

pub async fn history(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Response {
    let credential = match state.tokens.retrieve(&session.id).await {
        Ok(Some(credential)) => credential,
        Ok(None) => return unauthorized_response(&state, &session.id).await,
        Err(e) => {
            error!(error = %e, "cannot read credentials");
            return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
        }
    };

    let Some(user_id) = credential.catalog_user_id else {
        return Json(json!({ "user_id": null, "history": [] })).into_response();
    };

    match state.history.recent(&user_id).await {
        Ok(entries) => Json(json!({ "user_id": user_id, "history": entries })).into_response(),
        Err(e) => {
            error!(error = %e, "cannot read search history");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}
