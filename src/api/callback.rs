use axum::{
    Extension,
    extract::{Query, State},
    http::StatusCode,
    response::{IntoResponse, Json, Redirect, Response},
};
use reqwest::Url;
use serde::Deserialize;
use serde_json::json;
use tracing::{error, info, warn};

use crate::{server::AppState, spotify::auth, utils};

use super::{
    SessionId,
    error::{MSG_INTERNAL, error_response},
};

#[derive(Debug, Deserialize)]
pub struct LoginParams {
    pub session_id: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

fn oauth_error(error: &str, description: &str) -> Response {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({
            "error": error,
            "error_description": description,
        })),
    )
        .into_response()
}

/// Redirects to the Spotify authorize page.
///
/// A `session_id` query parameter is honored only when the server issued
/// it; otherwise the caller's own session is used and registered.
pub async fn login(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
    Query(params): Query<LoginParams>,
) -> Response {
    let requested = match params.session_id {
        Some(id) => registered_session(&state, &id).await,
        None => None,
    };

    let session_id = match requested {
        Some(id) => id,
        None => {
            if let Err(e) = state.sessions.register(&session.id).await {
                error!(error = %e, "cannot record session");
                return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
            }
            session.id
        }
    };

    match auth::authorize_url(&state.spotify, &session_id) {
        Ok(url) => Redirect::to(&url).into_response(),
        Err(e) => {
            error!(error = %e, "cannot build authorize url");
            error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL)
        }
    }
}

/// `Some(id)` when `id` is a well-formed session the server has issued.
async fn registered_session(state: &AppState, id: &str) -> Option<String> {
    if !utils::is_valid_session_id(id) {
        return None;
    }
    match state.sessions.exists(id).await {
        Ok(true) => Some(id.to_string()),
        Ok(false) => {
            warn!(session_id = %id, "unknown session in authorization request");
            None
        }
        Err(e) => {
            error!(error = %e, "cannot look up session");
            None
        }
    }
}

/// Completes the authorization-code flow.
///
/// The credential is bound to the session carried in `state` only when
/// that session was issued by this server; any other `state` gets a new
/// session. Sessions are bearer identifiers without cookie binding, so a
/// client that hands its own authorize link to someone else still
/// receives that person's credential. The front-end must only start the
/// flow from `/auth/login` for the session it holds.
pub async fn callback(
    State(state): State<AppState>,
    Query(params): Query<CallbackParams>,
) -> Response {
    if let Some(err) = params.error {
        warn!(error = %err, "authorization denied by provider");
        return oauth_error(&err, "Spotify authorization was not granted");
    }

    let Some(code) = params.code.filter(|c| !c.is_empty()) else {
        return oauth_error(
            "missing_authorization_code",
            "Authorization code not found in request",
        );
    };

    let token = match state.authorizer.exchange_code(&code).await {
        Ok(token) => token,
        Err(e) => {
            warn!(error = %e, "token exchange failed");
            return oauth_error("token_exchange_failed", "Could not complete Spotify login");
        }
    };

    let session_id = match params.state {
        Some(s) => registered_session(&state, &s).await,
        None => None,
    }
    .unwrap_or_else(utils::new_session_id);

    if let Err(e) = state.sessions.register(&session_id).await {
        error!(error = %e, "cannot record session");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
    }

    let user_id = match state.catalog.current_user_id(&token.access_token).await {
        Ok(id) => Some(id),
        Err(e) => {
            warn!(error = %e, "catalog user lookup failed during login");
            None
        }
    };

    if let Err(e) = state
        .tokens
        .store(
            &session_id,
            &token.access_token,
            &token.refresh_token,
            user_id.as_deref(),
        )
        .await
    {
        error!(error = %e, "cannot store credential");
        return error_response(StatusCode::INTERNAL_SERVER_ERROR, MSG_INTERNAL);
    }

    info!(session_id = %session_id, "session authorized");
    Redirect::to(&frontend_redirect(&state.frontend_url, &session_id)).into_response()
}

fn frontend_redirect(frontend_url: &str, session_id: &str) -> String {
    match Url::parse_with_params(frontend_url, &[("session_id", session_id)]) {
        Ok(url) => url.into(),
        Err(_) => format!("{frontend_url}?session_id={session_id}"),
    }
}
