use axum::{
    Extension,
    extract::{Request, State},
    http::HeaderValue,
    middleware::Next,
    response::{Json, Response},
};
use serde_json::{Value, json};
use tracing::{debug, error};

use crate::{server::AppState, utils};

pub const SESSION_HEADER: &str = "session-id";

/// Session id attached to the request by [`ensure_session`].
#[derive(Debug, Clone)]
pub struct SessionId {
    pub id: String,
    /// True when the client sent no session and one was generated.
    pub fresh: bool,
}

impl SessionId {
    /// Prefers a session id from the request body over a freshly generated one.
    pub fn or_body(&self, body_session: Option<&str>) -> String {
        match body_session.map(str::trim).filter(|s| !s.is_empty()) {
            Some(id) if self.fresh => id.to_string(),
            _ => self.id.clone(),
        }
    }
}

pub async fn ensure_session(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Response {
    let sent = request
        .headers()
        .get(SESSION_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string);

    let session = match sent {
        Some(id) => SessionId { id, fresh: false },
        None => {
            let id = utils::new_session_id();
            if let Err(e) = state.sessions.register(&id).await {
                error!(error = %e, "cannot record new session");
            }
            debug!(session_id = %id, "session created");
            SessionId { id, fresh: true }
        }
    };

    let header = HeaderValue::from_str(&session.id).ok();
    request.extensions_mut().insert(session);

    let mut response = next.run(request).await;
    if let Some(value) = header {
        response.headers_mut().insert(SESSION_HEADER, value);
    }
    response
}

pub async fn check_session(
    State(state): State<AppState>,
    Extension(session): Extension<SessionId>,
) -> Json<Value> {
    let authorized = match state.tokens.retrieve(&session.id).await {
        Ok(credential) => credential.is_some(),
        Err(e) => {
            error!(error = %e, "cannot read credentials");
            false
        }
    };

    Json(json!({
        "session_id": session.id,
        "authorized": authorized,
    }))
}
