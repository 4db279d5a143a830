mod support;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use moodmix::{
    api::SESSION_HEADER,
    openai::ChatCompletion,
    server::{AppState, build_router},
    utils,
};
use serde_json::{Value, json};
use tower::ServiceExt;

use support::{FakeSpotify, GOOD_CODE, MOCK_REPLY, MOCK_USER, ScriptedChat, VALID_TOKEN};

const FRONTEND: &str = "http://localhost:3000";

async fn test_app(chat: Arc<dyn ChatCompletion>) -> (Router, AppState) {
    let state = AppState::new(
        support::memory_pool().await,
        chat,
        Arc::new(FakeSpotify::default()),
        support::spotify_config(),
        FRONTEND.to_string(),
    );
    (build_router(state.clone()), state)
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn post_json(uri: &str, session: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, session: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(id) = session {
        builder = builder.header(SESSION_HEADER, id);
    }
    builder.body(Body::empty()).unwrap()
}

#[tokio::test]
async fn test_health_assigns_session() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let session = response.headers().get(SESSION_HEADER).unwrap().to_str().unwrap();
    assert!(utils::is_valid_session_id(session));
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["database"], "ok");
}

#[tokio::test]
async fn test_health_reports_closed_database() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    state.pool.close().await;

    let response = app.oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
    let body = body_json(response).await;
    assert_eq!(body["status"], "degraded");
    assert_eq!(body["database"], "unavailable");
}

#[tokio::test]
async fn test_playlists_unauthorized_returns_login_link() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let session = utils::new_session_id();

    let response = app
        .oneshot(post_json(
            "/playlists",
            Some(&session),
            json!({ "description": "happy songs" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authorized"], false);
    let auth_url = body["auth_url"].as_str().unwrap();
    assert!(auth_url.starts_with("https://accounts.spotify.com/authorize?"));
    assert!(auth_url.contains(&format!("state={session}")));
    assert!(auth_url.contains("response_type=code"));
}

#[tokio::test]
async fn test_playlists_success() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let session = utils::new_session_id();
    state
        .tokens
        .store(&session, VALID_TOKEN, "refresh_token", None)
        .await
        .unwrap();

    let response = app
        .clone()
        .oneshot(post_json(
            "/playlists",
            Some(&session),
            json!({ "description": "happy songs" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["authorized"], true);
    assert_eq!(body["playlist_name"], "Mock Playlist");
    assert_eq!(body["playlist_id"], "mock_playlist_id");
    assert_eq!(body["user_id"], MOCK_USER);
    assert_eq!(
        body["spotify_link"],
        "https://open.spotify.com/playlist/mock_playlist_id"
    );
    assert_eq!(body["recommendation"].as_array().unwrap().len(), 3);

    let response = app.oneshot(get("/history", Some(&session))).await.unwrap();
    let body = body_json(response).await;
    assert_eq!(body["user_id"], MOCK_USER);
    assert_eq!(body["history"][0]["search_query"], "happy songs");
}

#[tokio::test]
async fn test_playlists_session_from_body() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let session = utils::new_session_id();
    state
        .tokens
        .store(&session, VALID_TOKEN, "refresh_token", None)
        .await
        .unwrap();

    let response = app
        .oneshot(post_json(
            "/playlists",
            None,
            json!({ "description": "happy songs", "session_id": session }),
        ))
        .await
        .unwrap();

    assert_eq!(body_json(response).await["authorized"], true);
}

#[tokio::test]
async fn test_playlists_blank_description() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;

    let response = app
        .oneshot(post_json("/playlists", None, json!({ "description": "   " })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "Description is required");
}

#[tokio::test]
async fn test_recommendations() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;

    let response = app
        .oneshot(post_json(
            "/recommendations",
            None,
            json!({ "description": "happy songs" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["recommendation"]["Playlist name"], "Mock Playlist");
    assert_eq!(body["recommendation"]["Songs"].as_array().unwrap().len(), 3);
}

#[tokio::test]
async fn test_recommendations_unparsable_hides_detail() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&["no idea"]))).await;

    let response = app
        .oneshot(post_json(
            "/recommendations",
            None,
            json!({ "description": "happy songs" }),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().contains("no idea"));
}

#[tokio::test]
async fn test_recommendations_missing_description() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;

    let response = app
        .oneshot(post_json("/recommendations", None, json!({})))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_callback_missing_code() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;

    let response = app.oneshot(get("/auth/callback", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = body_json(response).await;
    assert_eq!(body["error"], "missing_authorization_code");
    assert_eq!(
        body["error_description"],
        "Authorization code not found in request"
    );
}

#[tokio::test]
async fn test_callback_failed_exchange() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;

    let response = app
        .oneshot(get("/auth/callback?code=bad_code", None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "token_exchange_failed");
}

#[tokio::test]
async fn test_callback_stores_credential_and_redirects() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let session = utils::new_session_id();
    state.sessions.register(&session).await.unwrap();

    let response = app
        .clone()
        .oneshot(get(
            &format!("/auth/callback?code={GOOD_CODE}&state={session}"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.starts_with(FRONTEND));
    assert!(location.ends_with(&format!("session_id={session}")));

    let credential = state.tokens.retrieve(&session).await.unwrap().unwrap();
    assert_eq!(credential.access_token, VALID_TOKEN);
    assert_eq!(credential.catalog_user_id.as_deref(), Some(MOCK_USER));
    assert!(state.sessions.exists(&session).await.unwrap());

    let response = app
        .oneshot(get("/check_session", Some(&session)))
        .await
        .unwrap();
    let body = body_json(response).await;
    assert_eq!(body["authorized"], true);
    assert_eq!(body["session_id"], session.as_str());
}

#[tokio::test]
async fn test_callback_ignores_unknown_state() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let foreign = utils::new_session_id();

    let response = app
        .oneshot(get(
            &format!("/auth/callback?code={GOOD_CODE}&state={foreign}"),
            None,
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(!location.contains(&foreign));
    assert!(state.tokens.retrieve(&foreign).await.unwrap().is_none());

    let issued = location.rsplit("session_id=").next().unwrap();
    assert!(utils::is_valid_session_id(issued));
    assert!(state.tokens.retrieve(issued).await.unwrap().is_some());
}

#[tokio::test]
async fn test_unauthorized_link_is_accepted_by_callback() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let session = utils::new_session_id();

    app.clone()
        .oneshot(post_json(
            "/playlists",
            Some(&session),
            json!({ "description": "happy songs" }),
        ))
        .await
        .unwrap();

    app.oneshot(get(
        &format!("/auth/callback?code={GOOD_CODE}&state={session}"),
        None,
    ))
    .await
    .unwrap();

    assert!(state.tokens.retrieve(&session).await.unwrap().is_some());
}

#[tokio::test]
async fn test_login_ignores_unknown_session_param() {
    let (app, _) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let own = utils::new_session_id();
    let foreign = utils::new_session_id();

    let response = app
        .oneshot(get(&format!("/auth/login?session_id={foreign}"), Some(&own)))
        .await
        .unwrap();

    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains(&format!("state={own}")));
    assert!(!location.contains(&foreign));
}

#[tokio::test]
async fn test_login_redirects_to_provider() {
    let (app, state) = test_app(Arc::new(ScriptedChat::new(&[MOCK_REPLY]))).await;
    let session = utils::new_session_id();
    state.sessions.register(&session).await.unwrap();

    let response = app
        .oneshot(get(&format!("/auth/login?session_id={session}"), None))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::SEE_OTHER);
    let location = response
        .headers()
        .get(header::LOCATION)
        .unwrap()
        .to_str()
        .unwrap();
    assert!(location.contains(&format!("state={session}")));
}
