#![allow(dead_code)]

use std::sync::{
    Arc, Mutex,
    atomic::{AtomicUsize, Ordering},
};

use async_trait::async_trait;
use sqlx::SqlitePool;

use moodmix::{
    config::SpotifyConfig,
    management::{self, HistoryStore, TokenStore},
    openai::{ChatCompletion, LlmError, Recommender},
    pipeline::PlaylistPipeline,
    spotify::{
        AttachPolicy, AuthError, Authorizer, Catalog, CatalogError, CatalogResolver,
        PlaylistOrchestrator,
    },
    types::{ChatMessage, CreatePlaylistRequest, CreatePlaylistResponse, Token, Track},
};

pub const MOCK_REPLY: &str = r#"{"Playlist name": "Mock Playlist", "Songs": ["Happy by Pharrell Williams", "Walking on Sunshine by Katrina and the Waves", "Good as Hell by Lizzo"]}"#;

pub const MOCK_USER: &str = "mock_user";
pub const MOCK_PLAYLIST_ID: &str = "mock_playlist_id";
pub const VALID_TOKEN: &str = "valid_access_token";
pub const REFRESHED_TOKEN: &str = "refreshed_access_token";
pub const GOOD_CODE: &str = "good_code";

/// Chat client replaying canned replies; the last reply repeats.
pub struct ScriptedChat {
    replies: Vec<String>,
    pub calls: AtomicUsize,
}

impl ScriptedChat {
    pub fn new(replies: &[&str]) -> Self {
        Self {
            replies: replies.iter().map(|r| r.to_string()).collect(),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ChatCompletion for ScriptedChat {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        let call = self.calls.fetch_add(1, Ordering::SeqCst);
        let index = call.min(self.replies.len().saturating_sub(1));
        Ok(self.replies[index].clone())
    }
}

/// Chat client whose endpoint always answers 503.
#[derive(Default)]
pub struct FailingChat {
    pub calls: AtomicUsize,
}

#[async_trait]
impl ChatCompletion for FailingChat {
    async fn complete(&self, _messages: &[ChatMessage]) -> Result<String, LlmError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        Err(LlmError::Status {
            status: 503,
            body: "overloaded".to_string(),
        })
    }
}

/// In-memory stand-in for the Spotify accounts service and Web API.
pub struct FakeSpotify {
    /// Queries that have a catalog match.
    pub known_songs: Vec<String>,
    /// Token the catalog accepts; anything else is a 401.
    pub accepted_token: Mutex<String>,
    /// Token handed out on refresh, `None` makes the refresh fail.
    pub refresh_to: Option<String>,
    pub create_id: Option<String>,
    pub attach_fails: bool,
    pub searches: AtomicUsize,
    pub creates: AtomicUsize,
    pub attaches: Mutex<Vec<Vec<String>>>,
    pub refreshes: AtomicUsize,
}

impl Default for FakeSpotify {
    fn default() -> Self {
        Self {
            known_songs: vec![
                "Happy by Pharrell Williams".to_string(),
                "Walking on Sunshine by Katrina and the Waves".to_string(),
                "Good as Hell by Lizzo".to_string(),
            ],
            accepted_token: Mutex::new(VALID_TOKEN.to_string()),
            refresh_to: Some(REFRESHED_TOKEN.to_string()),
            create_id: Some(MOCK_PLAYLIST_ID.to_string()),
            attach_fails: false,
            searches: AtomicUsize::new(0),
            creates: AtomicUsize::new(0),
            attaches: Mutex::new(Vec::new()),
            refreshes: AtomicUsize::new(0),
        }
    }
}

impl FakeSpotify {
    fn check(&self, operation: &'static str, token: &str) -> Result<(), CatalogError> {
        if *self.accepted_token.lock().unwrap() == token {
            Ok(())
        } else {
            Err(CatalogError::Unauthorized { operation })
        }
    }

    pub fn attached(&self) -> Vec<Vec<String>> {
        self.attaches.lock().unwrap().clone()
    }
}

pub fn uri_for(song: &str) -> String {
    format!("spotify:track:{}", song.replace(' ', "_").to_lowercase())
}

#[async_trait]
impl Catalog for FakeSpotify {
    async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        _limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        self.searches.fetch_add(1, Ordering::SeqCst);
        self.check("search", token)?;

        Ok(self
            .known_songs
            .iter()
            .filter(|song| song.as_str() == query)
            .map(|song| Track {
                id: song.to_lowercase(),
                name: song.clone(),
                uri: uri_for(song),
            })
            .collect())
    }

    async fn current_user_id(&self, token: &str) -> Result<String, CatalogError> {
        self.check("current_user", token)?;
        Ok(MOCK_USER.to_string())
    }

    async fn create_playlist(
        &self,
        token: &str,
        _user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, CatalogError> {
        self.creates.fetch_add(1, Ordering::SeqCst);
        self.check("create_playlist", token)?;
        Ok(CreatePlaylistResponse {
            id: self.create_id.clone(),
            name: Some(request.name.clone()),
        })
    }

    async fn add_tracks(
        &self,
        token: &str,
        _playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        self.check("add_tracks", token)?;
        if self.attach_fails {
            return Err(CatalogError::Status {
                operation: "add_tracks",
                status: 500,
                body: "server error".to_string(),
            });
        }
        self.attaches.lock().unwrap().push(uris.to_vec());
        Ok(())
    }
}

#[async_trait]
impl Authorizer for FakeSpotify {
    async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        if code == GOOD_CODE {
            Ok(Token {
                access_token: VALID_TOKEN.to_string(),
                refresh_token: "refresh_token".to_string(),
            })
        } else {
            Err(AuthError::ExchangeFailed {
                status: 400,
                body: "invalid_grant".to_string(),
            })
        }
    }

    async fn refresh_access_token(&self, _refresh_token: &str) -> Result<String, AuthError> {
        self.refreshes.fetch_add(1, Ordering::SeqCst);
        match &self.refresh_to {
            Some(token) => {
                *self.accepted_token.lock().unwrap() = token.clone();
                Ok(token.clone())
            }
            None => Err(AuthError::RefreshFailed {
                status: 400,
                body: "invalid_grant".to_string(),
            }),
        }
    }
}

pub fn spotify_config() -> SpotifyConfig {
    SpotifyConfig {
        client_id: "client_id".to_string(),
        client_secret: "client_secret".to_string(),
        redirect_uri: "http://127.0.0.1:8080/auth/callback".to_string(),
        auth_url: "https://accounts.spotify.com/authorize".to_string(),
        token_url: "https://accounts.spotify.com/api/token".to_string(),
        api_url: "https://api.spotify.com/v1".to_string(),
        open_url: "https://open.spotify.com".to_string(),
        scope: "playlist-modify-private user-read-private".to_string(),
        attach_policy: AttachPolicy::FireAndForget,
    }
}

pub async fn memory_pool() -> SqlitePool {
    management::connect("sqlite::memory:").await.unwrap()
}

pub struct Harness {
    pub pipeline: PlaylistPipeline,
    pub tokens: TokenStore,
    pub history: HistoryStore,
}

pub async fn harness(
    chat: Arc<dyn ChatCompletion>,
    spotify: Arc<FakeSpotify>,
    policy: AttachPolicy,
) -> Harness {
    let pool = memory_pool().await;
    let tokens = TokenStore::new(pool.clone(), spotify.clone());
    let history = HistoryStore::new(pool);

    let pipeline = PlaylistPipeline::new(
        Arc::new(Recommender::new(chat)),
        CatalogResolver::new(spotify.clone()),
        PlaylistOrchestrator::new(spotify, "https://open.spotify.com", policy),
        tokens.clone(),
        history.clone(),
    );

    Harness {
        pipeline,
        tokens,
        history,
    }
}
