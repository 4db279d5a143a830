use async_trait::async_trait;
use reqwest::{RequestBuilder, StatusCode};
use serde::de::DeserializeOwned;
use tracing::{debug, error};

use crate::types::{
    AddTrackToPlaylistRequest, CreatePlaylistRequest, CreatePlaylistResponse, SearchResponse,
    Track, UserProfile,
};

use super::{Catalog, CatalogError, SpotifyClient};

/// Sends a request and returns the body of a 2xx response.
async fn send(operation: &'static str, request: RequestBuilder) -> Result<String, CatalogError> {
    let response = request
        .send()
        .await
        .map_err(|source| CatalogError::Transport { operation, source })?;

    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|source| CatalogError::Transport { operation, source })?;

    if status == StatusCode::UNAUTHORIZED {
        return Err(CatalogError::Unauthorized { operation });
    }

    if !status.is_success() {
        error!(operation, status = status.as_u16(), %body, "spotify request failed");
        return Err(CatalogError::Status {
            operation,
            status: status.as_u16(),
            body,
        });
    }

    debug!(operation, status = status.as_u16(), "spotify request succeeded");
    Ok(body)
}

fn decode<T: DeserializeOwned>(operation: &'static str, body: &str) -> Result<T, CatalogError> {
    serde_json::from_str(body).map_err(|e| CatalogError::Malformed {
        operation,
        reason: e.to_string(),
    })
}

#[async_trait]
impl Catalog for SpotifyClient {
    async fn search_tracks(
        &self,
        token: &str,
        query: &str,
        limit: u32,
    ) -> Result<Vec<Track>, CatalogError> {
        let operation = "search";
        let limit = limit.to_string();
        let request = self
            .http
            .get(self.api_url("/search"))
            .bearer_auth(token)
            .query(&[("q", query), ("type", "track"), ("limit", limit.as_str())]);

        let body = send(operation, request).await?;
        let json: SearchResponse = decode(operation, &body)?;
        Ok(json.tracks.items)
    }

    async fn current_user_id(&self, token: &str) -> Result<String, CatalogError> {
        let operation = "current_user";
        let request = self.http.get(self.api_url("/me")).bearer_auth(token);

        let body = send(operation, request).await?;
        let profile: UserProfile = decode(operation, &body)?;
        if profile.id.is_empty() {
            return Err(CatalogError::Malformed {
                operation,
                reason: "empty id".to_string(),
            });
        }
        Ok(profile.id)
    }

    async fn create_playlist(
        &self,
        token: &str,
        user_id: &str,
        request: &CreatePlaylistRequest,
    ) -> Result<CreatePlaylistResponse, CatalogError> {
        let operation = "create_playlist";
        let http_request = self
            .http
            .post(self.api_url(&format!("/users/{user_id}/playlists")))
            .bearer_auth(token)
            .json(request);

        let body = send(operation, http_request).await?;
        decode(operation, &body)
    }

    async fn add_tracks(
        &self,
        token: &str,
        playlist_id: &str,
        uris: &[String],
    ) -> Result<(), CatalogError> {
        let operation = "add_tracks";
        let request = self
            .http
            .post(self.api_url(&format!("/playlists/{playlist_id}/tracks")))
            .bearer_auth(token)
            .json(&AddTrackToPlaylistRequest {
                uris: uris.to_vec(),
            });

        send(operation, request).await.map(|_| ())
    }
}
