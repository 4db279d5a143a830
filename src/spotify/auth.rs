use async_trait::async_trait;
use reqwest::{StatusCode, Url, header::AUTHORIZATION};
use serde_json::Value;
use tracing::{error, info};

use crate::{config::SpotifyConfig, types::Token, utils};

use super::{AuthError, Authorizer, SpotifyClient};

/// Builds the provider authorize URL the user is redirected to.
///
/// `state` carries the session id through the round trip so the callback
/// can attach the credential to the right session.
pub fn authorize_url(config: &SpotifyConfig, state: &str) -> Result<String, AuthError> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", config.scope.as_str()),
            ("state", state),
        ],
    )
    .map_err(|e| AuthError::InvalidUrl(format!("{}: {e}", config.auth_url)))?;

    Ok(url.into())
}

fn string_field(json: &Value, field: &str) -> Result<String, AuthError> {
    json[field]
        .as_str()
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .ok_or_else(|| AuthError::Malformed(format!("missing {field}")))
}

impl SpotifyClient {
    async fn token_request(&self, form: &[(&str, &str)]) -> Result<(StatusCode, String), AuthError> {
        let res = self
            .http
            .post(&self.config.token_url)
            .header(
                AUTHORIZATION,
                utils::basic_auth_header(&self.config.client_id, &self.config.client_secret),
            )
            .form(form)
            .send()
            .await?;

        let status = res.status();
        let body = res.text().await?;
        Ok((status, body))
    }
}

#[async_trait]
impl Authorizer for SpotifyClient {
    async fn exchange_code(&self, code: &str) -> Result<Token, AuthError> {
        let (status, body) = self
            .token_request(&[
                ("grant_type", "authorization_code"),
                ("code", code),
                ("redirect_uri", self.config.redirect_uri.as_str()),
            ])
            .await?;

        if !status.is_success() {
            error!(operation = "exchange_code", status = status.as_u16(), %body, "token exchange rejected");
            return Err(AuthError::ExchangeFailed {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value =
            serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;

        info!(operation = "exchange_code", "authorization code exchanged");
        Ok(Token {
            access_token: string_field(&json, "access_token")?,
            refresh_token: string_field(&json, "refresh_token")?,
        })
    }

    async fn refresh_access_token(&self, refresh_token: &str) -> Result<String, AuthError> {
        let (status, body) = self
            .token_request(&[
                ("grant_type", "refresh_token"),
                ("refresh_token", refresh_token),
            ])
            .await?;

        if !status.is_success() {
            error!(operation = "refresh_token", status = status.as_u16(), %body, "token refresh rejected");
            return Err(AuthError::RefreshFailed {
                status: status.as_u16(),
                body,
            });
        }

        let json: Value =
            serde_json::from_str(&body).map_err(|e| AuthError::Malformed(e.to_string()))?;

        info!(operation = "refresh_token", "access token refreshed");
        string_field(&json, "access_token")
    }
}
