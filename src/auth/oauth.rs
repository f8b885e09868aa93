use super::session::SessionUser;
use crate::config::Config;
use crate::error::{auth_error, config_error, AppResult};
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;
use url::Url;

/// Scopes requested at sign-in: identity plus full calendar access
pub const SCOPES: &str = "openid email profile https://www.googleapis.com/auth/calendar";

/// Token endpoint response
#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub scope: Option<String>,
}

/// Google OAuth authorization-code flow
pub struct GoogleOAuth {
    client: Client,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
    auth_url: Url,
    token_url: String,
    userinfo_url: String,
}

impl GoogleOAuth {
    pub fn new(client: Client, config: &Config) -> AppResult<Self> {
        let auth_url = Url::parse(&config.endpoints.auth_url)
            .map_err(|e| config_error(&format!("Invalid authorization URL: {}", e)))?;

        Ok(Self {
            client,
            client_id: config.google_client_id.clone(),
            client_secret: config.google_client_secret.clone(),
            redirect_uri: config.redirect_uri(),
            auth_url,
            token_url: config.endpoints.token_url.clone(),
            userinfo_url: config.endpoints.userinfo_url.clone(),
        })
    }

    /// Build the URL the browser is sent to for consent
    pub fn authorize_url(&self, state: &str) -> Url {
        let mut url = self.auth_url.clone();
        url.query_pairs_mut()
            .append_pair("client_id", &self.client_id)
            .append_pair("redirect_uri", &self.redirect_uri)
            .append_pair("response_type", "code")
            .append_pair("scope", SCOPES)
            .append_pair("prompt", "select_account")
            .append_pair("state", state);
        url
    }

    /// Exchange an authorization code for tokens
    pub async fn exchange_code(&self, code: &str) -> AppResult<TokenResponse> {
        let params = [
            ("client_id", self.client_id.as_str()),
            ("client_secret", self.client_secret.as_str()),
            ("code", code),
            ("redirect_uri", self.redirect_uri.as_str()),
            ("grant_type", "authorization_code"),
        ];

        let response = self
            .client
            .post(&self.token_url)
            .form(&params)
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to exchange code: {}", e)))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_body = response
                .text()
                .await
                .unwrap_or_else(|_| "Could not read error response".to_string());
            return Err(auth_error(&format!(
                "Failed to get token: HTTP {} - {}",
                status, error_body
            )));
        }

        let token: TokenResponse = response
            .json()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse token response: {}", e)))?;
        debug!(scope = ?token.scope, "received access token");

        Ok(token)
    }

    /// Look up the signed-in user's identity
    pub async fn fetch_user(&self, access_token: &str) -> AppResult<SessionUser> {
        let response = self
            .client
            .get(&self.userinfo_url)
            .header("Authorization", format!("Bearer {}", access_token))
            .send()
            .await
            .map_err(|e| auth_error(&format!("Failed to fetch user info: {}", e)))?;

        if !response.status().is_success() {
            return Err(auth_error(&format!(
                "Failed to fetch user info: HTTP {}",
                response.status()
            )));
        }

        response
            .json::<SessionUser>()
            .await
            .map_err(|e| auth_error(&format!("Failed to parse user info: {}", e)))
    }
}
