//! Spotify accounts service client.
//!
//! Handles the OAuth authorization-code flow at the boundary:
//! - Authorization URL generation with a random `state` parameter
//! - Token exchange (authorization code for tokens)
//! - Access token refresh
//!
//! Tokens are delivered to the caller as a JSON body, never via URL
//! fragments. The core analysis pipeline only ever sees the bearer token
//! the caller passes back on each request.

use super::error::SpotifyError;
use crate::config::SpotifySettings;
use base64::{engine::general_purpose::STANDARD, Engine};
use rand::{distr::Alphanumeric, Rng};
use reqwest::Client;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;
use tracing::debug;

/// Scope needed to read the user's private playlists.
const AUTH_SCOPE: &str = "playlist-read-private";

/// How long a pending login state stays valid.
const LOGIN_STATE_TTL_SECS: i64 = 300;

/// Tokens returned by the accounts service.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: String,
    pub expires_in: u64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scope: Option<String>,
}

/// Client for the Spotify accounts service.
pub struct AccountsClient {
    client: Client,
    base_url: String,
    client_id: String,
    client_secret: String,
    redirect_uri: String,
}

impl AccountsClient {
    pub fn new(settings: &SpotifySettings) -> Self {
        Self {
            client: Client::new(),
            base_url: settings.accounts_base_url.clone(),
            client_id: settings.client_id.clone(),
            client_secret: settings.client_secret.clone(),
            redirect_uri: settings.redirect_uri.clone(),
        }
    }

    /// Build the authorization URL the user is redirected to.
    ///
    /// The `state` value must be stored server-side and validated in the
    /// callback before exchanging the code.
    pub fn authorize_url(&self, state: &str) -> String {
        format!(
            "{}/authorize?client_id={}&response_type=code&redirect_uri={}&scope={}&state={}",
            self.base_url,
            urlencoding::encode(&self.client_id),
            urlencoding::encode(&self.redirect_uri),
            urlencoding::encode(AUTH_SCOPE),
            urlencoding::encode(state),
        )
    }

    /// Exchange an authorization code for tokens.
    pub async fn exchange_code(&self, code: &str) -> Result<TokenResponse, SpotifyError> {
        debug!("Exchanging authorization code for tokens");
        self.token_request(&[
            ("grant_type", "authorization_code"),
            ("code", code),
            ("redirect_uri", &self.redirect_uri),
        ])
        .await
    }

    /// Obtain a fresh access token from a refresh token.
    ///
    /// Spotify may rotate the refresh token; when it does the new one is in
    /// the response, otherwise the caller keeps using the old one.
    pub async fn refresh_access_token(
        &self,
        refresh_token: &str,
    ) -> Result<TokenResponse, SpotifyError> {
        debug!("Refreshing access token");
        self.token_request(&[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ])
        .await
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse, SpotifyError> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let url = format!("{}/api/token", self.base_url);

        let response = self
            .client
            .post(&url)
            .header(reqwest::header::AUTHORIZATION, format!("Basic {}", credentials))
            .form(form)
            .send()
            .await
            .map_err(|e| SpotifyError::Upstream(format!("token request: {}", e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::from_status(status, "token request", body));
        }

        response
            .json::<TokenResponse>()
            .await
            .map_err(|e| SpotifyError::Upstream(format!("invalid token response: {}", e)))
    }
}

/// Generate a random `state` value for the authorization flow.
pub fn new_login_state() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(32)
        .map(char::from)
        .collect()
}

/// Thread-safe storage for pending login states (in-memory for simplicity).
/// Each state is single-use and expires after five minutes.
pub struct LoginStateStore {
    states: RwLock<std::collections::HashMap<String, i64>>,
}

impl LoginStateStore {
    pub fn new() -> Self {
        Self {
            states: RwLock::new(std::collections::HashMap::new()),
        }
    }

    /// Store a freshly generated state.
    pub async fn store(&self, state: String) {
        let mut states = self.states.write().await;
        states.insert(state, chrono::Utc::now().timestamp());
    }

    /// Retrieve and remove a state. Returns false for unknown or expired
    /// states, in which case the callback must be rejected.
    pub async fn take(&self, state: &str) -> bool {
        let now = chrono::Utc::now().timestamp();
        let mut states = self.states.write().await;
        match states.remove(state) {
            Some(created_at) => now - created_at < LOGIN_STATE_TTL_SECS,
            None => false,
        }
    }

    /// Drop states older than the TTL.
    pub async fn cleanup_expired(&self) {
        let now = chrono::Utc::now().timestamp();
        let mut states = self.states.write().await;
        states.retain(|_, created_at| now - *created_at < LOGIN_STATE_TTL_SECS);
    }
}

impl Default for LoginStateStore {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_settings() -> SpotifySettings {
        SpotifySettings {
            client_id: "client-abc".to_string(),
            client_secret: "secret-xyz".to_string(),
            redirect_uri: "http://localhost:3000/api/auth/callback".to_string(),
            api_base_url: "https://api.spotify.com/v1".to_string(),
            accounts_base_url: "https://accounts.spotify.com".to_string(),
            timeout_sec: 30,
        }
    }

    #[test]
    fn authorize_url_carries_required_params() {
        let client = AccountsClient::new(&test_settings());
        let url = client.authorize_url("state123");

        assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
        assert!(url.contains("client_id=client-abc"));
        assert!(url.contains("response_type=code"));
        assert!(url.contains("scope=playlist-read-private"));
        assert!(url.contains("state=state123"));
        // The redirect URI must be url-encoded.
        assert!(url.contains(
            "redirect_uri=http%3A%2F%2Flocalhost%3A3000%2Fapi%2Fauth%2Fcallback"
        ));
    }

    #[test]
    fn login_states_are_random_and_long_enough() {
        let a = new_login_state();
        let b = new_login_state();
        assert_eq!(a.len(), 32);
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn login_state_is_single_use() {
        let store = LoginStateStore::new();
        store.store("state-1".to_string()).await;

        assert!(store.take("state-1").await);
        // Already consumed.
        assert!(!store.take("state-1").await);
        // Never stored.
        assert!(!store.take("state-2").await);
    }

    #[tokio::test]
    async fn expired_login_states_are_rejected_and_cleaned_up() {
        let store = LoginStateStore::new();
        {
            let mut states = store.states.write().await;
            states.insert(
                "old-state".to_string(),
                chrono::Utc::now().timestamp() - 400,
            );
        }

        store.cleanup_expired().await;
        assert!(!store.take("old-state").await);
    }
}
