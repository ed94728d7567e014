//! Spotify Web API client.

use super::error::SpotifyError;
use super::models::{AudioFeatures, AudioFeaturesResponse, Playlist};
use async_trait::async_trait;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Hard per-request limit of the batched audio-features endpoint.
pub const MAX_FEATURES_BATCH: usize = 100;

/// Boundary trait for the Spotify Web API reads the analysis pipeline needs.
///
/// The credential is an explicit bearer token on every call, the client
/// holds no session state.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait SpotifyApi: Send + Sync {
    /// Fetch a playlist with its track list.
    async fn get_playlist(&self, playlist_id: &str, token: &str)
        -> Result<Playlist, SpotifyError>;

    /// Fetch audio features for up to [`MAX_FEATURES_BATCH`] track ids.
    ///
    /// Returns one entry per requested id, in request order, `None` where
    /// Spotify has no feature data for that id.
    async fn get_audio_features(
        &self,
        ids: &[String],
        token: &str,
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError>;
}

/// Reqwest-backed implementation against the real Web API.
pub struct SpotifyClient {
    client: Client,
    base_url: String,
}

impl SpotifyClient {
    /// # Arguments
    /// * `base_url` - Base URL of the Web API (e.g. "https://api.spotify.com/v1").
    /// * `timeout` - Per-request timeout, propagated as an upstream error.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, SpotifyError> {
        let client = Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| SpotifyError::Upstream(format!("failed to build HTTP client: {}", e)))?;
        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    async fn get_json<T: serde::de::DeserializeOwned>(
        &self,
        url: String,
        token: &str,
        context: &str,
    ) -> Result<T, SpotifyError> {
        let response = self
            .client
            .get(&url)
            .bearer_auth(token)
            .send()
            .await
            .map_err(|e| SpotifyError::Upstream(format!("{}: {}", context, e)))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SpotifyError::from_status(status, context, body));
        }

        response
            .json::<T>()
            .await
            .map_err(|e| SpotifyError::Upstream(format!("{}: invalid response body: {}", context, e)))
    }
}

#[async_trait]
impl SpotifyApi for SpotifyClient {
    async fn get_playlist(
        &self,
        playlist_id: &str,
        token: &str,
    ) -> Result<Playlist, SpotifyError> {
        debug!(playlist_id = %playlist_id, "Fetching playlist");
        let url = format!("{}/playlists/{}", self.base_url, playlist_id);
        self.get_json(url, token, &format!("playlist {}", playlist_id))
            .await
    }

    async fn get_audio_features(
        &self,
        ids: &[String],
        token: &str,
    ) -> Result<Vec<Option<AudioFeatures>>, SpotifyError> {
        debug_assert!(ids.len() <= MAX_FEATURES_BATCH);
        debug!(batch_size = ids.len(), "Fetching audio features batch");

        let url = format!("{}/audio-features?ids={}", self.base_url, ids.join(","));
        let response: AudioFeaturesResponse =
            self.get_json(url, token, "audio features").await?;

        // A null container means zero vectors for this batch, not a failure.
        Ok(response.audio_features.unwrap_or_default())
    }
}
