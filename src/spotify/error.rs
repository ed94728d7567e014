use thiserror::Error;

/// Errors that can occur when talking to Spotify.
///
/// `Unauthorized` and `Forbidden` are kept distinct from `Upstream` so the
/// caller can decide to refresh the access token and retry exactly once.
/// Empty results (no features, no outliers) are never modeled as errors.
#[derive(Debug, Error)]
pub enum SpotifyError {
    #[error("no access token supplied")]
    MissingCredential,

    #[error("access token rejected by Spotify")]
    Unauthorized,

    #[error("access token lacks the required scope")]
    Forbidden,

    #[error("not found upstream: {0}")]
    NotFound(String),

    #[error("upstream error: {0}")]
    Upstream(String),
}

impl SpotifyError {
    /// Classify a non-success HTTP status from the Spotify API.
    pub fn from_status(status: reqwest::StatusCode, context: &str, body: String) -> Self {
        match status.as_u16() {
            401 => SpotifyError::Unauthorized,
            403 => SpotifyError::Forbidden,
            404 => SpotifyError::NotFound(context.to_string()),
            code => SpotifyError::Upstream(format!("{} failed with status {}: {}", context, code, body)),
        }
    }
}
