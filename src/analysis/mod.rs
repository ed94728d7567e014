//! Core analysis pipeline: feature aggregation and outlier detection.

mod aggregator;
mod outliers;

pub use aggregator::collect_track_features;
pub use outliers::{
    find_outliers, Feature, FeatureStats, TrackFeatures, CHECKED_FEATURES, DEFAULT_THRESHOLD,
};

use crate::spotify::{SpotifyApi, SpotifyError};
use tracing::info;

/// Analyze a playlist and return the tracks whose audio features deviate
/// from the playlist profile by more than `threshold` standard deviations.
///
/// Fetches the playlist, aggregates one feature vector per usable track and
/// runs the detector. An empty result means nothing unusual was found, it
/// is not a failure. The credential is an explicit value per call, no
/// session state is held anywhere in the pipeline.
pub async fn analyze_playlist(
    api: &dyn SpotifyApi,
    playlist_id: &str,
    token: &str,
    threshold: f64,
) -> Result<Vec<TrackFeatures>, SpotifyError> {
    if token.trim().is_empty() {
        return Err(SpotifyError::MissingCredential);
    }

    let playlist = api.get_playlist(playlist_id, token).await?;
    let vectors = collect_track_features(api, &playlist, token).await?;
    let outliers = find_outliers(&vectors, threshold);

    info!(
        playlist_id = %playlist_id,
        tracks = vectors.len(),
        outliers = outliers.len(),
        threshold,
        "Playlist analyzed"
    );

    Ok(outliers)
}
