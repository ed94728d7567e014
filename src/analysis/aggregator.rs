//! Assembles per-track feature vectors for a whole playlist.

use super::outliers::TrackFeatures;
use crate::spotify::models::Playlist;
use crate::spotify::{SpotifyApi, SpotifyError, MAX_FEATURES_BATCH};
use std::collections::HashMap;
use tracing::debug;

struct TrackMeta {
    name: String,
    artists: Vec<String>,
}

/// Build one feature vector per usable track in the playlist.
///
/// Slots without a track, without an id, or marked local have no feature
/// data and are silently dropped. The surviving ids are fetched in
/// consecutive batches of at most [`MAX_FEATURES_BATCH`]; the first failing
/// batch aborts the whole aggregation, partial data is never returned.
/// Tracks Spotify has no feature data for contribute nothing, which can
/// legitimately leave the result empty.
///
/// A blank token fails fast here as well as in
/// [`analyze_playlist`](super::analyze_playlist): both are public entry
/// points and neither may issue a request without a credential.
pub async fn collect_track_features(
    api: &dyn SpotifyApi,
    playlist: &Playlist,
    token: &str,
) -> Result<Vec<TrackFeatures>, SpotifyError> {
    if token.trim().is_empty() {
        return Err(SpotifyError::MissingCredential);
    }

    let mut ids: Vec<String> = Vec::new();
    let mut meta: HashMap<String, TrackMeta> = HashMap::new();
    for item in &playlist.tracks.items {
        let Some(track) = &item.track else { continue };
        if track.is_local {
            continue;
        }
        let Some(id) = &track.id else { continue };
        ids.push(id.clone());
        meta.insert(
            id.clone(),
            TrackMeta {
                name: track.name.clone(),
                artists: track.artists.iter().map(|a| a.name.clone()).collect(),
            },
        );
    }

    if ids.is_empty() {
        debug!(playlist_id = %playlist.id, "No usable track ids in playlist");
        return Ok(Vec::new());
    }

    debug!(
        playlist_id = %playlist.id,
        track_count = ids.len(),
        batches = ids.len().div_ceil(MAX_FEATURES_BATCH),
        "Aggregating audio features"
    );

    let mut vectors = Vec::with_capacity(ids.len());
    for batch in ids.chunks(MAX_FEATURES_BATCH) {
        let rows = api.get_audio_features(batch, token).await?;
        for features in rows.into_iter().flatten() {
            let Some(track) = meta.get(&features.id) else { continue };
            vectors.push(TrackFeatures {
                id: features.id.clone(),
                name: track.name.clone(),
                artists: track.artists.clone(),
                danceability: features.danceability,
                energy: features.energy,
                tempo: features.tempo,
                valence: features.valence,
            });
        }
    }

    Ok(vectors)
}
