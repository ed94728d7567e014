//! Wire models for the subset of the Spotify Web API we consume.

use serde::Deserialize;

/// A playlist as returned by `GET /v1/playlists/{id}`.
///
/// Only the fields the analysis pipeline needs are deserialized, the rest of
/// the payload is ignored.
#[derive(Debug, Clone, Deserialize)]
pub struct Playlist {
    pub id: String,
    pub name: String,
    pub tracks: PlaylistTracks,
}

#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTracks {
    #[serde(default)]
    pub items: Vec<PlaylistItem>,
}

/// A slot in the playlist. The track can be absent (e.g. removed content).
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistItem {
    pub track: Option<PlaylistTrack>,
}

/// A track inside a playlist slot.
///
/// Local files carry no Spotify id and no audio features, they are skipped
/// by the aggregator. The id can also be null for some episode-like content.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaylistTrack {
    pub id: Option<String>,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub is_local: bool,
    #[serde(default)]
    pub artists: Vec<Artist>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Artist {
    pub name: String,
}

/// Audio features for a single track, from `GET /v1/audio-features?ids=...`.
#[derive(Debug, Clone, Deserialize)]
pub struct AudioFeatures {
    pub id: String,
    pub danceability: f64,
    pub energy: f64,
    pub tempo: f64,
    #[serde(default)]
    pub valence: f64,
}

/// Envelope of the batched audio-features endpoint. Spotify returns a null
/// entry for every id it has no data for, and the whole container can be
/// null or missing on degenerate inputs.
#[derive(Debug, Deserialize)]
pub struct AudioFeaturesResponse {
    #[serde(default)]
    pub audio_features: Option<Vec<Option<AudioFeatures>>>,
}
