//! Boundary module for the Spotify Web API and accounts service.

pub mod auth;
mod client;
mod error;
pub mod models;

pub use auth::{AccountsClient, LoginStateStore, TokenResponse};
#[cfg(test)]
pub use client::MockSpotifyApi;
pub use client::{SpotifyApi, SpotifyClient, MAX_FEATURES_BATCH};
pub use error::SpotifyError;
