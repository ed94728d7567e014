use crate::spotify::{AccountsClient, LoginStateStore, SpotifyApi};
use std::sync::Arc;
use std::time::Instant;

/// Shared state handed to every handler.
///
/// Holds clients and the pending-login store only. Access tokens are never
/// stored here, they arrive with each request.
#[derive(Clone)]
pub struct ServerState {
    pub start_time: Instant,
    pub spotify: Arc<dyn SpotifyApi>,
    pub accounts: Arc<AccountsClient>,
    pub login_states: Arc<LoginStateStore>,
    pub default_threshold: f64,
}

impl ServerState {
    pub fn new(
        spotify: Arc<dyn SpotifyApi>,
        accounts: Arc<AccountsClient>,
        login_states: Arc<LoginStateStore>,
        default_threshold: f64,
    ) -> Self {
        Self {
            start_time: Instant::now(),
            spotify,
            accounts,
            login_states,
            default_threshold,
        }
    }
}
