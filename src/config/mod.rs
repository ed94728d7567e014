mod file_config;

pub use file_config::{AnalysisFileConfig, FileConfig, SpotifyFileConfig};

use crate::analysis::DEFAULT_THRESHOLD;
use anyhow::{bail, Result};

/// CLI arguments that participate in config resolution.
#[derive(Debug, Clone, Default)]
pub struct CliConfig {
    pub port: u16,
    pub frontend_dir_path: Option<String>,
}

/// Connection settings for Spotify.
#[derive(Debug, Clone)]
pub struct SpotifySettings {
    pub client_id: String,
    pub client_secret: String,
    pub redirect_uri: String,
    pub api_base_url: String,
    pub accounts_base_url: String,
    pub timeout_sec: u64,
}

/// Fully resolved application configuration.
#[derive(Debug, Clone)]
pub struct AppConfig {
    pub port: u16,
    pub frontend_dir_path: Option<String>,
    pub spotify: SpotifySettings,
    pub default_threshold: f64,
}

impl AppConfig {
    /// Resolve configuration from CLI arguments and optional TOML file
    /// config. TOML values override CLI values where present; Spotify
    /// credentials fall back to the SPOTIFY_* environment variables.
    pub fn resolve(cli: &CliConfig, file_config: Option<FileConfig>) -> Result<Self> {
        let file = file_config.unwrap_or_default();

        let port = file.port.unwrap_or(cli.port);
        let frontend_dir_path = file
            .frontend_dir_path
            .or_else(|| cli.frontend_dir_path.clone());

        let spotify_file = file.spotify.unwrap_or_default();
        let client_id = require_credential(spotify_file.client_id, "SPOTIFY_CLIENT_ID")?;
        let client_secret =
            require_credential(spotify_file.client_secret, "SPOTIFY_CLIENT_SECRET")?;
        let redirect_uri = require_credential(spotify_file.redirect_uri, "SPOTIFY_REDIRECT_URI")?;

        let spotify = SpotifySettings {
            client_id,
            client_secret,
            redirect_uri,
            api_base_url: spotify_file
                .api_base_url
                .unwrap_or_else(|| "https://api.spotify.com/v1".to_string()),
            accounts_base_url: spotify_file
                .accounts_base_url
                .unwrap_or_else(|| "https://accounts.spotify.com".to_string()),
            timeout_sec: spotify_file.timeout_sec.unwrap_or(30),
        };

        let analysis_file = file.analysis.unwrap_or_default();
        let default_threshold = analysis_file.default_threshold.unwrap_or(DEFAULT_THRESHOLD);
        if default_threshold <= 0.0 {
            bail!(
                "default_threshold must be positive, got {}",
                default_threshold
            );
        }

        Ok(Self {
            port,
            frontend_dir_path,
            spotify,
            default_threshold,
        })
    }
}

fn require_credential(from_file: Option<String>, env_var: &str) -> Result<String> {
    let value = match from_file {
        Some(v) => v,
        None => match std::env::var(env_var) {
            Ok(v) => v,
            Err(_) => bail!(
                "{} must be set in the [spotify] config section or as an environment variable",
                env_var
            ),
        },
    };
    if value.is_empty() {
        bail!("{} must not be empty", env_var);
    }
    Ok(value)
}
