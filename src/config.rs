//! Configuration management for the playlist builder.
//!
//! Configuration values come from environment variables and from a `.env`
//! file in the local data directory. The lookup order is:
//! 1. Environment variables (highest priority)
//! 2. `.env` file in the local data directory
//! 3. Application defaults (everything except the client id has one)

use std::{env, path::PathBuf};

use crate::{Res, error::Error};

pub const DEFAULT_AUTH_URL: &str = "https://accounts.spotify.com/authorize";
pub const DEFAULT_TOKEN_URL: &str = "https://accounts.spotify.com/api/token";
pub const DEFAULT_API_URL: &str = "https://api.spotify.com/v1";
pub const DEFAULT_REDIRECT_URI: &str = "http://127.0.0.1:5173/callback";
pub const DEFAULT_SERVER_ADDRESS: &str = "127.0.0.1:5173";
pub const DEFAULT_SCOPE: &str = "playlist-modify-public playlist-modify-private";

const APP_DIR: &str = "jammming";

/// Loads environment variables from a `.env` file in the local data directory.
///
/// Creates the directory if it does not exist yet. A missing `.env` file is
/// not an error, the process environment alone may carry the configuration.
///
/// # Directory Structure
///
/// - Linux: `~/.local/share/jammming/.env`
/// - macOS: `~/Library/Application Support/jammming/.env`
/// - Windows: `%LOCALAPPDATA%/jammming/.env`
///
/// # Errors
///
/// Fails if the directory cannot be created or if an existing `.env` file
/// cannot be parsed.
pub async fn load_env() -> Res<()> {
    let path = default_data_dir().join(".env");
    if let Some(parent) = path.parent() {
        async_fs::create_dir_all(parent).await?;
    }

    if path.is_file() {
        dotenv::from_path(&path).map_err(|e| Error::Config(e.to_string()))?;
    }
    Ok(())
}

/// Returns `<data_local_dir>/jammming`, falling back to `./jammming`.
pub fn default_data_dir() -> PathBuf {
    let mut path = dirs::data_local_dir().unwrap_or_else(|| PathBuf::from("."));
    path.push(APP_DIR);
    path
}

/// Runtime configuration of the application.
///
/// Built once at startup by [`Config::from_env`] and handed to the session
/// manager, the gateway and the callback server. Tests build it directly to
/// point every endpoint at a local mock.
#[derive(Debug, Clone)]
pub struct Config {
    /// Client id of the registered Spotify application.
    pub client_id: String,
    /// Callback URL registered with the application.
    pub redirect_uri: String,
    /// Space separated permission list requested during authorization.
    pub scope: String,
    pub auth_url: String,
    pub token_url: String,
    /// Base URL of the Web API, without trailing slash.
    pub api_url: String,
    /// Bind address of the local callback server.
    pub server_addr: String,
    /// Directory holding credentials, the draft and the last search.
    pub data_dir: PathBuf,
}

impl Config {
    /// Reads the configuration from the environment.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Config`] if `SPOTIFY_API_AUTH_CLIENT_ID` is not set or
    /// empty.
    pub fn from_env() -> Res<Self> {
        let client_id = env::var("SPOTIFY_API_AUTH_CLIENT_ID")
            .ok()
            .filter(|id| !id.trim().is_empty())
            .ok_or_else(|| Error::Config("SPOTIFY_API_AUTH_CLIENT_ID must be set".to_string()))?;

        Ok(Self {
            client_id,
            redirect_uri: var_or("SPOTIFY_API_REDIRECT_URI", DEFAULT_REDIRECT_URI),
            scope: var_or("SPOTIFY_API_AUTH_SCOPE", DEFAULT_SCOPE),
            auth_url: var_or("SPOTIFY_API_AUTH_URL", DEFAULT_AUTH_URL),
            token_url: var_or("SPOTIFY_API_TOKEN_URL", DEFAULT_TOKEN_URL),
            api_url: var_or("SPOTIFY_API_URL", DEFAULT_API_URL)
                .trim_end_matches('/')
                .to_string(),
            server_addr: var_or("SERVER_ADDRESS", DEFAULT_SERVER_ADDRESS),
            data_dir: env::var("JAMMMING_DATA_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(|_| default_data_dir()),
        })
    }
}

fn var_or(key: &str, default: &str) -> String {
    env::var(key)
        .ok()
        .filter(|v| !v.trim().is_empty())
        .unwrap_or_else(|| default.to_string())
}
