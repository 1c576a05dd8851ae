//! # CLI Module
//!
//! User-facing commands. Each command loads what it needs from the local data
//! directory, talks to Spotify through the [`ApiGateway`] and reports with the
//! coloured output macros.
//!
//! ## Commands
//!
//! - [`auth`], [`logout`], [`status`] - session handling
//! - [`search`] - catalog search, remembered as the last result set
//! - [`show_draft`], [`add_to_draft`], [`remove_from_draft`],
//!   [`rename_draft`], [`clear_draft`] - editing the local draft
//! - [`save_draft`] - saving the draft as a private playlist
//!
//! ## Typical session
//!
//! ```bash
//! jammming search "daft punk"          # numbered results
//! jammming draft add 1 3 4             # pick results by number
//! jammming draft rename "Road Trip"
//! jammming draft save
//! ```
//!
//! Commands that need the API start the browser authorization on their own
//! when there is no usable session. Fatal problems end the process through
//! [`error!`](crate::error!); search failures only warn.

mod auth;
mod draft;
mod search;

use std::time::Duration;

use indicatif::{ProgressBar, ProgressStyle};

pub use auth::{auth, logout, status};
pub use draft::{add_to_draft, clear_draft, remove_from_draft, rename_draft, save_draft, show_draft};
pub use search::search;

use crate::{
    config::Config,
    error,
    error::Error,
    info,
    management::CredentialStore,
    spotify::{self, ApiGateway, SessionManager},
    success,
};

/// Opens the session and returns a gateway holding a usable token, running
/// the browser authorization first if needed.
async fn connect(config: &Config) -> ApiGateway {
    let session = open_session(config).await;
    let mut gateway = ApiGateway::new(config, session);

    match gateway.session_mut().ensure_token().await {
        Ok(_) => {}
        Err(Error::Unauthenticated) => {
            info!("No usable session, starting authorization...");
            if let Err(e) = spotify::auth::login(gateway.session_mut()).await {
                error!("Authorization failed: {}", e);
            }
            success!("Authorization successful!");
        }
        Err(e) => error!("Failed to obtain an access token: {}", e),
    }

    gateway
}

async fn open_session(config: &Config) -> SessionManager {
    let store = CredentialStore::new(config.data_dir.clone());
    match SessionManager::open(config.clone(), store).await {
        Ok(session) => session,
        Err(e) => error!("Failed to load session from {}: {}", config.data_dir.display(), e),
    }
}

fn spinner(message: &str) -> ProgressBar {
    let pb = ProgressBar::new_spinner();
    pb.set_message(message.to_string());
    pb.enable_steady_tick(Duration::from_millis(100));
    if let Ok(style) = ProgressStyle::with_template("{spinner:.blue} {msg}") {
        pb.set_style(style.tick_chars("⠋⠙⠹⠸⠼⠴⠦⠧⠇⠏"));
    }
    pb
}
