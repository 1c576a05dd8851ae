use chrono::DateTime;

use crate::{
    config::Config, error, info, management::CredentialStore, spotify, success,
    types::SessionState, warning,
};

use super::open_session;

pub async fn auth(config: &Config) {
    let mut session = open_session(config).await;
    match spotify::auth::login(&mut session).await {
        Ok(()) => success!("Authentication successful!"),
        Err(e) => error!("Authentication failed: {}", e),
    }
}

/// Removes the credentials file without loading it first, so a damaged file
/// can always be cleared.
pub async fn logout(config: &Config) {
    let store = CredentialStore::new(config.data_dir.clone());
    match store.clear().await {
        Ok(()) => success!("Logged out, stored credentials removed."),
        Err(e) => error!("Failed to remove credentials: {}", e),
    }
}

pub async fn status(config: &Config) {
    let session = open_session(config).await;
    let state = match session.state().await {
        Ok(state) => state,
        Err(e) => error!("Failed to read session state: {}", e),
    };

    let expires = session
        .session()
        .and_then(|s| DateTime::from_timestamp(s.expires_at, 0))
        .map(|t| t.format("%Y-%m-%d %H:%M:%S UTC").to_string());

    match state {
        SessionState::Authorized => success!(
            "Authorized, token valid until {}",
            expires.unwrap_or_default()
        ),
        SessionState::Expired => warning!(
            "Token expired at {}, it will be refreshed on the next request",
            expires.unwrap_or_default()
        ),
        SessionState::PendingAuthorization => {
            warning!("An authorization was started but never completed. Run `jammming auth`.")
        }
        SessionState::NoSession => info!("Not logged in. Run `jammming auth`."),
    }
}
