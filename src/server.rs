use std::{net::SocketAddr, str::FromStr, sync::Arc};

use axum::{Extension, Router, routing::get};
use reqwest::Url;
use tokio::{sync::Mutex, task::JoinHandle};

use crate::{Res, api, config::Config, error::Error, types::CallbackParams, warning};

/// Slot the callback handler fills with the redirect parameters.
pub type CallbackSlot = Arc<Mutex<Option<CallbackParams>>>;

pub const DONE_PATH: &str = "/done";

pub fn router(callback_path: &str, slot: CallbackSlot) -> Router {
    Router::new()
        .route("/health", get(api::health))
        .route(callback_path, get(api::callback))
        .route(DONE_PATH, get(api::done))
        .layer(Extension(slot))
}

/// Binds the callback server and serves it on a background task.
///
/// The callback route is the path of the configured redirect URI. Returns the
/// bound address and the task handle; aborting the handle stops the server.
pub async fn start_api_server(
    config: &Config,
    slot: CallbackSlot,
) -> Res<(SocketAddr, JoinHandle<()>)> {
    let addr = SocketAddr::from_str(&config.server_addr).map_err(|e| {
        Error::Config(format!(
            "invalid server address `{}`: {}",
            config.server_addr, e
        ))
    })?;
    let callback_path = callback_path(&config.redirect_uri)?;

    let listener = tokio::net::TcpListener::bind(addr).await?;
    let local_addr = listener.local_addr()?;
    let app = router(&callback_path, slot);

    let handle = tokio::spawn(async move {
        if let Err(e) = axum::serve(listener, app).await {
            warning!("Callback server stopped: {}", e);
        }
    });

    Ok((local_addr, handle))
}

fn callback_path(redirect_uri: &str) -> Res<String> {
    let url = Url::parse(redirect_uri)
        .map_err(|e| Error::Config(format!("invalid redirect uri `{redirect_uri}`: {e}")))?;
    match url.path() {
        "" | "/" => Err(Error::Config(format!(
            "redirect uri `{redirect_uri}` needs a path such as /callback"
        ))),
        path => Ok(path.to_string()),
    }
}
