use std::{sync::Arc, time::Duration};

use reqwest::{Client, Url};
use tokio::sync::Mutex;

use crate::{
    Res,
    config::Config,
    error::Error,
    info,
    management::CredentialStore,
    server::{CallbackSlot, start_api_server},
    types::{
        AuthorizationRequest, CallbackParams, PendingAuthorization, Session, SessionState,
        TokenResponse,
    },
    utils, warning,
};

/// How long `login` waits for the user to finish in the browser.
pub const CALLBACK_TIMEOUT: Duration = Duration::from_secs(120);

/// Source of the current unix time in seconds.
pub trait Clock: Send + Sync {
    fn now(&self) -> i64;
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> i64 {
        utils::now_timestamp()
    }
}

/// Owns the access-token lifecycle of one data directory.
///
/// The session is loaded from the [`CredentialStore`] when the manager is
/// opened and written back on every change. Authorization is split in two
/// entry points: [`begin_authorization`](Self::begin_authorization) only
/// stores the PKCE secret and hands out the authorize URL, and
/// [`complete_authorization`](Self::complete_authorization) consumes the
/// redirect parameters.
pub struct SessionManager {
    config: Config,
    store: CredentialStore,
    http: Client,
    clock: Arc<dyn Clock>,
    session: Option<Session>,
}

impl SessionManager {
    pub async fn open(config: Config, store: CredentialStore) -> Res<Self> {
        Self::open_with_clock(config, store, Arc::new(SystemClock)).await
    }

    pub async fn open_with_clock(
        config: Config,
        store: CredentialStore,
        clock: Arc<dyn Clock>,
    ) -> Res<Self> {
        let session = store.load(clock.now()).await?;
        Ok(Self {
            config,
            store,
            http: Client::new(),
            clock,
            session,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn session(&self) -> Option<&Session> {
        self.session.as_ref()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.session.as_ref().is_some_and(Session::has_refresh_token)
    }

    pub async fn state(&self) -> Res<SessionState> {
        let state = match &self.session {
            Some(session) if session.is_usable_at(self.clock.now()) => SessionState::Authorized,
            Some(_) => SessionState::Expired,
            None => {
                if self.store.has_pending().await? {
                    SessionState::PendingAuthorization
                } else {
                    SessionState::NoSession
                }
            }
        };
        Ok(state)
    }

    /// Returns a usable access token.
    ///
    /// A token still valid for more than the safety margin is returned as is,
    /// without touching the network. An expired token is refreshed when a
    /// refresh token exists. If there is nothing to refresh, or the refresh
    /// fails, the session is dropped and [`Error::Unauthenticated`] tells the
    /// caller to start a new authorization.
    pub async fn ensure_token(&mut self) -> Res<String> {
        let now = self.clock.now();
        let Some(session) = &self.session else {
            return Err(Error::Unauthenticated);
        };

        if session.is_usable_at(now) {
            return Ok(session.access_token.clone());
        }

        if !session.has_refresh_token() {
            self.clear_session().await?;
            return Err(Error::Unauthenticated);
        }

        match self.refresh().await {
            Ok(token) => Ok(token),
            Err(Error::TokenRefreshFailed(reason)) => {
                warning!("Session expired and could not be renewed: {}", reason);
                Err(Error::Unauthenticated)
            }
            Err(e) => Err(e),
        }
    }

    /// Stores a fresh PKCE verifier and state and returns the URL of the
    /// authorization page. The caller is expected to send the user there; no
    /// token is produced by this call.
    pub async fn begin_authorization(&mut self) -> Res<AuthorizationRequest> {
        let code_verifier = utils::generate_code_verifier(utils::CODE_VERIFIER_LENGTH);
        let code_challenge = utils::generate_code_challenge(&code_verifier);
        let state = utils::generate_state(utils::STATE_LENGTH);

        self.store
            .save_pending(&PendingAuthorization {
                code_verifier,
                state: state.clone(),
            })
            .await?;

        let url = build_authorize_url(&self.config, &code_challenge, &state)?;
        Ok(AuthorizationRequest { url, state })
    }

    /// Finishes the handshake with the parameters of the authorization
    /// redirect.
    ///
    /// The pending verifier is consumed whatever the outcome. A provider
    /// error, a missing pending authorization or a `state` that differs from
    /// the stored one are rejected with [`Error::AuthorizationDenied`] before
    /// any exchange is attempted.
    pub async fn complete_authorization(&mut self, params: &CallbackParams) -> Res<String> {
        let pending = self.store.take_pending().await?;

        if let Some(error) = &params.error {
            return Err(Error::AuthorizationDenied(format!(
                "provider returned `{error}`"
            )));
        }

        let Some(pending) = pending else {
            return Err(Error::AuthorizationDenied(
                "no authorization in progress".to_string(),
            ));
        };

        if params.state.as_deref() != Some(pending.state.as_str()) {
            return Err(Error::AuthorizationDenied("state mismatch".to_string()));
        }

        let Some(code) = params.code.as_deref().filter(|c| !c.is_empty()) else {
            return Err(Error::AuthorizationDenied(
                "redirect carried no authorization code".to_string(),
            ));
        };

        let response =
            exchange_code_pkce(&self.http, &self.config, code, &pending.code_verifier).await?;
        self.replace_session(response, None).await
    }

    /// Drops a pending authorization that will never complete.
    pub async fn abandon_authorization(&mut self) -> Res<()> {
        self.store.clear_pending().await
    }

    /// Exchanges the refresh token for a new access token.
    ///
    /// On failure the whole session is cleared.
    pub async fn refresh(&mut self) -> Res<String> {
        let Some(refresh_token) = self
            .session
            .as_ref()
            .filter(|s| s.has_refresh_token())
            .and_then(|s| s.refresh_token.clone())
        else {
            return Err(Error::TokenRefreshFailed(
                "no refresh token available".to_string(),
            ));
        };

        match refresh_token_request(&self.http, &self.config, &refresh_token).await {
            Ok(response) => self.replace_session(response, Some(refresh_token)).await,
            Err(e) => {
                self.clear_session().await?;
                Err(e)
            }
        }
    }

    pub async fn clear_session(&mut self) -> Res<()> {
        self.session = None;
        self.store.clear().await
    }

    async fn replace_session(
        &mut self,
        response: TokenResponse,
        previous_refresh_token: Option<String>,
    ) -> Res<String> {
        let session = Session {
            access_token: response.access_token,
            refresh_token: response
                .refresh_token
                .filter(|t| !t.is_empty())
                .or(previous_refresh_token),
            expires_at: self.clock.now().saturating_add(response.expires_in),
        };

        self.store.save(&session).await?;
        let token = session.access_token.clone();
        self.session = Some(session);
        Ok(token)
    }
}

/// Runs the complete interactive authorization.
///
/// 1. Stores a new PKCE verifier and state
/// 2. Starts the local callback server
/// 3. Opens the authorization page in the default browser
/// 4. Waits for the redirect (at most [`CALLBACK_TIMEOUT`])
/// 5. Exchanges the code and persists the session
///
/// If the browser cannot be opened the URL is printed so the user can open
/// it by hand.
pub async fn login(session: &mut SessionManager) -> Res<()> {
    let request = session.begin_authorization().await?;

    let slot: CallbackSlot = Arc::new(Mutex::new(None));
    let (_, server) = start_api_server(session.config(), Arc::clone(&slot)).await?;

    if webbrowser::open(&request.url).is_err() {
        warning!(
            "Failed to open browser. Please navigate to the following URL manually:\n{}",
            request.url
        );
    } else {
        info!("Waiting for authorization in the browser...");
    }

    let params = wait_for_callback(slot, CALLBACK_TIMEOUT).await;
    server.abort();

    match params {
        Some(params) => {
            session.complete_authorization(&params).await?;
            Ok(())
        }
        None => {
            session.abandon_authorization().await?;
            Err(Error::Unauthenticated)
        }
    }
}

/// Polls the callback slot until the redirect arrived or `max_wait` passed.
pub async fn wait_for_callback(slot: CallbackSlot, max_wait: Duration) -> Option<CallbackParams> {
    let start = tokio::time::Instant::now();

    while start.elapsed() < max_wait {
        if let Some(params) = slot.lock().await.take() {
            return Some(params);
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    }

    None
}

pub fn build_authorize_url(config: &Config, code_challenge: &str, state: &str) -> Res<String> {
    let url = Url::parse_with_params(
        &config.auth_url,
        &[
            ("response_type", "code"),
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
            ("scope", config.scope.as_str()),
            ("code_challenge_method", "S256"),
            ("code_challenge", code_challenge),
            ("state", state),
        ],
    )
    .map_err(|e| Error::Config(format!("invalid authorization url: {e}")))?;
    Ok(url.into())
}

/// Exchanges an authorization code and its PKCE verifier for tokens.
pub async fn exchange_code_pkce(
    http: &Client,
    config: &Config,
    code: &str,
    verifier: &str,
) -> Res<TokenResponse> {
    request_token(
        http,
        &config.token_url,
        &[
            ("grant_type", "authorization_code"),
            ("client_id", config.client_id.as_str()),
            ("code", code),
            ("code_verifier", verifier),
            ("redirect_uri", config.redirect_uri.as_str()),
        ],
    )
    .await
    .map_err(Error::TokenExchangeFailed)
}

/// Exchanges a refresh token for a new access token. The response may or may
/// not carry a rotated refresh token.
pub async fn refresh_token_request(
    http: &Client,
    config: &Config,
    refresh_token: &str,
) -> Res<TokenResponse> {
    request_token(
        http,
        &config.token_url,
        &[
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", config.client_id.as_str()),
        ],
    )
    .await
    .map_err(Error::TokenRefreshFailed)
}

async fn request_token(
    http: &Client,
    token_url: &str,
    form: &[(&str, &str)],
) -> Result<TokenResponse, String> {
    let res = http
        .post(token_url)
        .form(form)
        .send()
        .await
        .map_err(|e| e.to_string())?;

    let status = res.status();
    if !status.is_success() {
        let body = res.text().await.unwrap_or_default();
        return Err(format!("{status}: {body}"));
    }

    let token: TokenResponse = res.json().await.map_err(|e| e.to_string())?;
    if token.access_token.is_empty() {
        return Err("token endpoint returned an empty access token".to_string());
    }
    if token.expires_in <= 0 {
        return Err(format!(
            "token endpoint returned a non-positive lifetime ({})",
            token.expires_in
        ));
    }
    Ok(token)
}
