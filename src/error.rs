//! Error types shared by every layer of the playlist builder.
//!
//! The variants mirror the failure modes of the authorization handshake and
//! of the remote catalog calls. Partial batch failure while saving a playlist
//! is not an error; it is a normal outcome reported through
//! [`crate::types::SaveReport`].

use thiserror::Error;

#[derive(Debug, Error)]
pub enum Error {
    /// The provider refused the authorization, or the returned `state` did not
    /// match the one stored before the redirect.
    #[error("authorization denied: {0}")]
    AuthorizationDenied(String),

    #[error("token exchange failed: {0}")]
    TokenExchangeFailed(String),

    #[error("token refresh failed: {0}")]
    TokenRefreshFailed(String),

    /// No usable token is available and no authorization has completed yet.
    #[error("not authenticated, run `jammming auth` first")]
    Unauthenticated,

    #[error("remote request failed with status {status}: {body}")]
    RemoteRequestFailed { status: u16, body: String },

    #[error("malformed response from remote service: {0}")]
    RemoteResponseMalformed(String),

    #[error("a playlist needs a name and at least one track")]
    EmptyPlaylistInput,

    #[error("http transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("storage error: {0}")]
    Storage(#[from] std::io::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("configuration error: {0}")]
    Config(String),
}

impl Error {
    /// True when the remote service answered with 401 Unauthorized.
    pub fn is_unauthorized(&self) -> bool {
        matches!(self, Error::RemoteRequestFailed { status: 401, .. })
    }
}
