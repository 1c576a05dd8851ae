//! # Spotify Integration Module
//!
//! Everything that talks to the Spotify accounts service and the Web API.
//!
//! ## Architecture
//!
//! ```text
//! CLI / Playlist Sync
//!          ↓
//! Catalog endpoints (search, user, playlist)
//!          ↓
//! ApiGateway  ── bearer auth, one refresh-and-retry on 401
//!          ↓
//! SessionManager ── token lifecycle, PKCE handshake
//!          ↓
//! CredentialStore (local data directory)
//! ```
//!
//! ## Authentication
//!
//! [`auth`] implements the authorization code flow with PKCE:
//! 1. **Begin**: a random verifier and state are stored, the S256 challenge
//!    goes into the authorize URL
//! 2. **Redirect**: the user grants access in the browser and lands on the
//!    local callback server
//! 3. **Complete**: the returned state is checked against the stored one and
//!    the code is exchanged together with the verifier
//! 4. **Refresh**: an access token is used only while it is valid for more
//!    than 60 more seconds, after that the refresh token renews it
//!
//! ## Endpoints
//!
//! - `GET /search` - [`search::search_tracks`]
//! - `GET /me` - [`user::current_user_id`]
//! - `POST /users/{user_id}/playlists` - [`playlist::create`]
//! - `POST /playlists/{playlist_id}/tracks` - [`playlist::add_tracks`]
//!
//! Responses are mapped into the strict types of [`crate::types`] right at
//! this boundary; entries missing required fields are rejected instead of
//! being passed on half filled.

pub mod auth;
pub mod gateway;
pub mod playlist;
pub mod search;
pub mod user;

pub use auth::{Clock, SessionManager, SystemClock};
pub use gateway::{ApiGateway, ApiRequest};
