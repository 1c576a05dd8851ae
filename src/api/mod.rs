//! # API Module
//!
//! HTTP endpoints of the local server that receives the authorization
//! redirect.
//!
//! - [`callback`] - Takes `code`, `state` and `error` from the redirect query
//!   and redirects the browser to [`done`], leaving no code in the URL
//! - [`done`] - Static page telling the user to return to the terminal
//! - [`health`] - Status and version, handy to check the port is reachable
//!
//! ```rust,ignore
//! use axum::{Router, routing::get};
//! use jammming::api::{callback, done, health};
//!
//! let app = Router::new()
//!     .route("/callback", get(callback))
//!     .route("/done", get(done))
//!     .route("/health", get(health));
//! ```

mod callback;
mod health;

pub use callback::{callback, done};
pub use health::health;
