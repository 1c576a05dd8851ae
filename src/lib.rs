//! Playlist builder for the Spotify Web API.
//!
//! Search the catalog, collect tracks into a local draft and save the draft as
//! a private playlist on the user's account. Access is authorized with the
//! OAuth 2.0 authorization code flow and PKCE.
//!
//! # Modules
//!
//! - `api` - HTTP endpoints of the local authorization callback server
//! - `cli` - Command-line interface implementations
//! - `config` - Configuration loaded from the environment and `.env`
//! - `error` - The crate wide [`Error`](error::Error) type
//! - `management` - Durable local state: credentials, draft, last search
//! - `server` - Local HTTP server receiving the authorization redirect
//! - `spotify` - Session management, API gateway and catalog endpoints
//! - `sync` - Saving a draft as a remote playlist in batches
//! - `types` - Data structures and wire types
//! - `utils` - PKCE helpers and small utilities
//!
//! # Example
//!
//! ```
//! use jammming::{config, management::CredentialStore, spotify::{ApiGateway, SessionManager}};
//!
//! #[tokio::main]
//! async fn main() -> jammming::Res<()> {
//!     config::load_env().await?;
//!     let config = config::Config::from_env()?;
//!     let store = CredentialStore::new(config.data_dir.clone());
//!     let session = SessionManager::open(config.clone(), store).await?;
//!     let mut gateway = ApiGateway::new(&config, session);
//!     let tracks = jammming::spotify::search::search_tracks(&mut gateway, "daft punk", 10).await?;
//!     Ok(())
//! }
//! ```

pub mod api;
pub mod cli;
pub mod config;
pub mod error;
pub mod management;
pub mod server;
pub mod spotify;
pub mod sync;
pub mod types;
pub mod utils;

/// A convenient Result type alias for operations that may fail.
///
/// Every fallible operation of the crate reports an [`error::Error`], so
/// callers can tell an authorization problem from a remote failure and render
/// a matching message.
///
/// # Example
///
/// ```
/// use jammming::Res;
///
/// async fn fetch_data() -> Res<String> {
///     Ok("data".to_string())
/// }
/// ```
pub type Res<T> = std::result::Result<T, error::Error>;

/// Prints an informational message with a blue bullet point.
///
/// Creates a formatted output line with a distinctive blue "o" indicator
/// followed by the provided message. Used for general information and
/// status updates throughout the application.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// info!("Starting authentication process...");
/// info!("Found {} tracks", count);
/// ```
#[macro_export]
macro_rules! info {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "o".blue().bold(), std::format_args!($($arg)*));
  })
}

/// Prints a success message with a green checkmark.
///
/// Creates a formatted output line with a green "✓" indicator to signify
/// successful completion of operations. Used to provide positive feedback
/// when operations complete successfully.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// success!("Authentication completed successfully");
/// success!("Added {} tracks to the draft", count);
/// ```
#[macro_export]
macro_rules! success {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "✓".green().bold(), std::format_args!($($arg)*));
  })
}

/// Prints an error message with a red exclamation mark and exits the program.
///
/// Creates a formatted error output with a red "!" indicator and immediately
/// terminates the program with exit code 1. Used for unrecoverable errors
/// that require immediate program termination.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Behavior
///
/// This macro will cause the program to exit immediately after printing
/// the error message. It should only be used for fatal errors where
/// recovery is not possible.
///
/// # Example
///
/// ```
/// error!("Failed to load draft");
/// error!("Missing required environment variable: {}", var_name);
/// // Program exits here - code after this will not execute
/// ```
#[macro_export]
macro_rules! error {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".red().bold(), std::format_args!($($arg)*));
    std::process::exit(1);
  })
}

/// Prints a warning message with a yellow exclamation mark.
///
/// Creates a formatted output line with a yellow "!" indicator to highlight
/// potential issues or important notices that don't require program termination.
/// Used for recoverable issues or important information that users should notice.
///
/// # Arguments
///
/// The macro accepts the same arguments as `println!`, supporting format
/// strings and interpolation.
///
/// # Example
///
/// ```
/// warning!("Search failed, showing no results");
/// warning!("{} tracks could not be added", failed);
/// ```
#[macro_export]
macro_rules! warning {
  ($($arg:tt)*) => ({
    use colored::Colorize;
    println!("[{}] {}", "!".yellow().bold(), std::format_args!($($arg)*));
  })
}
