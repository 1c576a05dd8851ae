mod credentials;
mod draft;
mod search;

pub use credentials::CredentialStore;
pub use draft::DraftManager;
pub use search::SearchResultsManager;
