use serde::{Deserialize, Serialize};
use tabled::Tabled;

/// Seconds before the real expiry at which a token stops being used.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// The single live authorization of this data directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    pub access_token: String,
    pub refresh_token: Option<String>,
    /// Unix timestamp (seconds) at which the access token expires.
    pub expires_at: i64,
}

impl Session {
    /// A token is usable while `now < expires_at - 60s`.
    pub fn is_usable_at(&self, now: i64) -> bool {
        !self.access_token.is_empty() && now < self.expires_at - EXPIRY_MARGIN_SECS
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token
            .as_deref()
            .is_some_and(|token| !token.is_empty())
    }
}

/// Verifier and state stored right before sending the user to the
/// authorization page. Read once when the redirect comes back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingAuthorization {
    pub code_verifier: String,
    pub state: String,
}

/// Where the user has to go to grant access.
#[derive(Debug, Clone)]
pub struct AuthorizationRequest {
    pub url: String,
    pub state: String,
}

/// Query parameters of the authorization redirect.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallbackParams {
    pub code: Option<String>,
    pub state: Option<String>,
    pub error: Option<String>,
}

/// Coarse view of the session state machine, used by `jammming status`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    NoSession,
    PendingAuthorization,
    Authorized,
    Expired,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    pub id: String,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub uri: String,
}

#[derive(Tabled)]
pub struct TrackTableRow {
    #[tabled(rename = "#")]
    pub index: usize,
    pub name: String,
    pub artist: String,
    pub album: String,
    pub id: String,
}

pub const DEFAULT_PLAYLIST_NAME: &str = "New Playlist";

/// The playlist being assembled locally, before it is saved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlaylistDraft {
    pub name: String,
    pub tracks: Vec<Track>,
}

impl Default for PlaylistDraft {
    fn default() -> Self {
        Self {
            name: DEFAULT_PLAYLIST_NAME.to_string(),
            tracks: Vec::new(),
        }
    }
}

impl PlaylistDraft {
    /// Appends a track unless a track with the same id is already present.
    pub fn add(&mut self, track: Track) -> bool {
        if self.contains(&track.id) {
            return false;
        }
        self.tracks.push(track);
        true
    }

    pub fn remove(&mut self, track_id: &str) -> bool {
        let before = self.tracks.len();
        self.tracks.retain(|t| t.id != track_id);
        self.tracks.len() != before
    }

    pub fn rename(&mut self, name: impl Into<String>) {
        self.name = name.into();
    }

    pub fn contains(&self, track_id: &str) -> bool {
        self.tracks.iter().any(|t| t.id == track_id)
    }

    pub fn uris(&self) -> Vec<String> {
        self.tracks.iter().map(|t| t.uri.clone()).collect()
    }

    /// Keeps only the tracks whose uri is listed, e.g. the failed ones after a
    /// partial save.
    pub fn retain_uris(&mut self, uris: &[String]) {
        self.tracks.retain(|t| uris.contains(&t.uri));
    }

    /// Updates the draft after a save: it is emptied when every track was
    /// written, keeps only the failed tracks after a partial failure and is
    /// left as it was when nothing could be added.
    pub fn apply_save_report(&mut self, report: &SaveReport) {
        match report.outcome() {
            SaveOutcome::Complete => self.reset(),
            SaveOutcome::PartialBatchFailure => self.retain_uris(&report.result.failed_uris),
            SaveOutcome::Failed => {}
        }
    }

    pub fn reset(&mut self) {
        *self = Self::default();
    }

    pub fn is_empty(&self) -> bool {
        self.tracks.is_empty()
    }
}

/// Outcome of writing track references in batches.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BatchResult {
    pub succeeded_uris: Vec<String>,
    pub failed_uris: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SaveOutcome {
    Complete,
    PartialBatchFailure,
    Failed,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SaveReport {
    pub playlist_id: String,
    pub result: BatchResult,
}

impl SaveReport {
    pub fn outcome(&self) -> SaveOutcome {
        match (
            self.result.succeeded_uris.is_empty(),
            self.result.failed_uris.is_empty(),
        ) {
            (_, true) => SaveOutcome::Complete,
            (false, false) => SaveOutcome::PartialBatchFailure,
            (true, false) => SaveOutcome::Failed,
        }
    }
}

// Wire types of the token endpoint and the Web API.

#[derive(Debug, Clone, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub refresh_token: Option<String>,
    pub expires_in: i64,
}

#[derive(Debug, Clone, Deserialize)]
pub struct SearchResponse {
    pub tracks: TrackPage,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackPage {
    #[serde(default)]
    pub items: Vec<TrackObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct TrackObject {
    pub id: Option<String>,
    pub name: Option<String>,
    pub uri: Option<String>,
    #[serde(default)]
    pub artists: Vec<NamedObject>,
    pub album: Option<NamedObject>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct NamedObject {
    pub name: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CurrentUserResponse {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CreatePlaylistRequest {
    pub name: String,
    pub description: String,
    pub public: bool,
}

#[derive(Debug, Clone, Deserialize)]
pub struct CreatePlaylistResponse {
    pub id: Option<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AddTrackToPlaylistRequest {
    pub uris: Vec<String>,
}
