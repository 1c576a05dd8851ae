use base64::{Engine, engine::general_purpose::URL_SAFE_NO_PAD};
use rand::{Rng, distr::Alphanumeric};
use sha2::{Digest, Sha256};

use crate::types::{Track, TrackTableRow};

/// Longest verifier RFC 7636 allows.
pub const CODE_VERIFIER_LENGTH: usize = 128;
pub const STATE_LENGTH: usize = 16;

/// Random alphanumeric string of `length` characters.
///
/// `rand::rng()` is a cryptographically secure generator reseeded from the
/// operating system, so the verifier cannot be predicted from earlier output.
fn random_alphanumeric(length: usize) -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(length)
        .map(char::from)
        .collect()
}

pub fn generate_code_verifier(length: usize) -> String {
    random_alphanumeric(length)
}

/// `base64url-no-pad(sha256(verifier))`, the S256 challenge method.
pub fn generate_code_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Correlates the authorization redirect with the request that started it.
pub fn generate_state(length: usize) -> String {
    random_alphanumeric(length)
}

pub fn now_timestamp() -> i64 {
    chrono::Utc::now().timestamp()
}

/// Numbered rows for printing tracks with `tabled`, starting at 1.
pub fn track_table_rows(tracks: &[Track]) -> Vec<TrackTableRow> {
    tracks
        .iter()
        .enumerate()
        .map(|(i, t)| TrackTableRow {
            index: i + 1,
            name: t.name.clone(),
            artist: t.artist.clone(),
            album: t.album.clone(),
            id: t.id.clone(),
        })
        .collect()
}
