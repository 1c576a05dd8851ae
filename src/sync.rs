//! Saving a draft as a playlist on the user's account.

use crate::{
    Res,
    error::Error,
    spotify::{ApiGateway, playlist, user},
    types::{BatchResult, SaveReport, Track},
    warning,
};

/// Most track uris the Web API accepts in one write.
pub const BATCH_SIZE: usize = 100;

/// Splits `uris` into consecutive batches of at most [`BATCH_SIZE`], in order.
pub fn batches(uris: &[String]) -> std::slice::Chunks<'_, String> {
    uris.chunks(BATCH_SIZE)
}

/// Creates a private playlist named `name` and writes all `tracks` to it.
///
/// 1. A blank name or an empty track list fails before any network call
/// 2. The current user is looked up, the playlist is created for them; a
///    failure in either step aborts the save
/// 3. Track uris are written in batches of [`BATCH_SIZE`], one batch after
///    the other. A failed batch is recorded and the next one is attempted
///
/// The returned [`SaveReport`] partitions the uris into succeeded and failed,
/// both in input order. A partial failure is not an error.
///
/// # Errors
///
/// - [`Error::EmptyPlaylistInput`] for a blank name or no tracks
/// - any error of the identity lookup or the playlist creation
pub async fn save(
    gateway: &mut ApiGateway,
    name: &str,
    description: &str,
    tracks: &[Track],
) -> Res<SaveReport> {
    if name.trim().is_empty() || tracks.is_empty() {
        return Err(Error::EmptyPlaylistInput);
    }

    let user_id = user::current_user_id(gateway).await?;
    let playlist_id = playlist::create(gateway, &user_id, name.trim(), description).await?;

    let uris: Vec<String> = tracks.iter().map(|t| t.uri.clone()).collect();
    let mut result = BatchResult::default();

    for batch in batches(&uris) {
        match playlist::add_tracks(gateway, &playlist_id, batch.to_vec()).await {
            Ok(_) => result.succeeded_uris.extend_from_slice(batch),
            Err(e) => {
                warning!("Failed to add {} tracks to playlist: {}", batch.len(), e);
                result.failed_uris.extend_from_slice(batch);
            }
        }
    }

    Ok(SaveReport {
        playlist_id,
        result,
    })
}
