use crate::{
    Res,
    error::Error,
    spotify::gateway::{ApiGateway, ApiRequest},
    types::{SearchResponse, Track, TrackObject},
};

pub const DEFAULT_SEARCH_LIMIT: u32 = 20;

const UNKNOWN_ARTIST: &str = "Unknown Artist";
const UNKNOWN_ALBUM: &str = "Unknown Album";

/// Searches the catalog for tracks matching `query`.
///
/// A blank query returns no results without calling the API.
///
/// # Errors
///
/// Gateway errors are passed through. An entry without id, name or uri makes
/// the whole response [`Error::RemoteResponseMalformed`].
///
/// # Example
///
/// ```
/// let tracks = search_tracks(&mut gateway, "harder better faster", 10).await?;
/// for track in tracks {
///     println!("{} - {}", track.artist, track.name);
/// }
/// ```
pub async fn search_tracks(gateway: &mut ApiGateway, query: &str, limit: u32) -> Res<Vec<Track>> {
    let query = query.trim();
    if query.is_empty() {
        return Ok(Vec::new());
    }

    let request = ApiRequest::get("/search")
        .query("q", query)
        .query("type", "track")
        .query("limit", limit.to_string());

    let response: SearchResponse = gateway.call_as(&request).await?;
    response
        .tracks
        .items
        .into_iter()
        .map(track_from_object)
        .collect()
}

/// Maps a catalog track object into a [`Track`].
pub fn track_from_object(object: TrackObject) -> Res<Track> {
    let missing = |field: &str| Error::RemoteResponseMalformed(format!("track without {field}"));

    let artist = object
        .artists
        .into_iter()
        .find_map(|a| a.name)
        .unwrap_or_else(|| UNKNOWN_ARTIST.to_string());
    let album = object
        .album
        .and_then(|a| a.name)
        .unwrap_or_else(|| UNKNOWN_ALBUM.to_string());

    Ok(Track {
        id: object.id.ok_or_else(|| missing("id"))?,
        name: object.name.ok_or_else(|| missing("name"))?,
        uri: object.uri.ok_or_else(|| missing("uri"))?,
        artist,
        album,
    })
}
