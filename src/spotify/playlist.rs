use crate::{
    Res,
    error::Error,
    spotify::gateway::{ApiGateway, ApiRequest, encoded_path},
    types::{AddTrackToPlaylistRequest, CreatePlaylistRequest, CreatePlaylistResponse},
};

/// Creates a private playlist for `user_id` and returns its id.
pub async fn create(
    gateway: &mut ApiGateway,
    user_id: &str,
    name: &str,
    description: &str,
) -> Res<String> {
    let body = serde_json::to_value(CreatePlaylistRequest {
        name: name.to_string(),
        description: description.to_string(),
        public: false,
    })?;

    let path = encoded_path(&["users", user_id, "playlists"])?;
    let request = ApiRequest::post(path, body);
    let response: CreatePlaylistResponse = gateway.call_as(&request).await?;
    response
        .id
        .filter(|id| !id.is_empty())
        .ok_or_else(|| Error::RemoteResponseMalformed("created playlist has no id".to_string()))
}

/// Appends up to 100 track uris to a playlist, returns the new snapshot id.
pub async fn add_tracks(
    gateway: &mut ApiGateway,
    playlist_id: &str,
    uris: Vec<String>,
) -> Res<Option<String>> {
    let body = serde_json::to_value(AddTrackToPlaylistRequest { uris })?;
    let path = encoded_path(&["playlists", playlist_id, "tracks"])?;
    let request = ApiRequest::post(path, body);
    let response = gateway.call(&request).await?;
    Ok(response
        .get("snapshot_id")
        .and_then(|v| v.as_str())
        .map(str::to_string))
}
