use std::{io::ErrorKind, path::PathBuf};

use crate::{
    Res,
    types::{PlaylistDraft, Track},
};

/// Keeps the playlist draft between invocations.
pub struct DraftManager {
    path: PathBuf,
    draft: PlaylistDraft,
}

impl DraftManager {
    /// Loads the draft from `<data_dir>/draft.json`, starting empty if the
    /// file does not exist yet.
    pub async fn load(data_dir: PathBuf) -> Res<Self> {
        let path = data_dir.join("draft.json");
        let draft = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => PlaylistDraft::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, draft })
    }

    pub async fn persist(&self) -> Res<()> {
        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }

        let json = serde_json::to_string_pretty(&self.draft)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    /// Adds tracks in order, returns how many were new.
    pub fn add_tracks(&mut self, tracks: Vec<Track>) -> usize {
        tracks
            .into_iter()
            .filter(|t| self.draft.add(t.clone()))
            .count()
    }

    pub fn draft(&self) -> &PlaylistDraft {
        &self.draft
    }

    pub fn draft_mut(&mut self) -> &mut PlaylistDraft {
        &mut self.draft
    }
}
