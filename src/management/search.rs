use std::{io::ErrorKind, path::PathBuf};

use serde::{Deserialize, Serialize};

use crate::{Res, types::Track};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
struct LastSearch {
    query: String,
    tracks: Vec<Track>,
}

/// Remembers the result set of the latest search so that `draft add` can
/// refer to its entries by position.
pub struct SearchResultsManager {
    path: PathBuf,
    last: LastSearch,
}

impl SearchResultsManager {
    pub async fn load(data_dir: PathBuf) -> Res<Self> {
        let path = data_dir.join("last_search.json");
        let last = match async_fs::read_to_string(&path).await {
            Ok(content) => serde_json::from_str(&content)?,
            Err(e) if e.kind() == ErrorKind::NotFound => LastSearch::default(),
            Err(e) => return Err(e.into()),
        };
        Ok(Self { path, last })
    }

    /// Replaces the stored result set. The newest search always wins.
    pub async fn replace(&mut self, query: &str, tracks: Vec<Track>) -> Res<()> {
        self.last = LastSearch {
            query: query.to_string(),
            tracks,
        };

        if let Some(parent) = self.path.parent() {
            async_fs::create_dir_all(parent).await?;
        }
        let json = serde_json::to_string_pretty(&self.last)?;
        async_fs::write(&self.path, json).await?;
        Ok(())
    }

    pub fn query(&self) -> &str {
        &self.last.query
    }

    pub fn tracks(&self) -> &[Track] {
        &self.last.tracks
    }

    /// Looks up a result by its 1-based position as printed in the table.
    pub fn get(&self, position: usize) -> Option<&Track> {
        position
            .checked_sub(1)
            .and_then(|i| self.last.tracks.get(i))
    }
}
