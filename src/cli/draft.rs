use tabled::Table;

use crate::{
    config::Config,
    error,
    error::Error,
    info,
    management::{DraftManager, SearchResultsManager},
    success, sync,
    types::{SaveOutcome, Track},
    utils, warning,
};

use super::{connect, spinner};

async fn load_draft(config: &Config) -> DraftManager {
    match DraftManager::load(config.data_dir.clone()).await {
        Ok(mgr) => mgr,
        Err(e) => error!("Failed to load draft: {}", e),
    }
}

async fn persist_draft(mgr: &DraftManager) {
    if let Err(e) = mgr.persist().await {
        error!("Failed to save draft: {}", e);
    }
}

pub async fn show_draft(config: &Config) {
    let mgr = load_draft(config).await;
    let draft = mgr.draft();

    info!("{} ({} tracks)", draft.name, draft.tracks.len());
    if !draft.is_empty() {
        println!("{}", Table::new(utils::track_table_rows(&draft.tracks)));
    }
}

/// Adds entries of the last search, by their 1-based position.
pub async fn add_to_draft(config: &Config, positions: &[usize]) {
    let results = match SearchResultsManager::load(config.data_dir.clone()).await {
        Ok(results) => results,
        Err(e) => error!("Failed to load last search: {}", e),
    };

    if results.tracks().is_empty() {
        warning!("No search results to pick from. Run `jammming search <query>` first.");
        return;
    }

    let mut picked: Vec<Track> = Vec::new();
    for &position in positions {
        match results.get(position) {
            Some(track) => picked.push(track.clone()),
            None => warning!(
                "No result #{} in the last search for \"{}\"",
                position,
                results.query()
            ),
        }
    }

    let mut mgr = load_draft(config).await;
    let requested = picked.len();
    let added = mgr.add_tracks(picked);
    persist_draft(&mgr).await;

    if added < requested {
        info!("{} tracks were already in the draft", requested - added);
    }
    success!("Added {} tracks to \"{}\"", added, mgr.draft().name);
}

pub async fn remove_from_draft(config: &Config, track_ids: &[String]) {
    let mut mgr = load_draft(config).await;
    for id in track_ids {
        if !mgr.draft_mut().remove(id) {
            warning!("Track {} is not in the draft", id);
        }
    }
    persist_draft(&mgr).await;
    success!("Draft now holds {} tracks", mgr.draft().tracks.len());
}

pub async fn rename_draft(config: &Config, name: &str) {
    let mut mgr = load_draft(config).await;
    mgr.draft_mut().rename(name.trim());
    persist_draft(&mgr).await;
    success!("Draft renamed to \"{}\"", mgr.draft().name);
}

pub async fn clear_draft(config: &Config) {
    let mut mgr = load_draft(config).await;
    mgr.draft_mut().reset();
    persist_draft(&mgr).await;
    success!("Draft cleared");
}

/// Saves the draft as a private playlist.
///
/// The draft is reset only when every track was written. After a partial
/// failure it keeps just the failed tracks; after an error it is untouched.
pub async fn save_draft(config: &Config, description: &str) {
    let mut mgr = load_draft(config).await;
    let draft = mgr.draft().clone();

    if draft.name.trim().is_empty() || draft.is_empty() {
        warning!("{}", Error::EmptyPlaylistInput);
        return;
    }

    let mut gateway = connect(config).await;

    let pb = spinner(&format!("Saving \"{}\"...", draft.name));
    let report = sync::save(&mut gateway, &draft.name, description, &draft.tracks).await;
    pb.finish_and_clear();

    let report = match report {
        Ok(report) => report,
        Err(e) => error!("Failed to save playlist, the draft was kept: {}", e),
    };

    let result = &report.result;
    match report.outcome() {
        SaveOutcome::Complete => {
            success!(
                "Saved {} tracks to \"{}\" ({})",
                result.succeeded_uris.len(),
                draft.name,
                report.playlist_id
            );
        }
        SaveOutcome::PartialBatchFailure => {
            warning!(
                "Saved {} of {} tracks to \"{}\" ({})",
                result.succeeded_uris.len(),
                draft.tracks.len(),
                draft.name,
                report.playlist_id
            );
            info!(
                "The draft now holds the {} tracks that could not be added",
                result.failed_uris.len()
            );
        }
        SaveOutcome::Failed => {
            warning!(
                "Playlist \"{}\" ({}) was created but no track could be added, the draft was kept",
                draft.name,
                report.playlist_id
            );
        }
    }

    mgr.draft_mut().apply_save_report(&report);
    persist_draft(&mgr).await;
}
