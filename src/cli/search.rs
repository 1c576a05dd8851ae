use tabled::Table;

use crate::{
    config::Config,
    error, info,
    management::SearchResultsManager,
    spotify::search::search_tracks,
    utils, warning,
};

use super::{connect, spinner};

/// Searches tracks and prints them as a numbered table.
///
/// A failing search is reported and shows an empty result set; the numbers
/// printed are the ones `jammming draft add` expects.
pub async fn search(config: &Config, query: &str, limit: u32) {
    let mut results = match SearchResultsManager::load(config.data_dir.clone()).await {
        Ok(results) => results,
        Err(e) => error!("Failed to load last search: {}", e),
    };

    let mut gateway = connect(config).await;

    let pb = spinner("Searching tracks...");
    let outcome = search_tracks(&mut gateway, query, limit).await;
    pb.finish_and_clear();

    let tracks = match outcome {
        Ok(tracks) => tracks,
        Err(e) => {
            warning!("Search failed: {}", e);
            Vec::new()
        }
    };

    if let Err(e) = results.replace(query, tracks).await {
        warning!("Failed to remember search results: {}", e);
    }

    if results.tracks().is_empty() {
        info!("No tracks found for \"{}\"", query.trim());
        return;
    }

    println!("{}", Table::new(utils::track_table_rows(results.tracks())));
    info!("Add tracks with `jammming draft add <#>...`");
}
