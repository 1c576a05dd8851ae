use clap::{
    CommandFactory, Parser, Subcommand,
    builder::{
        Styles,
        styling::{AnsiColor, Effects},
    },
};
use clap_complete::{Shell, generate};

use jammming::{
    cli,
    config::{self, Config},
    error,
    spotify::search::DEFAULT_SEARCH_LIMIT,
    warning,
};

fn styles() -> Styles {
    Styles::styled()
        .header(AnsiColor::White.on_default() | Effects::BOLD)
        .usage(AnsiColor::White.on_default() | Effects::BOLD)
        .literal(AnsiColor::BrightBlue.on_default())
        .placeholder(AnsiColor::BrightGreen.on_default())
}

#[derive(Parser, Debug, Clone)]
#[clap(
  version = env!("CARGO_PKG_VERSION"),
  name=env!("CARGO_PKG_NAME"),
  bin_name=env!("CARGO_PKG_NAME"),
  about=env!("CARGO_PKG_DESCRIPTION"),
  styles=styles(),
)]
struct Cli {
    #[clap(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Authorize with the Spotify API
    Auth,

    /// Remove stored credentials
    Logout,

    /// Show whether a usable session exists
    Status,

    /// Search tracks in the catalog
    Search(SearchOptions),

    /// Build the playlist draft
    Draft(DraftOptions),

    /// Get shell completions
    Completions(CompletionsOption),
}

#[derive(Parser, Debug, Clone)]
pub struct SearchOptions {
    /// Song, album or artist
    #[clap(required = true, num_args = 1..)]
    pub query: Vec<String>,

    /// Maximum number of results
    #[clap(long, default_value_t = DEFAULT_SEARCH_LIMIT, value_parser = clap::value_parser!(u32).range(1..=50))]
    pub limit: u32,
}

#[derive(Parser, Debug, Clone)]
#[command(about = "Build the playlist draft")]
pub struct DraftOptions {
    #[command(subcommand)]
    pub command: Option<DraftSubcommand>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum DraftSubcommand {
    /// Show the draft (default)
    Show,

    /// Add results of the last search by their number
    Add {
        #[clap(required = true, num_args = 1..)]
        positions: Vec<usize>,
    },

    /// Remove tracks by id
    Remove {
        #[clap(required = true, num_args = 1..)]
        track_ids: Vec<String>,
    },

    /// Set the playlist name
    Rename { name: String },

    /// Empty the draft
    Clear,

    /// Save the draft as a private playlist
    Save {
        /// Playlist description
        #[clap(long, default_value = "")]
        description: String,
    },
}

#[derive(Parser, Debug, Clone)]
pub struct CompletionsOption {
    shell: Shell,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    if let Command::Completions(opt) = &cli.command {
        let mut cmd = Cli::command();
        let name = cmd.get_name().to_string();
        generate(opt.shell, &mut cmd, name, &mut std::io::stdout());
        return;
    }

    if let Err(e) = config::load_env().await {
        warning!("Cannot load environment file. Err: {}", e);
    }

    let config = match Config::from_env() {
        Ok(config) => config,
        Err(e) => error!("{}", e),
    };

    match cli.command {
        Command::Auth => cli::auth(&config).await,
        Command::Logout => cli::logout(&config).await,
        Command::Status => cli::status(&config).await,
        Command::Search(opt) => cli::search(&config, &opt.query.join(" "), opt.limit).await,
        Command::Draft(opt) => match opt.command.unwrap_or(DraftSubcommand::Show) {
            DraftSubcommand::Show => cli::show_draft(&config).await,
            DraftSubcommand::Add { positions } => cli::add_to_draft(&config, &positions).await,
            DraftSubcommand::Remove { track_ids } => {
                cli::remove_from_draft(&config, &track_ids).await
            }
            DraftSubcommand::Rename { name } => cli::rename_draft(&config, &name).await,
            DraftSubcommand::Clear => cli::clear_draft(&config).await,
            DraftSubcommand::Save { description } => cli::save_draft(&config, &description).await,
        },
        Command::Completions(_) => {}
    }
}
