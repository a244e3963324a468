use crate::domain::GameStatus;
use crate::infrastructure::RAWG_API_BASE;
use crate::services::query::SortMode;
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Args {
    /// Directory holding the game list and stored API key
    #[arg(long, default_value = "data")]
    pub data_dir: PathBuf,

    /// RAWG API key, overrides the stored one
    #[clap(long, env = "RAWG_API_KEY")]
    pub rawg_api_key: Option<String>,

    /// Base URL of the RAWG API
    #[arg(long, default_value = RAWG_API_BASE)]
    pub rawg_api_base: String,

    /// Relay endpoint wrapping RAWG requests (`<relay>?url=<target>`)
    #[arg(long, env = "GAMEBACKLOG_RELAY_URL")]
    pub relay_url: Option<String>,

    /// Timeout for RAWG requests, in seconds
    #[arg(long, default_value_t = 30)]
    pub timeout_secs: u64,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// List games matching the given search and filters
    List(FilterArgs),
    /// Show every field of one game
    Show { id: String },
    /// Add a game by hand or from a RAWG lookup
    Add(AddArgs),
    /// Edit fields of a game
    Edit(EditArgs),
    /// Change the status of a game, tracking completion dates
    Status { id: String, status: GameStatus },
    /// Remove a game
    Remove { id: String },
    /// Suggest a random game to play next from the filtered list
    Random(FilterArgs),
    /// Search RAWG without adding anything
    Search { query: String },
    /// Replace the whole collection with the games in a JSON file
    Import { file: PathBuf },
    /// Write the collection to a JSON file
    Export { file: PathBuf },
    /// Count games per status
    Stats,
    /// Manage the stored RAWG API key
    Key {
        #[command(subcommand)]
        action: KeyCommand,
    },
    /// Print the suggested platform and genre names
    Vocab,
}

#[derive(Subcommand, Debug, Clone)]
pub enum KeyCommand {
    Set { key: String },
    Clear,
    Show,
}

#[derive(clap::Args, Debug, Clone, Default)]
pub struct FilterArgs {
    /// Case-insensitive match on title or genre
    #[arg(short, long, default_value = "")]
    pub search: String,

    #[arg(long = "platform")]
    pub platforms: Vec<String>,

    #[arg(long = "genre")]
    pub genres: Vec<String>,

    #[arg(long = "status")]
    pub statuses: Vec<GameStatus>,

    /// title-az, title-za, date-oldest, date-newest, status, rating-high, rating-low
    #[arg(long, default_value_t = SortMode::DateNewest)]
    pub sort: SortMode,
}

#[derive(clap::Args, Debug, Clone)]
pub struct AddArgs {
    /// Title, required unless --lookup is used
    #[arg(required_unless_present = "lookup")]
    pub title: Option<String>,

    /// Pre-fill attributes from a RAWG search for this text
    #[arg(long)]
    pub lookup: Option<String>,

    /// Which search result to use, starting at 1
    #[arg(long, default_value_t = 1, requires = "lookup")]
    pub pick: usize,

    #[arg(long = "platform")]
    pub platforms: Vec<String>,

    #[arg(long = "genre")]
    pub genres: Vec<String>,

    #[arg(long)]
    pub status: Option<GameStatus>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5))]
    pub rating: Option<u8>,

    #[arg(long)]
    pub notes: Option<String>,
}

#[derive(clap::Args, Debug, Clone)]
pub struct EditArgs {
    pub id: String,

    #[arg(long)]
    pub title: Option<String>,

    /// Replaces the platform list
    #[arg(long = "platform")]
    pub platforms: Option<Vec<String>>,

    /// Replaces the genre list
    #[arg(long = "genre")]
    pub genres: Option<Vec<String>>,

    /// Set the status without touching the completion date
    #[arg(long)]
    pub status: Option<GameStatus>,

    #[arg(long, value_parser = clap::value_parser!(u8).range(1..=5), conflicts_with = "clear_rating")]
    pub rating: Option<u8>,

    #[arg(long)]
    pub clear_rating: bool,

    #[arg(long, conflicts_with = "clear_notes")]
    pub notes: Option<String>,

    #[arg(long)]
    pub clear_notes: bool,

    #[arg(long)]
    pub description: Option<String>,

    #[arg(long)]
    pub cover_url: Option<String>,

    #[arg(long)]
    pub release_date: Option<String>,

    #[arg(long)]
    pub metacritic: Option<u32>,
}
