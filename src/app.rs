use crate::config::cli::{AddArgs, Command, EditArgs, FilterArgs, KeyCommand};
use crate::config::Config;
use crate::domain::storage::Storage;
use crate::domain::{Game, GameDraft, GamePatch, GameStatus, GENRES, PLATFORMS};
use crate::error::{GameError, Result};
use crate::infrastructure::{FileSystemStore, RawgClient};
use crate::services::catalog::Catalog;
use crate::services::lookup::LookupService;
use crate::services::query::{self, Query};
use indicatif::{ProgressBar, ProgressStyle};
use std::future::Future;
use std::path::Path;
use std::sync::Arc;
use std::time::Duration;
use tracing::info;

const SHORT_ID_LEN: usize = 8;

pub struct App {
    config: Config,
    store: Arc<dyn Storage>,
    catalog: Catalog,
    lookup: LookupService,
}

impl App {
    pub fn new(config: Config) -> Self {
        let store: Arc<dyn Storage> = Arc::new(FileSystemStore::new(config.args.data_dir.clone()));
        let catalog = Catalog::load(store.clone());
        let rawg_client = RawgClient::new(config.http_client.clone(), config.args.relay_url.clone())
            .with_api_base(config.args.rawg_api_base.clone());

        Self {
            config,
            store,
            catalog,
            lookup: LookupService::new(rawg_client),
        }
    }

    pub async fn run(&mut self, command: Command) -> Result<()> {
        match command {
            Command::List(filters) => self.list(filters),
            Command::Show { id } => self.show(&id),
            Command::Add(args) => self.add(args).await,
            Command::Edit(args) => self.edit(args),
            Command::Status { id, status } => self.set_status(&id, status),
            Command::Remove { id } => self.remove(&id),
            Command::Random(filters) => self.random(filters),
            Command::Search { query } => self.search(&query).await,
            Command::Import { file } => self.import(&file),
            Command::Export { file } => self.export(&file),
            Command::Stats => self.stats(),
            Command::Key { action } => self.key(action),
            Command::Vocab => {
                println!("Platforms: {}", PLATFORMS.join(", "));
                println!("Genres:    {}", GENRES.join(", "));
                Ok(())
            }
        }
    }

    fn list(&self, filters: FilterArgs) -> Result<()> {
        let view_query = to_query(filters);
        let games = query::view(self.catalog.games(), &view_query);
        if games.is_empty() {
            println!("No games match.");
            return Ok(());
        }
        for game in &games {
            println!("{}", format_row(game));
        }
        println!("{} of {} games", games.len(), self.catalog.games().len());
        Ok(())
    }

    fn show(&self, id: &str) -> Result<()> {
        let id = self.resolve_id(id)?;
        if let Some(game) = self.catalog.get(&id) {
            print!("{}", format_detail(game));
        }
        Ok(())
    }

    async fn add(&mut self, args: AddArgs) -> Result<()> {
        let mut draft = match &args.lookup {
            Some(query) => self.lookup_draft(query, args.pick).await?,
            None => GameDraft::default(),
        };

        if let Some(title) = args.title {
            draft.title = title;
        }
        if !args.platforms.is_empty() {
            draft.platforms = args.platforms;
        }
        if !args.genres.is_empty() {
            draft.genres = args.genres;
        }
        draft.status = args.status.or(draft.status);
        draft.rating = args.rating.or(draft.rating);
        draft.notes = args.notes.or(draft.notes);

        let game = self.catalog.add(draft)?;
        println!("Added {}", format_row(&game));
        Ok(())
    }

    async fn lookup_draft(&self, query: &str, pick: usize) -> Result<GameDraft> {
        let api_key = self.require_api_key()?;

        let results = with_spinner(
            format!("Searching RAWG for '{}'", query),
            self.lookup.search(query, &api_key),
        )
        .await?;

        let summary = pick
            .checked_sub(1)
            .and_then(|index| results.get(index))
            .ok_or_else(|| {
                GameError::Validation(format!(
                    "no search result #{} for '{}' ({} found)",
                    pick,
                    query,
                    results.len()
                ))
            })?;

        Ok(with_spinner(
            format!("Fetching details for '{}'", summary.name),
            self.lookup.draft_for(summary, &api_key),
        )
        .await)
    }

    fn edit(&mut self, args: EditArgs) -> Result<()> {
        let id = self.resolve_id(&args.id)?;
        let patch = GamePatch {
            title: args.title,
            platforms: args.platforms,
            genres: args.genres,
            status: args.status,
            rating: if args.clear_rating {
                Some(None)
            } else {
                args.rating.map(Some)
            },
            notes: if args.clear_notes {
                Some(None)
            } else {
                args.notes.map(Some)
            },
            description: args.description.map(Some),
            cover_url: args.cover_url.map(Some),
            release_date: args.release_date.map(Some),
            metacritic_score: args.metacritic.map(Some),
            external_id: None,
        };
        if patch.is_empty() {
            return Err(GameError::Validation("nothing to change".to_string()));
        }

        if !self.catalog.update(&id, patch)? {
            return Err(GameError::NotFound(id));
        }
        if let Some(game) = self.catalog.get(&id) {
            println!("Updated {}", format_row(game));
        }
        Ok(())
    }

    fn set_status(&mut self, id: &str, status: GameStatus) -> Result<()> {
        let id = self.resolve_id(id)?;
        if !self.catalog.set_status(&id, status)? {
            return Err(GameError::NotFound(id));
        }
        if let Some(game) = self.catalog.get(&id) {
            println!("Updated {}", format_row(game));
        }
        Ok(())
    }

    fn remove(&mut self, id: &str) -> Result<()> {
        let id = self.resolve_id(id)?;
        match self.catalog.remove(&id)? {
            Some(game) => {
                println!("Removed '{}'", game.title);
                Ok(())
            }
            None => Err(GameError::NotFound(id)),
        }
    }

    fn random(&self, filters: FilterArgs) -> Result<()> {
        let view_query = to_query(filters);
        let games = query::view(self.catalog.games(), &view_query);
        match query::pick_random(&games, &mut rand::thread_rng()) {
            Some(game) => print!("{}", format_detail(game)),
            None => println!("Nothing left to play in this selection."),
        }
        Ok(())
    }

    async fn search(&self, query: &str) -> Result<()> {
        let api_key = self.require_api_key()?;
        let results = with_spinner(
            format!("Searching RAWG for '{}'", query),
            self.lookup.search(query, &api_key),
        )
        .await?;

        if results.is_empty() {
            println!("No results.");
        }
        for (index, game) in results.iter().enumerate() {
            let released = game.released.as_deref().unwrap_or("unknown");
            let score = game
                .metacritic
                .map(|s| format!("  metacritic {}", s))
                .unwrap_or_default();
            println!("{:>2}. {} ({}){}", index + 1, game.name, released, score);
        }
        Ok(())
    }

    fn import(&mut self, file: &Path) -> Result<()> {
        let content = std::fs::read_to_string(file)?;
        let games: Vec<Game> = serde_json::from_str(&content)?;
        self.catalog.replace_all(games)?;
        println!("Imported {} games", self.catalog.games().len());
        Ok(())
    }

    fn export(&self, file: &Path) -> Result<()> {
        let content = serde_json::to_string_pretty(self.catalog.games())?;
        std::fs::write(file, content)?;
        info!("Exported catalog to {:?}", file);
        println!("Exported {} games to {}", self.catalog.games().len(), file.display());
        Ok(())
    }

    fn stats(&self) -> Result<()> {
        let games = self.catalog.games();
        for status in GameStatus::ALL {
            let count = games.iter().filter(|g| g.status == status).count();
            println!("{:<13} {}", status, count);
        }
        println!("{:<13} {}", "total", games.len());
        Ok(())
    }

    fn key(&self, action: KeyCommand) -> Result<()> {
        match action {
            KeyCommand::Set { key } => {
                if key.trim().is_empty() {
                    return Err(GameError::Validation("API key must not be empty".to_string()));
                }
                self.store.save_api_key(&key)?;
                println!("API key saved");
            }
            KeyCommand::Clear => {
                self.store.clear_api_key()?;
                println!("API key removed");
            }
            KeyCommand::Show => match self.api_key() {
                Some(key) => println!("{}", mask_key(&key)),
                None => println!("No API key set"),
            },
        }
        Ok(())
    }

    /// Command-line/env key first, then the stored one.
    fn api_key(&self) -> Option<String> {
        self.config
            .args
            .rawg_api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .map(str::to_string)
            .or_else(|| self.store.load_api_key())
    }

    fn require_api_key(&self) -> Result<String> {
        self.api_key().ok_or_else(|| {
            GameError::Auth("no RAWG API key configured, set one with `key set <KEY>`".to_string())
        })
    }

    /// Accepts a full id or an unambiguous prefix of one.
    fn resolve_id(&self, input: &str) -> Result<String> {
        let input = input.trim();
        if self.catalog.get(input).is_some() {
            return Ok(input.to_string());
        }

        let matches: Vec<&Game> = self
            .catalog
            .games()
            .iter()
            .filter(|g| !input.is_empty() && g.id.starts_with(input))
            .collect();
        match matches.as_slice() {
            [game] => Ok(game.id.clone()),
            [] => Err(GameError::NotFound(input.to_string())),
            _ => Err(GameError::Validation(format!(
                "id prefix '{}' matches {} games",
                input,
                matches.len()
            ))),
        }
    }
}

async fn with_spinner<T>(message: String, fut: impl Future<Output = T>) -> T {
    let spinner = ProgressBar::new_spinner();
    if let Ok(style) = ProgressStyle::default_spinner().template("{spinner} {msg}") {
        spinner.set_style(style);
    }
    spinner.set_message(message);
    spinner.enable_steady_tick(Duration::from_millis(100));
    let output = fut.await;
    spinner.finish_and_clear();
    output
}

fn to_query(filters: FilterArgs) -> Query {
    Query {
        search: filters.search,
        platforms: filters.platforms.into_iter().collect(),
        genres: filters.genres.into_iter().collect(),
        statuses: filters.statuses.into_iter().collect(),
        sort: filters.sort,
    }
}

fn short_id(id: &str) -> &str {
    id.get(..SHORT_ID_LEN).unwrap_or(id)
}

fn stars(rating: Option<u8>) -> String {
    match rating {
        Some(r) => "*".repeat(r as usize),
        None => "-".to_string(),
    }
}

fn mask_key(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{}{}", visible, "*".repeat(key.chars().count().saturating_sub(4)))
}

fn format_row(game: &Game) -> String {
    format!(
        "{:<8}  {:<32}  {:<12}  {:<5}  {}",
        short_id(&game.id),
        game.title,
        game.status,
        stars(game.rating),
        game.platforms.join(", ")
    )
}

fn format_detail(game: &Game) -> String {
    let mut out = format!("{}\n", game.title);
    let mut field = |name: &str, value: Option<String>| {
        if let Some(value) = value {
            out.push_str(&format!("  {:<12} {}\n", name, value));
        }
    };

    field("id", Some(game.id.clone()));
    field("status", Some(game.status.to_string()));
    field("rating", game.rating.map(|r| stars(Some(r))));
    field(
        "platforms",
        (!game.platforms.is_empty()).then(|| game.platforms.join(", ")),
    );
    field(
        "genres",
        (!game.genres.is_empty()).then(|| game.genres.join(", ")),
    );
    field("released", game.release_date.clone());
    field("metacritic", game.metacritic_score.map(|s| s.to_string()));
    field("added", Some(game.date_added.to_string()));
    field("completed", game.date_completed.map(|d| d.to_string()));
    field("cover", game.cover_url.clone());
    field("rawg id", game.external_id.map(|id| id.to_string()));
    field("notes", game.notes.clone());
    field("description", game.description.clone());
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::cli::Args;
    use clap::Parser;
    use tempfile::tempdir;

    // RAWG_API_KEY and GAMEBACKLOG_RELAY_URL from the shell must not leak in.
    fn app_in(dir: &Path) -> App {
        let mut args = Args::try_parse_from([
            "gamebacklog",
            "--data-dir",
            dir.to_str().unwrap(),
            "stats",
        ])
        .unwrap();
        args.rawg_api_key = None;
        args.relay_url = None;
        App::new(Config::from_args(args).unwrap())
    }

    fn add_args(title: &str) -> AddArgs {
        AddArgs {
            title: Some(title.to_string()),
            lookup: None,
            pick: 1,
            platforms: vec!["PC".to_string()],
            genres: vec![],
            status: None,
            rating: Some(3),
            notes: None,
        }
    }

    #[tokio::test]
    async fn test_add_status_and_remove_through_commands() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());

        app.run(Command::Add(add_args("Hollow Knight"))).await.unwrap();
        let id = app.catalog.games()[0].id.clone();
        assert_eq!(app.catalog.games()[0].rating, Some(3));

        app.run(Command::Status {
            id: short_id(&id).to_string(),
            status: GameStatus::Completed,
        })
        .await
        .unwrap();
        assert!(app.catalog.get(&id).unwrap().date_completed.is_some());

        app.run(Command::Remove { id: id.clone() }).await.unwrap();
        assert!(app.catalog.games().is_empty());

        let err = app.run(Command::Remove { id }).await.unwrap_err();
        assert!(matches!(err, GameError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_edit_requires_changes() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        app.run(Command::Add(add_args("Hollow Knight"))).await.unwrap();
        let id = app.catalog.games()[0].id.clone();

        let edit = EditArgs {
            id: id.clone(),
            title: None,
            platforms: None,
            genres: None,
            status: None,
            rating: None,
            clear_rating: true,
            notes: None,
            clear_notes: false,
            description: None,
            cover_url: None,
            release_date: None,
            metacritic: None,
        };
        app.run(Command::Edit(edit)).await.unwrap();
        assert_eq!(app.catalog.get(&id).unwrap().rating, None);

        let empty = EditArgs {
            id,
            title: None,
            platforms: None,
            genres: None,
            status: None,
            rating: None,
            clear_rating: false,
            notes: None,
            clear_notes: false,
            description: None,
            cover_url: None,
            release_date: None,
            metacritic: None,
        };
        assert!(matches!(
            app.run(Command::Edit(empty)).await,
            Err(GameError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_export_then_import() {
        let dir = tempdir().unwrap();
        let mut app = app_in(&dir.path().join("data"));
        app.run(Command::Add(add_args("Hollow Knight"))).await.unwrap();
        app.run(Command::Add(add_args("Silksong"))).await.unwrap();

        let file = dir.path().join("backup.json");
        app.run(Command::Export { file: file.clone() }).await.unwrap();

        let mut other = app_in(&dir.path().join("other"));
        other.run(Command::Import { file }).await.unwrap();
        assert_eq!(other.catalog.games(), app.catalog.games());
    }

    #[tokio::test]
    async fn test_lookup_without_key_is_auth_error() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());

        let mut args = add_args("ignored");
        args.lookup = Some("hades".to_string());
        let err = app.run(Command::Add(args)).await.unwrap_err();
        assert!(matches!(err, GameError::Auth(_)));
        assert!(app.catalog.games().is_empty());
    }

    #[tokio::test]
    async fn test_key_set_and_clear() {
        let dir = tempdir().unwrap();
        let mut app = app_in(dir.path());
        assert_eq!(app.api_key(), None);
        assert!(matches!(app.require_api_key(), Err(GameError::Auth(_))));

        app.run(Command::Key {
            action: KeyCommand::Set {
                key: " secret-key ".to_string(),
            },
        })
        .await
        .unwrap();
        assert_eq!(app.api_key().as_deref(), Some("secret-key"));

        app.run(Command::Key {
            action: KeyCommand::Clear,
        })
        .await
        .unwrap();
        assert_eq!(app.api_key(), None);
    }

    #[test]
    fn test_mask_key() {
        assert_eq!(mask_key("abcdef12"), "abcd****");
        assert_eq!(mask_key("ab"), "ab");
    }
}
