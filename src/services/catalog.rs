use crate::domain::storage::Storage;
use crate::domain::{Game, GameDraft, GamePatch, GameStatus};
use crate::error::{GameError, Result};
use chrono::{Local, NaiveDate};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

fn local_today() -> NaiveDate {
    Local::now().date_naive()
}

/// Owns the game collection. Every mutation writes the full collection back
/// through the [`Storage`] before returning; a failed write leaves the
/// in-memory collection as it was.
pub struct Catalog {
    store: Arc<dyn Storage>,
    games: Vec<Game>,
    today: fn() -> NaiveDate,
}

impl Catalog {
    pub fn load(store: Arc<dyn Storage + 'static>) -> Self {
        let games = store.load_games();
        info!("Catalog loaded with {} games", games.len());
        Self {
            store,
            games,
            today: local_today,
        }
    }

    #[cfg(test)]
    pub fn with_clock(mut self, today: fn() -> NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn games(&self) -> &[Game] {
        &self.games
    }

    pub fn get(&self, id: &str) -> Option<&Game> {
        self.games.iter().find(|g| g.id == id)
    }

    pub fn add(&mut self, draft: GameDraft) -> Result<Game> {
        if draft.title.trim().is_empty() {
            return Err(GameError::Validation("title must not be empty".to_string()));
        }

        let id = self.fresh_id();
        let game = Game::new(id, draft, (self.today)());
        self.games.push(game.clone());
        if let Err(e) = self.persist() {
            self.games.pop();
            return Err(e);
        }

        info!("Added '{}' ({})", game.title, game.id);
        Ok(game)
    }

    /// Merges `patch` into the game with `id`. Returns `false` when no such
    /// game exists, in which case nothing is written.
    pub fn update(&mut self, id: &str, patch: GamePatch) -> Result<bool> {
        if matches!(&patch.title, Some(title) if title.trim().is_empty()) {
            return Err(GameError::Validation("title must not be empty".to_string()));
        }

        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = self.games[index].clone();
        self.games[index].apply(patch);
        if let Err(e) = self.persist() {
            self.games[index] = previous;
            return Err(e);
        }

        info!("Updated game {}", id);
        Ok(true)
    }

    /// Status change with completion tracking: entering `completed` stamps
    /// today's date, leaving it clears the stamp.
    pub fn set_status(&mut self, id: &str, status: GameStatus) -> Result<bool> {
        let today = (self.today)();
        let Some(index) = self.position(id) else {
            return Ok(false);
        };
        let previous = self.games[index].clone();
        self.games[index].transition_to(status, today);
        if let Err(e) = self.persist() {
            self.games[index] = previous;
            return Err(e);
        }

        info!("Game {} is now {}", id, status);
        Ok(true)
    }

    /// Removes the game with `id` and hands it back. Callers holding a
    /// selection of that id must drop it.
    pub fn remove(&mut self, id: &str) -> Result<Option<Game>> {
        let Some(index) = self.position(id) else {
            return Ok(None);
        };
        let removed = self.games.remove(index);
        if let Err(e) = self.persist() {
            self.games.insert(index, removed);
            return Err(e);
        }

        info!("Removed '{}' ({})", removed.title, removed.id);
        Ok(Some(removed))
    }

    /// Replaces the whole collection. Later entries repeating an id are dropped.
    pub fn replace_all(&mut self, games: Vec<Game>) -> Result<()> {
        let mut seen = HashSet::new();
        let mut unique = Vec::with_capacity(games.len());
        for game in games {
            if seen.insert(game.id.clone()) {
                unique.push(game);
            } else {
                warn!("Dropping duplicate game id {} ('{}')", game.id, game.title);
            }
        }

        let previous = std::mem::replace(&mut self.games, unique);
        if let Err(e) = self.persist() {
            self.games = previous;
            return Err(e);
        }

        info!("Catalog replaced with {} games", self.games.len());
        Ok(())
    }

    fn fresh_id(&self) -> String {
        loop {
            let id = Uuid::new_v4().to_string();
            if self.get(&id).is_none() {
                return id;
            }
        }
    }

    fn position(&self, id: &str) -> Option<usize> {
        self.games.iter().position(|g| g.id == id)
    }

    fn persist(&self) -> Result<()> {
        self.store.save_games(&self.games)
    }
}
