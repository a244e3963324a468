use super::Game;
use crate::error::Result;

pub trait Storage: Send + Sync {
    /// Returns the persisted collection, or an empty one when the blob is
    /// missing or unreadable.
    fn load_games(&self) -> Vec<Game>;
    fn save_games(&self, games: &[Game]) -> Result<()>;
    fn load_api_key(&self) -> Option<String>;
    fn save_api_key(&self, key: &str) -> Result<()>;
    fn clear_api_key(&self) -> Result<()>;
}

pub struct StorageKeys;

impl StorageKeys {
    pub const GAMES: &'static str = "games";
    pub const API_KEY: &'static str = "api_key";
}
