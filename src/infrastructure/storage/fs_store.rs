use crate::domain::storage::{Storage, StorageKeys};
use crate::domain::Game;
use crate::error::Result;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

#[derive(Clone)]
pub struct FileSystemStore {
    data_dir: PathBuf,
}

impl FileSystemStore {
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
        }
    }

    fn get_path_for_key(&self, key: &str, extension: &str) -> PathBuf {
        self.data_dir.join(format!("{}.{}", key, extension))
    }

    fn ensure_dir(&self, dir: &Path) -> Result<()> {
        if !dir.exists() {
            fs::create_dir_all(dir)?;
        }
        Ok(())
    }

    fn write_json_file<T: serde::Serialize + ?Sized>(&self, key: &str, data: &T) -> Result<()> {
        self.ensure_dir(&self.data_dir)?;
        let path = self.get_path_for_key(key, "json");
        let content = serde_json::to_string_pretty(data)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn read_json_file<T: serde::de::DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let path = self.get_path_for_key(key, "json");
        if path.exists() {
            let content = fs::read_to_string(path)?;
            Ok(Some(serde_json::from_str(&content)?))
        } else {
            Ok(None)
        }
    }
}

impl Storage for FileSystemStore {
    fn load_games(&self) -> Vec<Game> {
        match self.read_json_file::<Vec<Game>>(StorageKeys::GAMES) {
            Ok(Some(games)) => {
                debug!("Loaded {} games from {:?}", games.len(), self.data_dir);
                games
            }
            Ok(None) => Vec::new(),
            Err(e) => {
                warn!("Stored game list is unreadable, starting empty: {}", e);
                Vec::new()
            }
        }
    }

    fn save_games(&self, games: &[Game]) -> Result<()> {
        self.write_json_file(StorageKeys::GAMES, games)
    }

    fn load_api_key(&self) -> Option<String> {
        let path = self.get_path_for_key(StorageKeys::API_KEY, "txt");
        match fs::read_to_string(&path) {
            Ok(content) => {
                let key = content.trim();
                (!key.is_empty()).then(|| key.to_string())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => {
                warn!("Failed to read API key from {:?}: {}", path, e);
                None
            }
        }
    }

    fn save_api_key(&self, key: &str) -> Result<()> {
        self.ensure_dir(&self.data_dir)?;
        fs::write(self.get_path_for_key(StorageKeys::API_KEY, "txt"), key.trim())?;
        Ok(())
    }

    fn clear_api_key(&self) -> Result<()> {
        let path = self.get_path_for_key(StorageKeys::API_KEY, "txt");
        if path.exists() {
            fs::remove_file(path)?;
        }
        Ok(())
    }
}
