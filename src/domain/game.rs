use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Platform names offered when entering a game by hand.
pub const PLATFORMS: &[&str] = &[
    "PC",
    "PlayStation 5",
    "PlayStation 4",
    "Xbox Series X|S",
    "Xbox One",
    "Nintendo Switch",
    "Steam Deck",
    "Mobile",
    "Other",
];

/// Genre names offered when entering a game by hand.
pub const GENRES: &[&str] = &[
    "Action",
    "Adventure",
    "RPG",
    "Strategy",
    "Simulation",
    "Puzzle",
    "Platformer",
    "Shooter",
    "Racing",
    "Sports",
    "Fighting",
    "Horror",
    "Indie",
    "Roguelike",
    "Other",
];

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum GameStatus {
    #[default]
    WantToPlay,
    Playing,
    Completed,
    Dropped,
}

impl GameStatus {
    pub const ALL: [GameStatus; 4] = [
        GameStatus::WantToPlay,
        GameStatus::Playing,
        GameStatus::Completed,
        GameStatus::Dropped,
    ];

    /// Stored status code, also used as the sort key.
    pub fn as_str(&self) -> &'static str {
        match self {
            GameStatus::WantToPlay => "want-to-play",
            GameStatus::Playing => "playing",
            GameStatus::Completed => "completed",
            GameStatus::Dropped => "dropped",
        }
    }

    /// Games still waiting to be (or being) played.
    pub fn is_active(&self) -> bool {
        matches!(self, GameStatus::WantToPlay | GameStatus::Playing)
    }
}

impl fmt::Display for GameStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

impl FromStr for GameStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        GameStatus::ALL
            .into_iter()
            .find(|status| status.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| {
                format!("unknown status '{s}', expected one of: want-to-play, playing, completed, dropped")
            })
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Game {
    pub id: String,
    pub title: String,
    #[serde(default)]
    pub platforms: Vec<String>,
    #[serde(default)]
    pub genres: Vec<String>,
    #[serde(default)]
    pub status: GameStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rating: Option<u8>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cover_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub release_date: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub metacritic_score: Option<u32>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_id: Option<u64>,
    pub date_added: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_completed: Option<NaiveDate>,
}

/// Attributes supplied when creating a game, either typed in by hand or
/// mapped from a metadata lookup.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GameDraft {
    pub title: String,
    pub platforms: Vec<String>,
    pub genres: Vec<String>,
    pub status: Option<GameStatus>,
    pub rating: Option<u8>,
    pub notes: Option<String>,
    pub description: Option<String>,
    pub cover_url: Option<String>,
    pub release_date: Option<String>,
    pub metacritic_score: Option<u32>,
    pub external_id: Option<u64>,
}

/// Partial update merged into an existing game. `None` leaves a field alone;
/// for optional attributes `Some(None)` clears it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GamePatch {
    pub title: Option<String>,
    pub platforms: Option<Vec<String>>,
    pub genres: Option<Vec<String>>,
    pub status: Option<GameStatus>,
    pub rating: Option<Option<u8>>,
    pub notes: Option<Option<String>>,
    pub description: Option<Option<String>>,
    pub cover_url: Option<Option<String>>,
    pub release_date: Option<Option<String>>,
    pub metacritic_score: Option<Option<u32>>,
    pub external_id: Option<Option<u64>>,
}

impl GamePatch {
    pub fn is_empty(&self) -> bool {
        *self == GamePatch::default()
    }
}

impl Game {
    pub fn new(id: String, draft: GameDraft, date_added: NaiveDate) -> Self {
        Self {
            id,
            title: draft.title.trim().to_string(),
            platforms: dedup_names(draft.platforms),
            genres: dedup_names(draft.genres),
            status: draft.status.unwrap_or_default(),
            rating: draft.rating,
            notes: draft.notes,
            description: draft.description,
            cover_url: draft.cover_url,
            release_date: draft.release_date,
            metacritic_score: draft.metacritic_score,
            external_id: draft.external_id,
            date_added,
            date_completed: None,
        }
    }

    /// Plain field merge. Status is copied as-is; completion stamping only
    /// happens through [`Game::transition_to`].
    pub fn apply(&mut self, patch: GamePatch) {
        if let Some(title) = patch.title {
            self.title = title.trim().to_string();
        }
        if let Some(platforms) = patch.platforms {
            self.platforms = dedup_names(platforms);
        }
        if let Some(genres) = patch.genres {
            self.genres = dedup_names(genres);
        }
        if let Some(status) = patch.status {
            self.status = status;
        }
        if let Some(rating) = patch.rating {
            self.rating = rating;
        }
        if let Some(notes) = patch.notes {
            self.notes = notes;
        }
        if let Some(description) = patch.description {
            self.description = description;
        }
        if let Some(cover_url) = patch.cover_url {
            self.cover_url = cover_url;
        }
        if let Some(release_date) = patch.release_date {
            self.release_date = release_date;
        }
        if let Some(score) = patch.metacritic_score {
            self.metacritic_score = score;
        }
        if let Some(external_id) = patch.external_id {
            self.external_id = external_id;
        }
    }

    pub fn transition_to(&mut self, status: GameStatus, today: NaiveDate) {
        match status {
            GameStatus::Completed if self.status != GameStatus::Completed => {
                self.date_completed = Some(today);
            }
            GameStatus::Completed => {}
            _ => self.date_completed = None,
        }
        self.status = status;
    }
}

/// Trims entries, drops blanks and repeated names while keeping first-seen order.
pub fn dedup_names(names: Vec<String>) -> Vec<String> {
    let mut out: Vec<String> = Vec::with_capacity(names.len());
    for name in names {
        let name = name.trim();
        if name.is_empty() || out.iter().any(|existing| existing == name) {
            continue;
        }
        out.push(name.to_string());
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn day(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn sample() -> Game {
        Game::new(
            "g1".to_string(),
            GameDraft {
                title: "  Hades ".to_string(),
                platforms: vec!["PC".into(), "PC".into(), " ".into(), "Nintendo Switch".into()],
                ..Default::default()
            },
            day(2024, 1, 1),
        )
    }

    #[test]
    fn test_new_game_defaults() {
        let game = sample();
        assert_eq!(game.title, "Hades");
        assert_eq!(game.status, GameStatus::WantToPlay);
        assert_eq!(game.platforms, vec!["PC", "Nintendo Switch"]);
        assert_eq!(game.date_completed, None);
    }

    #[test]
    fn test_transition_stamps_and_clears_completion() {
        let mut game = sample();
        game.transition_to(GameStatus::Completed, day(2024, 3, 1));
        assert_eq!(game.date_completed, Some(day(2024, 3, 1)));

        // already completed: stamp is kept
        game.transition_to(GameStatus::Completed, day(2024, 4, 1));
        assert_eq!(game.date_completed, Some(day(2024, 3, 1)));

        game.transition_to(GameStatus::Dropped, day(2024, 5, 1));
        assert_eq!(game.status, GameStatus::Dropped);
        assert_eq!(game.date_completed, None);
    }

    #[test]
    fn test_apply_status_does_not_stamp() {
        let mut game = sample();
        game.apply(GamePatch {
            status: Some(GameStatus::Completed),
            rating: Some(Some(5)),
            ..Default::default()
        });
        assert_eq!(game.status, GameStatus::Completed);
        assert_eq!(game.rating, Some(5));
        assert_eq!(game.date_completed, None);
    }

    #[test]
    fn test_apply_clears_optional_field() {
        let mut game = sample();
        game.notes = Some("finish the bounty".to_string());
        game.apply(GamePatch {
            notes: Some(None),
            ..Default::default()
        });
        assert_eq!(game.notes, None);
    }

    #[test]
    fn test_status_parse_and_serde() {
        assert_eq!("Want-To-Play".parse::<GameStatus>(), Ok(GameStatus::WantToPlay));
        assert!("finished".parse::<GameStatus>().is_err());
        assert_eq!(
            serde_json::to_string(&GameStatus::WantToPlay).unwrap(),
            "\"want-to-play\""
        );
    }

    #[test]
    fn test_serialized_field_names() {
        let mut game = sample();
        game.cover_url = Some("https://img/hades.jpg".to_string());
        let value = serde_json::to_value(&game).unwrap();
        assert_eq!(value["dateAdded"], "2024-01-01");
        assert_eq!(value["coverUrl"], "https://img/hades.jpg");
        assert_eq!(value["status"], "want-to-play");
        assert!(value.get("dateCompleted").is_none());
    }
}
