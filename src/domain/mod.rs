mod game;
pub(crate) mod storage;

pub use game::{dedup_names, Game, GameDraft, GamePatch, GameStatus, GENRES, PLATFORMS};
