use thiserror::Error;

#[derive(Error, Debug)]
pub enum GameError {
    #[error("Validation error: {0}")]
    Validation(String),
    #[error("Authentication error: {0}")]
    Auth(String),
    #[error("Network error: {0}")]
    Network(String),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
    #[error("No game with id {0}")]
    NotFound(String),
}

impl From<reqwest::Error> for GameError {
    fn from(err: reqwest::Error) -> Self {
        if err.is_timeout() {
            GameError::Network(format!("request timed out: {err}"))
        } else {
            GameError::Network(err.to_string())
        }
    }
}

pub type Result<T> = std::result::Result<T, GameError>;
