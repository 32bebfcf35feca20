use std::fmt;

#[derive(Debug, PartialEq)]
pub enum ScoreError {
    InvalidPlayerName,
    InvalidGameName,
    InvalidScore,
    NotFound,
    StorageFailure(String),
}

impl fmt::Display for ScoreError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ScoreError::InvalidPlayerName => write!(f, "player name must not be empty"),
            ScoreError::InvalidGameName => write!(f, "game name must not be empty"),
            ScoreError::InvalidScore => write!(f, "score must not be negative"),
            ScoreError::NotFound => write!(f, "score not found"),
            ScoreError::StorageFailure(msg) => write!(f, "storage failure: {msg}"),
        }
    }
}

impl std::error::Error for ScoreError {}
