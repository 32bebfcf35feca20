use chrono::{DateTime, Utc};

use super::errors::ScoreError;

/// A persisted score entry for one player in one game.
#[derive(Debug, Clone, PartialEq)]
pub struct Score {
    pub id: i64,
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    pub achieved_at: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
}

/// A submission that has passed validation but has not been stored yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewScore {
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    pub achieved_at: DateTime<Utc>,
}

pub fn validate_submission(
    player_name: &str,
    game_name: &str,
    score: i64,
) -> Result<(), ScoreError> {
    if player_name.trim().is_empty() {
        return Err(ScoreError::InvalidPlayerName);
    }
    if game_name.trim().is_empty() {
        return Err(ScoreError::InvalidGameName);
    }
    if score < 0 {
        return Err(ScoreError::InvalidScore);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_submission_valid_then_ok() {
        assert!(validate_submission("GhostReaper", "Operation Nightfall", 145_820).is_ok());
    }

    #[test]
    fn when_player_name_blank_then_invalid() {
        assert_eq!(
            validate_submission("   ", "Operation Nightfall", 10),
            Err(ScoreError::InvalidPlayerName)
        );
    }

    #[test]
    fn when_game_name_empty_then_invalid() {
        assert_eq!(
            validate_submission("GhostReaper", "", 10),
            Err(ScoreError::InvalidGameName)
        );
    }

    #[test]
    fn when_score_negative_then_invalid() {
        assert_eq!(
            validate_submission("GhostReaper", "Operation Nightfall", -1),
            Err(ScoreError::InvalidScore)
        );
    }

    #[test]
    fn when_score_zero_then_ok() {
        assert!(validate_submission("GhostReaper", "Operation Nightfall", 0).is_ok());
    }
}
