use std::sync::Arc;

use chrono::{DateTime, Utc};
use tracing::warn;

use crate::domain::errors::ScoreError;
use crate::domain::ports::{Clock, FeedPublisher, ScoreStore};
use crate::domain::score::{NewScore, Score, validate_submission};

pub struct SubmitScoreRequest {
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    /// RFC 3339 timestamp supplied by the caller. Anything unparsable
    /// silently falls back to the current time.
    pub achieved_at: Option<String>,
}

/// Validates a submission, persists it, and pushes the accepted score plus
/// a refreshed leaderboard to live subscribers.
pub struct SubmitScoreUseCase<C, P> {
    clock: C,
    publisher: P,
    store: Arc<dyn ScoreStore>,
    leaderboard_size: i64,
}

impl<C: Clock, P: FeedPublisher> SubmitScoreUseCase<C, P> {
    pub fn new(clock: C, publisher: P, store: Arc<dyn ScoreStore>, leaderboard_size: i64) -> Self {
        Self {
            clock,
            publisher,
            store,
            leaderboard_size,
        }
    }

    pub async fn execute(&self, request: SubmitScoreRequest) -> Result<Score, ScoreError> {
        validate_submission(&request.player_name, &request.game_name, request.score)?;

        let achieved_at = request
            .achieved_at
            .as_deref()
            .and_then(|raw| DateTime::parse_from_rfc3339(raw).ok())
            .map(|parsed| parsed.with_timezone(&Utc))
            .unwrap_or_else(|| self.clock.now_utc());

        let entry = NewScore {
            player_name: request.player_name,
            game_name: request.game_name,
            score: request.score,
            achieved_at,
        };
        let stored = self
            .store
            .insert(&entry)
            .await
            .map_err(ScoreError::StorageFailure)?;

        // Push traffic never blocks the submission: the score frame goes out
        // first, then the refreshed top list. A failed refresh is logged and
        // the submission still succeeds.
        self.publisher.publish_score(&stored);
        match self
            .store
            .top_for_game(&stored.game_name, self.leaderboard_size)
            .await
        {
            Ok(top) => self.publisher.publish_leaderboard(&stored.game_name, &top),
            Err(error) => {
                warn!(game = %stored.game_name, %error, "leaderboard refresh after submit failed")
            }
        }

        Ok(stored)
    }
}
