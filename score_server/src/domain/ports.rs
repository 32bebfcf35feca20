use async_trait::async_trait;
use chrono::{DateTime, Utc};

use super::score::{NewScore, Score};
use super::stats::{GameStats, PlayerStats};

// Port for score persistence. Implementations live in the
// interface_adapters layer.
#[async_trait]
pub trait ScoreStore: Send + Sync {
    async fn insert(&self, entry: &NewScore) -> Result<Score, String>;
    async fn find_by_id(&self, id: i64) -> Result<Option<Score>, String>;
    async fn all_games(&self) -> Result<Vec<String>, String>;
    async fn all_players(&self) -> Result<Vec<String>, String>;
    /// Best scores for a game, highest first.
    async fn top_for_game(&self, game_name: &str, limit: i64) -> Result<Vec<Score>, String>;
    /// One page of a game's scores ordered highest first, plus the total
    /// number of entries for that game.
    async fn game_page(
        &self,
        game_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String>;
    /// One page of a player's scores across all games, highest first.
    async fn player_page(
        &self,
        player_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String>;
    async fn player_game_scores(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Vec<Score>, String>;
    async fn player_high_score(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Option<Score>, String>;
    async fn game_stats(&self, game_name: &str) -> Result<GameStats, String>;
    async fn player_stats(&self, player_name: &str) -> Result<PlayerStats, String>;
    /// Cheap round trip used by the readiness probe.
    async fn ping(&self) -> Result<(), String>;
}

// Port for time. Lets use cases be tested with a fixed clock.
pub trait Clock: Send + Sync {
    fn now_utc(&self) -> DateTime<Utc>;
}

// Port for pushing accepted scores out to live subscribers. Publishing is
// fire-and-forget; a submission never fails because nobody is listening.
pub trait FeedPublisher: Send + Sync {
    fn publish_score(&self, score: &Score);
    fn publish_leaderboard(&self, game_name: &str, top: &[Score]);
}
