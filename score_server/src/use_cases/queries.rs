use std::sync::Arc;

use crate::domain::errors::ScoreError;
use crate::domain::paging::{PageMeta, page_meta};
use crate::domain::ports::ScoreStore;
use crate::domain::score::Score;
use crate::domain::stats::{GameStats, PlayerStats};

pub const DEFAULT_LEADERBOARD_SIZE: i64 = 10;
pub const DEFAULT_PAGE_SIZE: i64 = 10;

/// Read side of the score API. Query parameters arrive pre-parsed as
/// options; anything missing or out of range falls back to the defaults
/// instead of failing the request.
pub struct ScoreQueries {
    store: Arc<dyn ScoreStore>,
}

impl ScoreQueries {
    pub fn new(store: Arc<dyn ScoreStore>) -> Self {
        Self { store }
    }

    pub async fn games(&self) -> Result<Vec<String>, ScoreError> {
        self.store.all_games().await.map_err(ScoreError::StorageFailure)
    }

    pub async fn players(&self) -> Result<Vec<String>, ScoreError> {
        self.store.all_players().await.map_err(ScoreError::StorageFailure)
    }

    pub async fn score_by_id(&self, id: i64) -> Result<Score, ScoreError> {
        self.store
            .find_by_id(id)
            .await
            .map_err(ScoreError::StorageFailure)?
            .ok_or(ScoreError::NotFound)
    }

    pub async fn top_scores(&self, game: &str, limit: Option<i64>) -> Result<Vec<Score>, ScoreError> {
        let limit = limit.filter(|l| *l > 0).unwrap_or(DEFAULT_LEADERBOARD_SIZE);
        self.store
            .top_for_game(game, limit)
            .await
            .map_err(ScoreError::StorageFailure)
    }

    pub async fn game_scores(
        &self,
        game: &str,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<(Vec<Score>, PageMeta), ScoreError> {
        let (page, size) = normalize_window(page, size);
        let (scores, total) = self
            .store
            .game_page(game, page, size)
            .await
            .map_err(ScoreError::StorageFailure)?;
        Ok((scores, page_meta(page, size, total)))
    }

    pub async fn player_scores(
        &self,
        player: &str,
        page: Option<i64>,
        size: Option<i64>,
    ) -> Result<(Vec<Score>, PageMeta), ScoreError> {
        let (page, size) = normalize_window(page, size);
        let (scores, total) = self
            .store
            .player_page(player, page, size)
            .await
            .map_err(ScoreError::StorageFailure)?;
        Ok((scores, page_meta(page, size, total)))
    }

    pub async fn player_game_scores(
        &self,
        player: &str,
        game: &str,
    ) -> Result<Vec<Score>, ScoreError> {
        self.store
            .player_game_scores(player, game)
            .await
            .map_err(ScoreError::StorageFailure)
    }

    pub async fn player_high_score(&self, player: &str, game: &str) -> Result<Score, ScoreError> {
        self.store
            .player_high_score(player, game)
            .await
            .map_err(ScoreError::StorageFailure)?
            .ok_or(ScoreError::NotFound)
    }

    pub async fn game_stats(&self, game: &str) -> Result<GameStats, ScoreError> {
        self.store.game_stats(game).await.map_err(ScoreError::StorageFailure)
    }

    pub async fn player_stats(&self, player: &str) -> Result<PlayerStats, ScoreError> {
        self.store
            .player_stats(player)
            .await
            .map_err(ScoreError::StorageFailure)
    }
}

fn normalize_window(page: Option<i64>, size: Option<i64>) -> (i64, i64) {
    (
        page.filter(|p| *p >= 0).unwrap_or(0),
        size.filter(|s| *s > 0).unwrap_or(DEFAULT_PAGE_SIZE),
    )
}
