use std::collections::BTreeSet;
use std::sync::Arc;
use std::sync::atomic::{AtomicI64, Ordering};

use async_trait::async_trait;
use axum::extract::ws::Utf8Bytes;
use chrono::Utc;
use sqlx::postgres::PgRow;
use sqlx::{PgPool, Row};
use tokio::sync::Mutex;
use tracing::warn;

use crate::domain::ports::{Clock, FeedPublisher, ScoreStore};
use crate::domain::score::{NewScore, Score};
use crate::domain::stats::{GameStats, PlayerStats, compute_game_stats, compute_player_stats};
use crate::interface_adapters::protocol::{
    LeaderboardPayload, ScoreResponse, ScoreUpdatePayload, ServerEnvelope, ServerMessage,
};
use crate::use_cases::feed::ScoreFeed;

#[derive(Clone)]
pub struct AppState {
    pub store: Arc<dyn ScoreStore>,
    pub feed: Arc<ScoreFeed>,
}

pub struct SystemClock;

impl Clock for SystemClock {
    fn now_utc(&self) -> chrono::DateTime<Utc> {
        Utc::now()
    }
}

/// Bridges accepted submissions onto the push feed. Frames are encoded once
/// here and fanned out as shared bytes.
#[derive(Clone)]
pub struct FeedNotifier {
    feed: Arc<ScoreFeed>,
}

impl FeedNotifier {
    pub fn new(feed: Arc<ScoreFeed>) -> Self {
        Self { feed }
    }

    fn publish(&self, game: &str, message: ServerMessage) {
        match ServerEnvelope::now(message).to_frame() {
            Ok(frame) => self.feed.publish(Arc::from(game), Utf8Bytes::from(frame)),
            Err(error) => warn!(%error, "failed to encode feed frame"),
        }
    }
}

impl FeedPublisher for FeedNotifier {
    fn publish_score(&self, score: &Score) {
        self.publish(
            &score.game_name,
            ServerMessage::ScoreUpdate(ScoreUpdatePayload::from(score)),
        );
    }

    fn publish_leaderboard(&self, game_name: &str, top: &[Score]) {
        self.publish(
            game_name,
            ServerMessage::LeaderboardUpdate(LeaderboardPayload {
                game_name: game_name.to_string(),
                top_scores: top.iter().map(ScoreResponse::from).collect(),
            }),
        );
    }
}

/// Development store backed by a plain vector. Used whenever no database is
/// configured, so the server always starts with something to serve.
pub struct InMemoryScoreStore {
    rows: Mutex<Vec<Score>>,
    next_id: AtomicI64,
}

impl InMemoryScoreStore {
    pub fn new() -> Self {
        Self {
            rows: Mutex::new(Vec::new()),
            next_id: AtomicI64::new(1),
        }
    }

    pub fn with_seed(rows: Vec<Score>) -> Self {
        let next_id = rows.iter().map(|s| s.id).max().unwrap_or(0) + 1;
        Self {
            rows: Mutex::new(rows),
            next_id: AtomicI64::new(next_id),
        }
    }

    async fn sorted_rows<F>(&self, keep: F) -> Vec<Score>
    where
        F: Fn(&Score) -> bool,
    {
        let rows = self.rows.lock().await;
        let mut matching: Vec<Score> = rows.iter().filter(|s| keep(s)).cloned().collect();
        matching.sort_by(|a, b| b.score.cmp(&a.score));
        matching
    }
}

impl Default for InMemoryScoreStore {
    fn default() -> Self {
        Self::new()
    }
}

fn window(rows: Vec<Score>, page: i64, size: i64) -> (Vec<Score>, i64) {
    let total = rows.len() as i64;
    let offset = (page * size).max(0) as usize;
    let paged = rows.into_iter().skip(offset).take(size.max(0) as usize).collect();
    (paged, total)
}

#[async_trait]
impl ScoreStore for InMemoryScoreStore {
    async fn insert(&self, entry: &NewScore) -> Result<Score, String> {
        let stored = Score {
            id: self.next_id.fetch_add(1, Ordering::Relaxed),
            player_name: entry.player_name.clone(),
            game_name: entry.game_name.clone(),
            score: entry.score,
            achieved_at: entry.achieved_at,
            created_at: Utc::now(),
        };
        self.rows.lock().await.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Score>, String> {
        Ok(self.rows.lock().await.iter().find(|s| s.id == id).cloned())
    }

    async fn all_games(&self) -> Result<Vec<String>, String> {
        let rows = self.rows.lock().await;
        let games: BTreeSet<String> = rows.iter().map(|s| s.game_name.clone()).collect();
        Ok(games.into_iter().collect())
    }

    async fn all_players(&self) -> Result<Vec<String>, String> {
        let rows = self.rows.lock().await;
        let players: BTreeSet<String> = rows.iter().map(|s| s.player_name.clone()).collect();
        Ok(players.into_iter().collect())
    }

    async fn top_for_game(&self, game_name: &str, limit: i64) -> Result<Vec<Score>, String> {
        let mut rows = self.sorted_rows(|s| s.game_name == game_name).await;
        rows.truncate(limit.max(0) as usize);
        Ok(rows)
    }

    async fn game_page(
        &self,
        game_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String> {
        let rows = self.sorted_rows(|s| s.game_name == game_name).await;
        Ok(window(rows, page, size))
    }

    async fn player_page(
        &self,
        player_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String> {
        let rows = self.sorted_rows(|s| s.player_name == player_name).await;
        Ok(window(rows, page, size))
    }

    async fn player_game_scores(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Vec<Score>, String> {
        Ok(self
            .sorted_rows(|s| s.player_name == player_name && s.game_name == game_name)
            .await)
    }

    async fn player_high_score(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Option<Score>, String> {
        Ok(self
            .sorted_rows(|s| s.player_name == player_name && s.game_name == game_name)
            .await
            .into_iter()
            .next())
    }

    async fn game_stats(&self, game_name: &str) -> Result<GameStats, String> {
        let rows = self.rows.lock().await;
        let matching: Vec<&Score> = rows.iter().filter(|s| s.game_name == game_name).collect();
        Ok(compute_game_stats(game_name, &matching))
    }

    async fn player_stats(&self, player_name: &str) -> Result<PlayerStats, String> {
        let rows = self.rows.lock().await;
        let matching: Vec<&Score> = rows.iter().filter(|s| s.player_name == player_name).collect();
        Ok(compute_player_stats(player_name, &matching))
    }

    async fn ping(&self) -> Result<(), String> {
        Ok(())
    }
}

pub struct PostgresScoreStore {
    pool: PgPool,
}

impl PostgresScoreStore {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn score_from_row(row: &PgRow) -> Score {
    Score {
        id: row.get("id"),
        player_name: row.get("player_name"),
        game_name: row.get("game_name"),
        score: row.get("score"),
        achieved_at: row.get("achieved_at"),
        created_at: row.get("created_at"),
    }
}

const SCORE_COLUMNS: &str = "id, player_name, game_name, score, achieved_at, created_at";

#[async_trait]
impl ScoreStore for PostgresScoreStore {
    async fn insert(&self, entry: &NewScore) -> Result<Score, String> {
        let row = sqlx::query(&format!(
            "INSERT INTO game_scores (player_name, game_name, score, achieved_at) \
             VALUES ($1, $2, $3, $4) RETURNING {SCORE_COLUMNS}"
        ))
        .bind(&entry.player_name)
        .bind(&entry.game_name)
        .bind(entry.score)
        .bind(entry.achieved_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(score_from_row(&row))
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Score>, String> {
        let row = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM game_scores WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(row.as_ref().map(score_from_row))
    }

    async fn all_games(&self) -> Result<Vec<String>, String> {
        sqlx::query_scalar("SELECT DISTINCT game_name FROM game_scores ORDER BY game_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.to_string())
    }

    async fn all_players(&self) -> Result<Vec<String>, String> {
        sqlx::query_scalar("SELECT DISTINCT player_name FROM game_scores ORDER BY player_name")
            .fetch_all(&self.pool)
            .await
            .map_err(|e| e.to_string())
    }

    async fn top_for_game(&self, game_name: &str, limit: i64) -> Result<Vec<Score>, String> {
        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM game_scores \
             WHERE game_name = $1 ORDER BY score DESC LIMIT $2"
        ))
        .bind(game_name)
        .bind(limit)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(rows.iter().map(score_from_row).collect())
    }

    async fn game_page(
        &self,
        game_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String> {
        let total: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM game_scores WHERE game_name = $1")
            .bind(game_name)
            .fetch_one(&self.pool)
            .await
            .map_err(|e| e.to_string())?;
        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM game_scores \
             WHERE game_name = $1 ORDER BY score DESC LIMIT $2 OFFSET $3"
        ))
        .bind(game_name)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok((rows.iter().map(score_from_row).collect(), total))
    }

    async fn player_page(
        &self,
        player_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String> {
        let total: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM game_scores WHERE player_name = $1")
                .bind(player_name)
                .fetch_one(&self.pool)
                .await
                .map_err(|e| e.to_string())?;
        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM game_scores \
             WHERE player_name = $1 ORDER BY score DESC LIMIT $2 OFFSET $3"
        ))
        .bind(player_name)
        .bind(size)
        .bind(page * size)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok((rows.iter().map(score_from_row).collect(), total))
    }

    async fn player_game_scores(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Vec<Score>, String> {
        let rows = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM game_scores \
             WHERE player_name = $1 AND game_name = $2 ORDER BY score DESC"
        ))
        .bind(player_name)
        .bind(game_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(rows.iter().map(score_from_row).collect())
    }

    async fn player_high_score(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Option<Score>, String> {
        let row = sqlx::query(&format!(
            "SELECT {SCORE_COLUMNS} FROM game_scores \
             WHERE player_name = $1 AND game_name = $2 ORDER BY score DESC LIMIT 1"
        ))
        .bind(player_name)
        .bind(game_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(row.as_ref().map(score_from_row))
    }

    async fn game_stats(&self, game_name: &str) -> Result<GameStats, String> {
        let row = sqlx::query(
            "SELECT COUNT(DISTINCT player_name) AS total_players, \
                    COUNT(*) AS total_scores, \
                    COALESCE(AVG(score), 0)::FLOAT8 AS average_score, \
                    COALESCE(MAX(score), 0) AS highest_score \
             FROM game_scores WHERE game_name = $1",
        )
        .bind(game_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        let top_player: Option<String> = sqlx::query_scalar(
            "SELECT player_name FROM game_scores \
             WHERE game_name = $1 ORDER BY score DESC LIMIT 1",
        )
        .bind(game_name)
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(GameStats {
            game_name: game_name.to_string(),
            total_players: row.get("total_players"),
            total_scores: row.get("total_scores"),
            average_score: row.get("average_score"),
            highest_score: row.get("highest_score"),
            top_player: top_player.unwrap_or_default(),
        })
    }

    async fn player_stats(&self, player_name: &str) -> Result<PlayerStats, String> {
        let row = sqlx::query(
            "SELECT COUNT(*) AS total_games, \
                    COALESCE(SUM(score), 0)::BIGINT AS total_score, \
                    COALESCE(AVG(score), 0)::FLOAT8 AS average_score, \
                    COALESCE(MAX(score), 0) AS highest_score \
             FROM game_scores WHERE player_name = $1",
        )
        .bind(player_name)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        let games_played: Vec<String> = sqlx::query_scalar(
            "SELECT DISTINCT game_name FROM game_scores \
             WHERE player_name = $1 ORDER BY game_name",
        )
        .bind(player_name)
        .fetch_all(&self.pool)
        .await
        .map_err(|e| e.to_string())?;
        Ok(PlayerStats {
            player_name: player_name.to_string(),
            total_games: row.get("total_games"),
            total_score: row.get("total_score"),
            average_score: row.get("average_score"),
            highest_score: row.get("highest_score"),
            games_played,
        })
    }

    async fn ping(&self) -> Result<(), String> {
        sqlx::query("SELECT 1")
            .execute(&self.pool)
            .await
            .map(|_| ())
            .map_err(|e| e.to_string())
    }
}

#[cfg(test)]
mod tests {
    use chrono::TimeZone;

    use super::*;

    fn seed() -> Vec<Score> {
        let base = Utc.with_ymd_and_hms(2024, 6, 1, 12, 0, 0).unwrap();
        let mut id = 0;
        let mut entry = |player: &str, game: &str, score: i64| {
            id += 1;
            Score {
                id,
                player_name: player.to_string(),
                game_name: game.to_string(),
                score,
                achieved_at: base,
                created_at: base,
            }
        };
        vec![
            entry("GhostReaper", "Operation Nightfall", 145_820),
            entry("ShadowSniper", "Operation Nightfall", 142_150),
            entry("PhantomElite", "Operation Nightfall", 138_490),
            entry("GhostReaper", "Shadow Protocol", 98_500),
        ]
    }

    #[tokio::test]
    async fn when_inserting_then_ids_continue_after_seed() {
        let store = InMemoryScoreStore::with_seed(seed());
        let stored = store
            .insert(&NewScore {
                player_name: "ViperStrike".to_string(),
                game_name: "Operation Nightfall".to_string(),
                score: 135_280,
                achieved_at: Utc::now(),
            })
            .await
            .unwrap();
        assert_eq!(stored.id, 5);
        assert_eq!(store.find_by_id(5).await.unwrap().unwrap().score, 135_280);
    }

    #[tokio::test]
    async fn when_listing_top_then_sorted_and_truncated() {
        let store = InMemoryScoreStore::with_seed(seed());
        let top = store.top_for_game("Operation Nightfall", 2).await.unwrap();
        assert_eq!(top.len(), 2);
        assert_eq!(top[0].player_name, "GhostReaper");
        assert_eq!(top[1].player_name, "ShadowSniper");
    }

    #[tokio::test]
    async fn when_paging_past_the_end_then_page_is_empty_but_total_kept() {
        let store = InMemoryScoreStore::with_seed(seed());
        let (rows, total) = store.game_page("Operation Nightfall", 5, 10).await.unwrap();
        assert!(rows.is_empty());
        assert_eq!(total, 3);
    }

    #[tokio::test]
    async fn when_player_unknown_then_high_score_is_none() {
        let store = InMemoryScoreStore::with_seed(seed());
        let high = store
            .player_high_score("Nobody", "Operation Nightfall")
            .await
            .unwrap();
        assert!(high.is_none());
    }

    #[tokio::test]
    async fn when_game_unknown_then_stats_zeroed() {
        let store = InMemoryScoreStore::with_seed(seed());
        let stats = store.game_stats("Nowhere").await.unwrap();
        assert_eq!(stats.total_scores, 0);
        assert_eq!(stats.top_player, "");
    }

    #[tokio::test]
    async fn when_games_listed_then_distinct_and_sorted() {
        let store = InMemoryScoreStore::with_seed(seed());
        let games = store.all_games().await.unwrap();
        assert_eq!(games, vec!["Operation Nightfall", "Shadow Protocol"]);
    }
}
