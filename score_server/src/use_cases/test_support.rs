// Shared fakes for use case tests: a recording store with injectable
// failures, a fixed clock, and a publisher that captures outbound frames.

use std::collections::BTreeSet;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use chrono::{DateTime, Utc};

use crate::domain::ports::{Clock, FeedPublisher, ScoreStore};
use crate::domain::score::{NewScore, Score};
use crate::domain::stats::{GameStats, PlayerStats, compute_game_stats, compute_player_stats};

#[derive(Default)]
pub(crate) struct FailureFlags {
    pub insert: bool,
    pub top: bool,
    pub query: bool,
}

#[derive(Default)]
pub(crate) struct RecordingStore {
    pub inserted: Mutex<Vec<NewScore>>,
    pub rows: Mutex<Vec<Score>>,
    pub top_requests: Mutex<Vec<(String, i64)>>,
    pub page_requests: Mutex<Vec<(String, i64, i64)>>,
    failures: FailureFlags,
}

impl RecordingStore {
    pub fn with_failures(failures: FailureFlags) -> Self {
        Self {
            failures,
            ..Default::default()
        }
    }

    fn sorted_rows<F>(&self, keep: F) -> Vec<Score>
    where
        F: Fn(&Score) -> bool,
    {
        let mut rows: Vec<Score> = self.rows.lock().unwrap().iter().filter(|s| keep(s)).cloned().collect();
        rows.sort_by(|a, b| b.score.cmp(&a.score));
        rows
    }
}

#[async_trait]
impl ScoreStore for RecordingStore {
    async fn insert(&self, entry: &NewScore) -> Result<Score, String> {
        if self.failures.insert {
            return Err("store offline".to_string());
        }
        let mut inserted = self.inserted.lock().unwrap();
        inserted.push(entry.clone());
        let stored = Score {
            id: inserted.len() as i64,
            player_name: entry.player_name.clone(),
            game_name: entry.game_name.clone(),
            score: entry.score,
            achieved_at: entry.achieved_at,
            created_at: entry.achieved_at,
        };
        self.rows.lock().unwrap().push(stored.clone());
        Ok(stored)
    }

    async fn find_by_id(&self, id: i64) -> Result<Option<Score>, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        Ok(self.rows.lock().unwrap().iter().find(|s| s.id == id).cloned())
    }

    async fn all_games(&self) -> Result<Vec<String>, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        let rows = self.rows.lock().unwrap();
        let games: BTreeSet<String> = rows.iter().map(|s| s.game_name.clone()).collect();
        Ok(games.into_iter().collect())
    }

    async fn all_players(&self) -> Result<Vec<String>, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        let rows = self.rows.lock().unwrap();
        let players: BTreeSet<String> = rows.iter().map(|s| s.player_name.clone()).collect();
        Ok(players.into_iter().collect())
    }

    async fn top_for_game(&self, game_name: &str, limit: i64) -> Result<Vec<Score>, String> {
        self.top_requests
            .lock()
            .unwrap()
            .push((game_name.to_string(), limit));
        if self.failures.top {
            return Err("store offline".to_string());
        }
        let mut rows = self.sorted_rows(|s| s.game_name == game_name);
        rows.truncate(limit as usize);
        Ok(rows)
    }

    async fn game_page(
        &self,
        game_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String> {
        self.page_requests
            .lock()
            .unwrap()
            .push((game_name.to_string(), page, size));
        if self.failures.query {
            return Err("store offline".to_string());
        }
        let rows = self.sorted_rows(|s| s.game_name == game_name);
        let total = rows.len() as i64;
        Ok((rows, total))
    }

    async fn player_page(
        &self,
        player_name: &str,
        page: i64,
        size: i64,
    ) -> Result<(Vec<Score>, i64), String> {
        self.page_requests
            .lock()
            .unwrap()
            .push((player_name.to_string(), page, size));
        if self.failures.query {
            return Err("store offline".to_string());
        }
        let rows = self.sorted_rows(|s| s.player_name == player_name);
        let total = rows.len() as i64;
        Ok((rows, total))
    }

    async fn player_game_scores(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Vec<Score>, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        Ok(self.sorted_rows(|s| s.player_name == player_name && s.game_name == game_name))
    }

    async fn player_high_score(
        &self,
        player_name: &str,
        game_name: &str,
    ) -> Result<Option<Score>, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        Ok(self
            .sorted_rows(|s| s.player_name == player_name && s.game_name == game_name)
            .into_iter()
            .next())
    }

    async fn game_stats(&self, game_name: &str) -> Result<GameStats, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        let rows = self.rows.lock().unwrap();
        let filtered: Vec<&Score> = rows.iter().filter(|s| s.game_name == game_name).collect();
        Ok(compute_game_stats(game_name, &filtered))
    }

    async fn player_stats(&self, player_name: &str) -> Result<PlayerStats, String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        let rows = self.rows.lock().unwrap();
        let filtered: Vec<&Score> = rows.iter().filter(|s| s.player_name == player_name).collect();
        Ok(compute_player_stats(player_name, &filtered))
    }

    async fn ping(&self) -> Result<(), String> {
        if self.failures.query {
            return Err("store offline".to_string());
        }
        Ok(())
    }
}

#[derive(Clone, Copy)]
pub(crate) struct FixedClock(pub DateTime<Utc>);

impl Clock for FixedClock {
    fn now_utc(&self) -> DateTime<Utc> {
        self.0
    }
}

#[derive(Debug)]
pub(crate) enum PublishedEvent {
    Score(Score),
    Leaderboard { game: String, entries: Vec<Score> },
}

#[derive(Clone, Default)]
pub(crate) struct RecordingPublisher {
    pub events: Arc<Mutex<Vec<PublishedEvent>>>,
}

impl FeedPublisher for RecordingPublisher {
    fn publish_score(&self, score: &Score) {
        self.events
            .lock()
            .unwrap()
            .push(PublishedEvent::Score(score.clone()));
    }

    fn publish_leaderboard(&self, game_name: &str, top: &[Score]) {
        self.events.lock().unwrap().push(PublishedEvent::Leaderboard {
            game: game_name.to_string(),
            entries: top.to_vec(),
        });
    }
}
