use std::time::{Duration, Instant};

use super::fallback::fallback_scores;
use super::score::{ScoreEntry, ScoreUpdate};

/// How long the most recent score stays visually highlighted.
pub const HIGHLIGHT_TTL: Duration = Duration::from_secs(3);

/// Where the rows currently on the board came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataSource {
    Loading,
    Query,
    Fallback,
    Realtime,
}

/// Presentation state for one game's leaderboard: the rows, where they
/// came from, and a short-lived highlight for the latest score. Time is
/// passed in by the caller so the fade-out is testable.
#[derive(Debug, Clone)]
pub struct LeaderboardView {
    game_name: String,
    source: DataSource,
    entries: Vec<ScoreEntry>,
    error: Option<String>,
    highlight: Option<(String, i64, Instant)>,
}

impl LeaderboardView {
    pub fn new(game_name: impl Into<String>) -> Self {
        Self {
            game_name: game_name.into(),
            source: DataSource::Loading,
            entries: Vec::new(),
            error: None,
            highlight: None,
        }
    }

    pub fn game_name(&self) -> &str {
        &self.game_name
    }

    pub fn source(&self) -> DataSource {
        self.source
    }

    pub fn entries(&self) -> &[ScoreEntry] {
        &self.entries
    }

    pub fn error(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Installs the initial dataset. A failed or empty query falls back to
    /// the canned standings; the error, if any, is kept for display.
    pub fn seed_from_query(&mut self, result: Result<Vec<ScoreEntry>, String>) {
        match result {
            Ok(entries) if !entries.is_empty() => {
                self.entries = entries;
                self.source = DataSource::Query;
                self.error = None;
            }
            Ok(_) => {
                self.entries = fallback_scores();
                self.source = DataSource::Fallback;
                self.error = None;
            }
            Err(error) => {
                self.entries = fallback_scores();
                self.source = DataSource::Fallback;
                self.error = Some(error);
            }
        }
    }

    /// Replaces the rows with a pushed snapshot. Snapshots for other games
    /// are ignored; returns whether anything changed.
    pub fn apply_snapshot(&mut self, game_name: &str, entries: &[ScoreEntry]) -> bool {
        if game_name != self.game_name {
            return false;
        }
        self.entries = entries.to_vec();
        self.source = DataSource::Realtime;
        true
    }

    pub fn note_score_update(&mut self, update: &ScoreUpdate, at: Instant) {
        if update.game_name == self.game_name {
            self.highlight = Some((update.player_name.clone(), update.score, at));
        }
    }

    /// The (player, score) pair to highlight, if the latest update is
    /// still fresh at `now`.
    pub fn highlight_at(&self, now: Instant) -> Option<(&str, i64)> {
        match &self.highlight {
            Some((player, score, at)) if now.duration_since(*at) < HIGHLIGHT_TTL => {
                Some((player.as_str(), *score))
            }
            _ => None,
        }
    }

    pub fn is_highlighted(&self, entry: &ScoreEntry, now: Instant) -> bool {
        self.highlight_at(now)
            .is_some_and(|(player, score)| entry.player_name == player && entry.score == score)
    }
}

/// Renders an optional combat stat; datasets without it show a dash.
pub fn optional_stat(value: Option<i64>) -> String {
    value.map_or_else(|| "-".to_string(), |stat| stat.to_string())
}
