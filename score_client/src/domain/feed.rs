use std::collections::{BTreeSet, HashMap};

use super::score::{ScoreEntry, ScoreUpdate};

/// Where the push channel currently stands. `Error` means the last connect
/// attempt failed; `Disconnected` means an established session ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Connected,
    Disconnected,
    Error,
}

/// A decoded push event, independent of the wire envelope.
#[derive(Debug, Clone, PartialEq)]
pub enum FeedEvent {
    Connected {
        client_id: String,
        games: Vec<String>,
    },
    Score(ScoreUpdate),
    Leaderboard {
        game_name: String,
        top_scores: Vec<ScoreEntry>,
    },
    ServerError {
        code: String,
        message: String,
    },
    Heartbeat,
}

/// What applying an event changed, so the caller can schedule follow-up
/// work such as clearing a surfaced error.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Applied {
    Updated,
    ErrorSurfaced,
    Heartbeat,
}

/// Everything the feed has told us so far. Pure data; the registry task
/// owns one of these and publishes clones to watchers.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FeedState {
    pub client_id: Option<String>,
    pub available_games: Vec<String>,
    pub subscribed: BTreeSet<String>,
    pub snapshots: HashMap<String, Vec<ScoreEntry>>,
    pub latest_update: Option<ScoreUpdate>,
    pub last_error: Option<String>,
}

impl FeedState {
    /// Returns true when the game was not subscribed before.
    pub fn subscribe(&mut self, game: &str) -> bool {
        self.subscribed.insert(game.to_string())
    }

    /// Returns true when the game was actually subscribed.
    pub fn unsubscribe(&mut self, game: &str) -> bool {
        self.subscribed.remove(game)
    }

    pub fn apply(&mut self, event: FeedEvent) -> Applied {
        match event {
            FeedEvent::Connected { client_id, games } => {
                self.client_id = Some(client_id);
                self.available_games = games;
                Applied::Updated
            }
            FeedEvent::Score(update) => {
                self.latest_update = Some(update);
                Applied::Updated
            }
            FeedEvent::Leaderboard {
                game_name,
                top_scores,
            } => {
                self.snapshots.insert(game_name, top_scores);
                Applied::Updated
            }
            FeedEvent::ServerError { code, message } => {
                self.last_error = Some(format!("{code}: {message}"));
                Applied::ErrorSurfaced
            }
            FeedEvent::Heartbeat => Applied::Heartbeat,
        }
    }

    pub fn clear_error(&mut self) {
        self.last_error = None;
    }

    pub fn snapshot(&self, game: &str) -> Option<&[ScoreEntry]> {
        self.snapshots.get(game).map(Vec::as_slice)
    }
}
