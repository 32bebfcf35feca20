use chrono::{SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::feed::FeedEvent;
use crate::domain::score::{ScoreEntry, ScoreUpdate};

/// Inbound feed frame. The envelope's own timestamp is informational and
/// ignored; a frame with an unknown type fails to decode.
#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Connected(ConnectedPayload),
    ScoreUpdate(ScoreUpdate),
    LeaderboardUpdate(LeaderboardPayload),
    Error(ErrorPayload),
    Pong,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub client_id: String,
    #[serde(default)]
    pub games: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPayload {
    pub game_name: String,
    #[serde(default)]
    pub top_scores: Vec<ScoreEntry>,
}

#[derive(Debug, Deserialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

pub fn decode_frame(raw: &str) -> Result<ServerMessage, serde_json::Error> {
    serde_json::from_str(raw)
}

impl From<ServerMessage> for FeedEvent {
    fn from(message: ServerMessage) -> Self {
        match message {
            ServerMessage::Connected(payload) => FeedEvent::Connected {
                client_id: payload.client_id,
                games: payload.games,
            },
            ServerMessage::ScoreUpdate(update) => FeedEvent::Score(update),
            ServerMessage::LeaderboardUpdate(payload) => FeedEvent::Leaderboard {
                game_name: payload.game_name,
                top_scores: payload.top_scores,
            },
            ServerMessage::Error(payload) => FeedEvent::ServerError {
                code: payload.code,
                message: payload.message,
            },
            ServerMessage::Pong => FeedEvent::Heartbeat,
        }
    }
}

/// Outbound feed frame. Every frame is stamped when it is built.
#[derive(Debug, Serialize)]
pub struct OutboundEnvelope {
    #[serde(flatten)]
    pub message: ClientMessage,
    pub timestamp: String,
}

impl OutboundEnvelope {
    pub fn new(message: ClientMessage) -> Self {
        Self {
            message,
            timestamp: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
        }
    }

    pub fn encode(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Subscribe(SubscribePayload),
    Unsubscribe(SubscribePayload),
    Ping,
}

impl ClientMessage {
    pub fn subscribe(game: impl Into<String>) -> Self {
        Self::Subscribe(SubscribePayload {
            game_name: game.into(),
        })
    }

    pub fn unsubscribe(game: impl Into<String>) -> Self {
        Self::Unsubscribe(SubscribePayload {
            game_name: game.into(),
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    pub game_name: String,
}
