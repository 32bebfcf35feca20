use chrono::{DateTime, SecondsFormat, Utc};
use serde::{Deserialize, Serialize};

use crate::domain::paging::PageMeta;
use crate::domain::score::Score;
use crate::domain::stats::{GameStats, PlayerStats};
use crate::use_cases::feed::FeedStats;

pub const ERR_PARSE: &str = "PARSE_ERROR";
pub const ERR_INVALID_GAME: &str = "INVALID_GAME";

pub fn format_timestamp(at: DateTime<Utc>) -> String {
    at.to_rfc3339_opts(SecondsFormat::Secs, true)
}

// REST shapes.

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreResponse {
    pub id: i64,
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    pub achieved_at: String,
    pub created_at: String,
}

impl From<&Score> for ScoreResponse {
    fn from(score: &Score) -> Self {
        Self {
            id: score.id,
            player_name: score.player_name.clone(),
            game_name: score.game_name.clone(),
            score: score.score,
            achieved_at: format_timestamp(score.achieved_at),
            created_at: format_timestamp(score.created_at),
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScoreBody {
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    #[serde(default)]
    pub achieved_at: Option<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageResponse {
    pub content: Vec<ScoreResponse>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

impl PageResponse {
    pub fn new(scores: &[Score], meta: PageMeta) -> Self {
        Self {
            content: scores.iter().map(ScoreResponse::from).collect(),
            page: meta.page,
            size: meta.size,
            total_elements: meta.total_elements,
            total_pages: meta.total_pages,
            first: meta.first,
            last: meta.last,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStatsResponse {
    pub game_name: String,
    pub total_players: i64,
    pub total_scores: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub top_player: String,
}

impl From<GameStats> for GameStatsResponse {
    fn from(stats: GameStats) -> Self {
        Self {
            game_name: stats.game_name,
            total_players: stats.total_players,
            total_scores: stats.total_scores,
            average_score: stats.average_score,
            highest_score: stats.highest_score,
            top_player: stats.top_player,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStatsResponse {
    pub player_name: String,
    pub total_games: i64,
    pub total_score: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub games_played: Vec<String>,
}

impl From<PlayerStats> for PlayerStatsResponse {
    fn from(stats: PlayerStats) -> Self {
        Self {
            player_name: stats.player_name,
            total_games: stats.total_games,
            total_score: stats.total_score,
            average_score: stats.average_score,
            highest_score: stats.highest_score,
            games_played: stats.games_played,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FeedStatsResponse {
    pub connected_clients: usize,
    pub active_games: usize,
}

impl From<FeedStats> for FeedStatsResponse {
    fn from(stats: FeedStats) -> Self {
        Self {
            connected_clients: stats.connected_clients,
            active_games: stats.active_games,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
}

// Push channel shapes. Every frame is a flat envelope carrying the message
// type, an optional payload, and an RFC 3339 timestamp.

#[derive(Debug, Serialize)]
pub struct ServerEnvelope {
    #[serde(flatten)]
    pub message: ServerMessage,
    pub timestamp: String,
}

impl ServerEnvelope {
    pub fn now(message: ServerMessage) -> Self {
        Self {
            message,
            timestamp: format_timestamp(Utc::now()),
        }
    }

    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}

#[derive(Debug, Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ServerMessage {
    Connected(ConnectedPayload),
    ScoreUpdate(ScoreUpdatePayload),
    LeaderboardUpdate(LeaderboardPayload),
    Error(ErrorPayload),
    Pong,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConnectedPayload {
    pub client_id: String,
    pub games: Vec<String>,
}

/// Pushed for a single accepted score. Unlike [`ScoreResponse`] this omits
/// the storage timestamp, which live subscribers have no use for.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdatePayload {
    pub id: i64,
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    pub achieved_at: String,
}

impl From<&Score> for ScoreUpdatePayload {
    fn from(score: &Score) -> Self {
        Self {
            id: score.id,
            player_name: score.player_name.clone(),
            game_name: score.game_name.clone(),
            score: score.score,
            achieved_at: format_timestamp(score.achieved_at),
        }
    }
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LeaderboardPayload {
    pub game_name: String,
    pub top_scores: Vec<ScoreResponse>,
}

#[derive(Debug, Serialize)]
pub struct ErrorPayload {
    pub code: String,
    pub message: String,
}

#[derive(Debug, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientMessage {
    Subscribe(SubscribePayload),
    Unsubscribe(SubscribePayload),
    Ping,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SubscribePayload {
    #[serde(default)]
    pub game_name: String,
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn when_score_update_serialized_then_envelope_is_flat() {
        let envelope = ServerEnvelope {
            message: ServerMessage::ScoreUpdate(ScoreUpdatePayload {
                id: 7,
                player_name: "GhostReaper".to_string(),
                game_name: "Operation Nightfall".to_string(),
                score: 145_820,
                achieved_at: "2024-06-01T12:00:00Z".to_string(),
            }),
            timestamp: "2024-06-01T12:00:01Z".to_string(),
        };

        let frame: Value = serde_json::from_str(&envelope.to_frame().unwrap()).unwrap();

        assert_eq!(frame["type"], "SCORE_UPDATE");
        assert_eq!(frame["payload"]["playerName"], "GhostReaper");
        assert_eq!(frame["payload"]["score"], 145_820);
        assert_eq!(frame["timestamp"], "2024-06-01T12:00:01Z");
        assert!(frame["payload"].get("createdAt").is_none());
    }

    #[test]
    fn when_pong_serialized_then_payload_omitted() {
        let envelope = ServerEnvelope {
            message: ServerMessage::Pong,
            timestamp: "2024-06-01T12:00:01Z".to_string(),
        };

        let frame: Value = serde_json::from_str(&envelope.to_frame().unwrap()).unwrap();

        assert_eq!(frame["type"], "PONG");
        assert!(frame.get("payload").is_none());
    }

    #[test]
    fn when_subscribe_frame_received_then_game_extracted() {
        let raw = r#"{"type":"SUBSCRIBE","payload":{"gameName":"Operation Nightfall"},"timestamp":"2024-06-01T12:00:00Z"}"#;

        let message: ClientMessage = serde_json::from_str(raw).unwrap();

        match message {
            ClientMessage::Subscribe(payload) => {
                assert_eq!(payload.game_name, "Operation Nightfall");
            }
            other => panic!("unexpected message: {other:?}"),
        }
    }

    #[test]
    fn when_ping_has_no_payload_then_it_still_parses() {
        let raw = r#"{"type":"PING","timestamp":"2024-06-01T12:00:00Z"}"#;

        let message: ClientMessage = serde_json::from_str(raw).unwrap();

        assert!(matches!(message, ClientMessage::Ping));
    }

    #[test]
    fn when_type_unknown_then_parse_fails() {
        let raw = r#"{"type":"TELEPORT","payload":{}}"#;

        assert!(serde_json::from_str::<ClientMessage>(raw).is_err());
    }

    #[test]
    fn when_subscribe_payload_empty_then_game_defaults_to_blank() {
        let raw = r#"{"type":"SUBSCRIBE","payload":{}}"#;

        let message: ClientMessage = serde_json::from_str(raw).unwrap();

        match message {
            ClientMessage::Subscribe(payload) => assert!(payload.game_name.is_empty()),
            other => panic!("unexpected message: {other:?}"),
        }
    }
}
