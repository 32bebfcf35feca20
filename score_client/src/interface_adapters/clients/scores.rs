use std::fmt;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

use crate::domain::score::ScoreEntry;

/// Typed client for the score REST API.
pub struct ScoreQueryClient {
    http: reqwest::Client,
    base_url: String,
}

#[derive(Debug)]
pub enum QueryError {
    /// The request never completed: connect, timeout, or transport error.
    Transport(reqwest::Error),
    /// The API answered with a non-success status.
    Upstream { status: u16, message: Option<String> },
    /// The API answered 2xx but the body was not the expected shape.
    Decode(reqwest::Error),
}

impl fmt::Display for QueryError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transport(error) => write!(f, "score api unreachable: {error}"),
            Self::Upstream {
                status,
                message: Some(message),
            } => write!(f, "score api rejected the request ({status}): {message}"),
            Self::Upstream {
                status,
                message: None,
            } => write!(f, "score api rejected the request ({status})"),
            Self::Decode(error) => write!(f, "score api sent an unexpected body: {error}"),
        }
    }
}

impl std::error::Error for QueryError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Transport(error) | Self::Decode(error) => Some(error),
            Self::Upstream { .. } => None,
        }
    }
}

fn from_reqwest(error: reqwest::Error) -> QueryError {
    if error.is_decode() {
        QueryError::Decode(error)
    } else {
        QueryError::Transport(error)
    }
}

/// One page of scores, as served by the paged listing endpoints.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScorePage {
    pub content: Vec<ScoreEntry>,
    pub page: i64,
    pub size: i64,
    pub total_elements: i64,
    pub total_pages: i64,
    pub first: bool,
    pub last: bool,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameStats {
    pub game_name: String,
    pub total_players: i64,
    pub total_scores: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub top_player: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PlayerStats {
    pub player_name: String,
    pub total_games: i64,
    pub total_score: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub games_played: Vec<String>,
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SubmitScore {
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub achieved_at: Option<String>,
}

#[derive(Deserialize)]
struct ErrorBody {
    error: String,
}

impl ScoreQueryClient {
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, reqwest::Error> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            base_url: base_url.into(),
        })
    }

    pub async fn games(&self) -> Result<Vec<String>, QueryError> {
        self.get_json("/api/scores/games".to_string()).await
    }

    pub async fn players(&self) -> Result<Vec<String>, QueryError> {
        self.get_json("/api/scores/players".to_string()).await
    }

    pub async fn score_by_id(&self, id: i64) -> Result<ScoreEntry, QueryError> {
        self.get_json(format!("/api/scores/{id}")).await
    }

    pub async fn top_scores(&self, game: &str, limit: i64) -> Result<Vec<ScoreEntry>, QueryError> {
        self.get_json(format!("/api/scores/game/{game}/top?limit={limit}"))
            .await
    }

    pub async fn game_scores(
        &self,
        game: &str,
        page: i64,
        size: i64,
    ) -> Result<ScorePage, QueryError> {
        self.get_json(format!("/api/scores/game/{game}?page={page}&size={size}"))
            .await
    }

    pub async fn player_scores(
        &self,
        player: &str,
        page: i64,
        size: i64,
    ) -> Result<ScorePage, QueryError> {
        self.get_json(format!("/api/scores/player/{player}?page={page}&size={size}"))
            .await
    }

    pub async fn game_stats(&self, game: &str) -> Result<GameStats, QueryError> {
        self.get_json(format!("/api/scores/game/{game}/stats")).await
    }

    pub async fn player_stats(&self, player: &str) -> Result<PlayerStats, QueryError> {
        self.get_json(format!("/api/scores/player/{player}/stats"))
            .await
    }

    pub async fn player_game_scores(
        &self,
        game: &str,
        player: &str,
    ) -> Result<Vec<ScoreEntry>, QueryError> {
        self.get_json(format!("/api/scores/game/{game}/player/{player}"))
            .await
    }

    pub async fn player_high_score(
        &self,
        game: &str,
        player: &str,
    ) -> Result<ScoreEntry, QueryError> {
        self.get_json(format!("/api/scores/game/{game}/player/{player}/high"))
            .await
    }

    pub async fn submit(&self, request: &SubmitScore) -> Result<ScoreEntry, QueryError> {
        let response = self
            .http
            .post(format!("{}/api/scores/submit", self.base_url))
            .json(request)
            .send()
            .await
            .map_err(from_reqwest)?;
        Self::decode(response).await
    }

    async fn get_json<T: DeserializeOwned>(&self, path: String) -> Result<T, QueryError> {
        let response = self
            .http
            .get(format!("{}{path}", self.base_url))
            .send()
            .await
            .map_err(from_reqwest)?;
        Self::decode(response).await
    }

    async fn decode<T: DeserializeOwned>(response: reqwest::Response) -> Result<T, QueryError> {
        if !response.status().is_success() {
            let status = response.status().as_u16();
            let message = response
                .json::<ErrorBody>()
                .await
                .ok()
                .map(|body| body.error);
            return Err(QueryError::Upstream { status, message });
        }
        response.json().await.map_err(from_reqwest)
    }
}
