use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Deserialize;
use tracing::error;

use crate::domain::errors::ScoreError;
use crate::interface_adapters::http::ErrorResponse;
use crate::interface_adapters::protocol::{
    FeedStatsResponse, GameStatsResponse, PageResponse, PlayerStatsResponse, ScoreResponse,
    StatusResponse, SubmitScoreBody,
};
use crate::interface_adapters::state::{AppState, FeedNotifier, SystemClock};
use crate::use_cases::queries::{DEFAULT_LEADERBOARD_SIZE, ScoreQueries};
use crate::use_cases::submit_score::{SubmitScoreRequest, SubmitScoreUseCase};

/// Window parameters arrive as raw strings so that unparsable values fall
/// back to the defaults instead of rejecting the request.
#[derive(Debug, Default, Deserialize)]
pub struct WindowParams {
    page: Option<String>,
    size: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct LimitParams {
    limit: Option<String>,
}

fn parse_param(raw: Option<String>) -> Option<i64> {
    raw.and_then(|value| value.parse().ok())
}

fn queries(state: &AppState) -> ScoreQueries {
    ScoreQueries::new(state.store.clone())
}

fn error_response(error: ScoreError) -> Response {
    let status = match &error {
        ScoreError::InvalidPlayerName | ScoreError::InvalidGameName | ScoreError::InvalidScore => {
            StatusCode::BAD_REQUEST
        }
        ScoreError::NotFound => StatusCode::NOT_FOUND,
        ScoreError::StorageFailure(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    let message = match &error {
        ScoreError::StorageFailure(detail) => {
            error!(%detail, "storage failure");
            "storage error".to_string()
        }
        other => other.to_string(),
    };
    (status, Json(ErrorResponse::new(message))).into_response()
}

pub async fn submit_score(
    State(state): State<AppState>,
    body: Result<Json<SubmitScoreBody>, JsonRejection>,
) -> Response {
    let Ok(Json(body)) = body else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid request body")),
        )
            .into_response();
    };
    let use_case = SubmitScoreUseCase::new(
        SystemClock,
        FeedNotifier::new(state.feed.clone()),
        state.store.clone(),
        DEFAULT_LEADERBOARD_SIZE,
    );
    let request = SubmitScoreRequest {
        player_name: body.player_name,
        game_name: body.game_name,
        score: body.score,
        achieved_at: body.achieved_at,
    };
    match use_case.execute(request).await {
        Ok(score) => (StatusCode::CREATED, Json(ScoreResponse::from(&score))).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn list_games(State(state): State<AppState>) -> Response {
    match queries(&state).games().await {
        Ok(games) => Json(games).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn list_players(State(state): State<AppState>) -> Response {
    match queries(&state).players().await {
        Ok(players) => Json(players).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn score_by_id(State(state): State<AppState>, Path(raw_id): Path<String>) -> Response {
    let Ok(id) = raw_id.parse::<i64>() else {
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse::new("invalid score id")),
        )
            .into_response();
    };
    match queries(&state).score_by_id(id).await {
        Ok(score) => Json(ScoreResponse::from(&score)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn top_scores(
    State(state): State<AppState>,
    Path(game_name): Path<String>,
    Query(params): Query<LimitParams>,
) -> Response {
    match queries(&state)
        .top_scores(&game_name, parse_param(params.limit))
        .await
    {
        Ok(scores) => {
            Json(scores.iter().map(ScoreResponse::from).collect::<Vec<_>>()).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub async fn game_scores(
    State(state): State<AppState>,
    Path(game_name): Path<String>,
    Query(params): Query<WindowParams>,
) -> Response {
    match queries(&state)
        .game_scores(&game_name, parse_param(params.page), parse_param(params.size))
        .await
    {
        Ok((scores, meta)) => Json(PageResponse::new(&scores, meta)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn game_stats(State(state): State<AppState>, Path(game_name): Path<String>) -> Response {
    match queries(&state).game_stats(&game_name).await {
        Ok(stats) => Json(GameStatsResponse::from(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn player_scores(
    State(state): State<AppState>,
    Path(player_name): Path<String>,
    Query(params): Query<WindowParams>,
) -> Response {
    match queries(&state)
        .player_scores(&player_name, parse_param(params.page), parse_param(params.size))
        .await
    {
        Ok((scores, meta)) => Json(PageResponse::new(&scores, meta)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn player_stats(
    State(state): State<AppState>,
    Path(player_name): Path<String>,
) -> Response {
    match queries(&state).player_stats(&player_name).await {
        Ok(stats) => Json(PlayerStatsResponse::from(stats)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn player_game_scores(
    State(state): State<AppState>,
    Path((game_name, player_name)): Path<(String, String)>,
) -> Response {
    match queries(&state)
        .player_game_scores(&player_name, &game_name)
        .await
    {
        Ok(scores) => {
            Json(scores.iter().map(ScoreResponse::from).collect::<Vec<_>>()).into_response()
        }
        Err(error) => error_response(error),
    }
}

pub async fn player_high_score(
    State(state): State<AppState>,
    Path((game_name, player_name)): Path<(String, String)>,
) -> Response {
    match queries(&state)
        .player_high_score(&player_name, &game_name)
        .await
    {
        Ok(score) => Json(ScoreResponse::from(&score)).into_response(),
        Err(error) => error_response(error),
    }
}

pub async fn health() -> Json<StatusResponse> {
    Json(StatusResponse {
        status: "UP".to_string(),
    })
}

pub async fn health_ready(State(state): State<AppState>) -> Response {
    match state.store.ping().await {
        Ok(()) => Json(StatusResponse {
            status: "UP".to_string(),
        })
        .into_response(),
        Err(error) => {
            error!(%error, "readiness probe failed");
            (
                StatusCode::SERVICE_UNAVAILABLE,
                Json(StatusResponse {
                    status: "DOWN".to_string(),
                }),
            )
                .into_response()
        }
    }
}

pub async fn feed_stats(State(state): State<AppState>) -> Json<FeedStatsResponse> {
    Json(FeedStatsResponse::from(state.feed.stats().await))
}
