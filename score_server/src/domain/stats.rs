use std::collections::BTreeSet;

use super::score::Score;

/// Aggregates for one game across every player who scored in it.
#[derive(Debug, Clone, PartialEq)]
pub struct GameStats {
    pub game_name: String,
    pub total_players: i64,
    pub total_scores: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub top_player: String,
}

/// Aggregates for one player across every game they scored in.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerStats {
    pub player_name: String,
    pub total_games: i64,
    pub total_score: i64,
    pub average_score: f64,
    pub highest_score: i64,
    pub games_played: Vec<String>,
}

/// `scores` holds every entry recorded for `game_name`. An unknown game
/// yields zeroed aggregates with an empty top player rather than an error.
pub fn compute_game_stats(game_name: &str, scores: &[&Score]) -> GameStats {
    let total_scores = scores.len() as i64;
    let total_players = scores
        .iter()
        .map(|s| s.player_name.as_str())
        .collect::<BTreeSet<_>>()
        .len() as i64;
    let total: i64 = scores.iter().map(|s| s.score).sum();
    let average_score = if total_scores == 0 {
        0.0
    } else {
        total as f64 / total_scores as f64
    };
    let top = scores.iter().max_by_key(|s| s.score);
    GameStats {
        game_name: game_name.to_string(),
        total_players,
        total_scores,
        average_score,
        highest_score: top.map(|s| s.score).unwrap_or(0),
        top_player: top.map(|s| s.player_name.clone()).unwrap_or_default(),
    }
}

/// `scores` holds every entry recorded for `player_name`. Games are listed
/// in lexicographic order so repeated calls agree.
pub fn compute_player_stats(player_name: &str, scores: &[&Score]) -> PlayerStats {
    let total_games = scores.len() as i64;
    let total_score: i64 = scores.iter().map(|s| s.score).sum();
    let average_score = if total_games == 0 {
        0.0
    } else {
        total_score as f64 / total_games as f64
    };
    let games_played: Vec<String> = scores
        .iter()
        .map(|s| s.game_name.clone())
        .collect::<BTreeSet<_>>()
        .into_iter()
        .collect();
    PlayerStats {
        player_name: player_name.to_string(),
        total_games,
        total_score,
        average_score,
        highest_score: scores.iter().map(|s| s.score).max().unwrap_or(0),
        games_played,
    }
}
