use serde::Deserialize;

/// One leaderboard row as served by the score API. Timestamps stay as the
/// wire strings since the board never does date arithmetic. Combat stats
/// are only present in datasets that track them; rendering shows a
/// placeholder when they are absent.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreEntry {
    pub id: i64,
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    #[serde(default)]
    pub achieved_at: Option<String>,
    #[serde(default)]
    pub created_at: Option<String>,
    #[serde(default)]
    pub kills: Option<i64>,
    #[serde(default)]
    pub wins: Option<i64>,
}

/// A single pushed score. Carries less than a full row: the feed omits
/// bookkeeping fields on the hot path.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ScoreUpdate {
    pub id: i64,
    pub player_name: String,
    pub game_name: String,
    pub score: i64,
    #[serde(default)]
    pub achieved_at: Option<String>,
}
