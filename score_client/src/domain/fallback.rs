use super::score::ScoreEntry;

/// Canned Operation Nightfall standings shown when the score API cannot be
/// reached, so the board is never blank.
pub fn fallback_scores() -> Vec<ScoreEntry> {
    let mut next_id = 0;
    let mut entry = |player: &str, score: i64, kills: i64, wins: i64| {
        next_id += 1;
        ScoreEntry {
            id: next_id,
            player_name: player.to_string(),
            game_name: "Operation Nightfall".to_string(),
            score,
            achieved_at: None,
            created_at: None,
            kills: Some(kills),
            wins: Some(wins),
        }
    };

    vec![
        entry("GhostReaper", 145_820, 2_847, 156),
        entry("ShadowSniper", 142_150, 2_756, 149),
        entry("PhantomElite", 138_490, 2_698, 145),
        entry("ViperStrike", 135_280, 2_634, 141),
        entry("StealthNinja", 132_760, 2_589, 138),
        entry("TacticalWolf", 129_450, 2_523, 134),
        entry("NightHawk47", 126_890, 2_478, 131),
        entry("DeltaForce", 124_320, 2_431, 128),
        entry("ApexPredator", 121_750, 2_384, 125),
        entry("WarMachine", 119_180, 2_337, 122),
    ]
}
