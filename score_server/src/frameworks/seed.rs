use chrono::{DateTime, Duration, Utc};

use crate::domain::score::Score;

/// Demo dataset loaded into the in-memory store so a fresh server has a
/// populated leaderboard. Timestamps are staggered backwards from `now`.
pub fn demo_scores(now: DateTime<Utc>) -> Vec<Score> {
    let mut id = 0;
    let mut hours_ago = 25;
    let mut entry = |player: &str, game: &str, score: i64| {
        id += 1;
        hours_ago -= 1;
        Score {
            id,
            player_name: player.to_string(),
            game_name: game.to_string(),
            score,
            achieved_at: now - Duration::hours(hours_ago),
            created_at: now,
        }
    };
    vec![
        entry("GhostReaper", "Operation Nightfall", 145_820),
        entry("ShadowSniper", "Operation Nightfall", 142_150),
        entry("PhantomElite", "Operation Nightfall", 138_490),
        entry("ViperStrike", "Operation Nightfall", 135_280),
        entry("StealthNinja", "Operation Nightfall", 132_760),
        entry("TacticalWolf", "Operation Nightfall", 129_450),
        entry("NightHawk47", "Operation Nightfall", 126_890),
        entry("DeltaForce", "Operation Nightfall", 124_320),
        entry("ApexPredator", "Operation Nightfall", 121_750),
        entry("WarMachine", "Operation Nightfall", 119_180),
        entry("GhostReaper", "Shadow Protocol", 98_500),
        entry("ShadowSniper", "Shadow Protocol", 95_200),
        entry("PhantomElite", "Shadow Protocol", 91_800),
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn when_seeded_then_nightfall_has_a_full_leaderboard() {
        let scores = demo_scores(Utc::now());
        let nightfall: Vec<_> = scores
            .iter()
            .filter(|s| s.game_name == "Operation Nightfall")
            .collect();
        assert_eq!(nightfall.len(), 10);
        assert_eq!(nightfall[0].player_name, "GhostReaper");
        assert!(nightfall.windows(2).all(|pair| pair[0].score > pair[1].score));
    }

    #[test]
    fn when_seeded_then_ids_unique_and_dense() {
        let scores = demo_scores(Utc::now());
        let ids: Vec<i64> = scores.iter().map(|s| s.id).collect();
        assert_eq!(ids, (1..=13).collect::<Vec<i64>>());
    }
}
