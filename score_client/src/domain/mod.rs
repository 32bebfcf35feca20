pub mod fallback;
pub mod feed;
pub mod leaderboard;
pub mod reconnect;
pub mod score;
