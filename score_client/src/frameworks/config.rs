use std::env;
use std::time::Duration;

use url::Url;

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8081";
pub const DEFAULT_FEED_URL: &str = "ws://127.0.0.1:8081/ws";
pub const DEFAULT_WATCH_GAME: &str = "Operation Nightfall";
pub const DEFAULT_QUERY_TIMEOUT_MS: u64 = 5_000;

pub fn api_base_url() -> String {
    env::var("SCORE_API_URL").unwrap_or_else(|_| DEFAULT_API_URL.to_string())
}

/// Validated at startup so a typo fails fast instead of looping through
/// reconnect attempts.
pub fn feed_url() -> Result<Url, url::ParseError> {
    let raw = env::var("SCORE_FEED_URL").unwrap_or_else(|_| DEFAULT_FEED_URL.to_string());
    Url::parse(&raw)
}

pub fn watch_game() -> String {
    env::var("WATCH_GAME").unwrap_or_else(|_| DEFAULT_WATCH_GAME.to_string())
}

pub fn query_timeout() -> Duration {
    let millis = env::var("SCORE_QUERY_TIMEOUT_MS")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_QUERY_TIMEOUT_MS);
    Duration::from_millis(millis)
}
