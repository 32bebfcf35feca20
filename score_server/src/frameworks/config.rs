use std::env;

pub const DEFAULT_HTTP_PORT: u16 = 8081;
pub const DEFAULT_CORS_ORIGINS: &str = "http://localhost:3000,http://localhost:5173";

/// Capacity of the broadcast channel behind the push feed. Subscribers that
/// fall further behind than this start dropping frames.
pub const FEED_CHANNEL_CAPACITY: usize = 256;

pub fn http_port() -> u16 {
    env::var("SCORE_SERVER_PORT")
        .ok()
        .and_then(|raw| raw.parse().ok())
        .unwrap_or(DEFAULT_HTTP_PORT)
}

/// When unset the server runs on the seeded in-memory store.
pub fn database_url() -> Option<String> {
    env::var("DATABASE_URL").ok().filter(|url| !url.is_empty())
}

pub fn cors_allowed_origins() -> Vec<String> {
    env::var("CORS_ALLOWED_ORIGINS")
        .unwrap_or_else(|_| DEFAULT_CORS_ORIGINS.to_string())
        .split(',')
        .map(|origin| origin.trim().to_string())
        .filter(|origin| !origin.is_empty())
        .collect()
}
