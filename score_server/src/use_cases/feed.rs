use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::ws::Utf8Bytes;
use tokio::sync::{RwLock, broadcast};

/// A push frame tagged with the game it belongs to. Frames are serialized
/// once by the publisher and shared across every subscriber.
#[derive(Debug, Clone)]
pub struct FeedFrame {
    pub game: Arc<str>,
    pub frame: Utf8Bytes,
}

#[derive(Debug, Clone, PartialEq)]
pub struct FeedStats {
    pub connected_clients: usize,
    pub active_games: usize,
}

/// Fan-out hub for live score traffic. Connection handlers subscribe to the
/// broadcast channel and filter frames against their own game set; the hub
/// tracks connection and subscription counts for the stats endpoint.
pub struct ScoreFeed {
    events: broadcast::Sender<FeedFrame>,
    connected: AtomicUsize,
    games: RwLock<HashMap<String, usize>>,
}

impl ScoreFeed {
    pub fn new(capacity: usize) -> Self {
        let (events, _) = broadcast::channel(capacity);
        Self {
            events,
            connected: AtomicUsize::new(0),
            games: RwLock::new(HashMap::new()),
        }
    }

    pub fn subscribe_events(&self) -> broadcast::Receiver<FeedFrame> {
        self.events.subscribe()
    }

    /// Sending fails only when no client is connected, which is not an error.
    pub fn publish(&self, game: Arc<str>, frame: Utf8Bytes) {
        let _ = self.events.send(FeedFrame { game, frame });
    }

    pub fn client_connected(&self) -> usize {
        self.connected.fetch_add(1, Ordering::Relaxed) + 1
    }

    pub fn client_disconnected(&self) -> usize {
        self.connected.fetch_sub(1, Ordering::Relaxed).saturating_sub(1)
    }

    /// A game is active while at least one client is subscribed to it.
    pub async fn track_subscription(&self, game: &str) {
        let mut games = self.games.write().await;
        *games.entry(game.to_string()).or_insert(0) += 1;
    }

    pub async fn drop_subscription(&self, game: &str) {
        let mut games = self.games.write().await;
        if let Some(count) = games.get_mut(game) {
            *count -= 1;
            if *count == 0 {
                games.remove(game);
            }
        }
    }

    pub async fn stats(&self) -> FeedStats {
        FeedStats {
            connected_clients: self.connected.load(Ordering::Relaxed),
            active_games: self.games.read().await.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn when_subscribers_come_and_go_then_active_games_follow() {
        let feed = ScoreFeed::new(8);
        feed.track_subscription("Operation Nightfall").await;
        feed.track_subscription("Operation Nightfall").await;
        feed.track_subscription("Shadow Protocol").await;
        assert_eq!(feed.stats().await.active_games, 2);

        feed.drop_subscription("Operation Nightfall").await;
        assert_eq!(feed.stats().await.active_games, 2);
        feed.drop_subscription("Operation Nightfall").await;
        assert_eq!(feed.stats().await.active_games, 1);
    }

    #[tokio::test]
    async fn when_frame_published_then_subscriber_receives_it() {
        let feed = ScoreFeed::new(8);
        let mut events = feed.subscribe_events();
        feed.publish(
            Arc::from("Operation Nightfall"),
            Utf8Bytes::from(String::from("{\"type\":\"SCORE_UPDATE\"}")),
        );
        let frame = events.recv().await.unwrap();
        assert_eq!(&*frame.game, "Operation Nightfall");
        assert!(frame.frame.as_str().contains("SCORE_UPDATE"));
    }

    #[tokio::test]
    async fn when_nobody_listens_then_publish_is_a_no_op() {
        let feed = ScoreFeed::new(8);
        feed.publish(Arc::from("Operation Nightfall"), Utf8Bytes::from(String::new()));
        assert_eq!(feed.stats().await.connected_clients, 0);
    }

    #[tokio::test]
    async fn when_clients_connect_then_count_tracks_them() {
        let feed = ScoreFeed::new(8);
        assert_eq!(feed.client_connected(), 1);
        assert_eq!(feed.client_connected(), 2);
        assert_eq!(feed.client_disconnected(), 1);
        assert_eq!(feed.stats().await.connected_clients, 1);
    }
}
