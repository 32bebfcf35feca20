use std::net::SocketAddr;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

use axum::Router;
use axum::extract::ws::{Message, WebSocket};
use axum::extract::{State, WebSocketUpgrade};
use axum::response::Response;
use axum::routing::any;
use tokio::sync::{Notify, broadcast};
use url::Url;

/// In-process stand-in for the score feed. Records every frame it
/// receives, grouped per connection, and can push frames or drop all live
/// connections on demand.
pub struct FeedStub {
    addr: SocketAddr,
    state: Arc<StubState>,
}

struct StubState {
    // One Vec of received frames per accepted connection, oldest first.
    connections: Mutex<Vec<Vec<String>>>,
    kill: Notify,
    push: broadcast::Sender<String>,
}

pub async fn spawn_feed_stub() -> FeedStub {
    let (push, _) = broadcast::channel(32);
    let state = Arc::new(StubState {
        connections: Mutex::new(Vec::new()),
        kill: Notify::new(),
        push,
    });
    let app = Router::new()
        .route("/ws", any(stub_ws))
        .with_state(state.clone());
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, app).await.unwrap();
    });
    FeedStub { addr, state }
}

impl FeedStub {
    pub fn url(&self) -> Url {
        Url::parse(&format!("ws://{}/ws", self.addr)).unwrap()
    }

    /// Broadcasts a frame to every live connection.
    pub fn push(&self, frame: serde_json::Value) {
        self.push_raw(frame.to_string());
    }

    pub fn push_raw(&self, frame: String) {
        let _ = self.state.push.send(frame);
    }

    /// Drops every live connection without a close handshake.
    pub fn kill_connections(&self) {
        self.state.kill.notify_waiters();
    }

    pub fn connection_count(&self) -> usize {
        self.state.connections.lock().unwrap().len()
    }

    pub fn frames_for(&self, connection: usize) -> Vec<String> {
        self.state.connections.lock().unwrap()[connection].clone()
    }
}

async fn stub_ws(ws: WebSocketUpgrade, State(state): State<Arc<StubState>>) -> Response {
    ws.on_upgrade(move |socket| drive_stub(socket, state))
}

async fn drive_stub(mut socket: WebSocket, state: Arc<StubState>) {
    let connection = {
        let mut connections = state.connections.lock().unwrap();
        connections.push(Vec::new());
        connections.len() - 1
    };

    // Subscribe before greeting so a frame pushed as soon as the client
    // sees the greeting cannot be missed.
    let mut push = state.push.subscribe();

    // Greet the way the real feed does.
    let greeting = serde_json::json!({
        "type": "CONNECTED",
        "payload": {
            "clientId": format!("stub-{connection}"),
            "games": ["Operation Nightfall", "Shadow Protocol"],
        },
        "timestamp": "2024-06-01T12:00:00Z",
    });
    if socket
        .send(Message::Text(greeting.to_string().into()))
        .await
        .is_err()
    {
        return;
    }
    loop {
        tokio::select! {
            frame = socket.recv() => match frame {
                Some(Ok(Message::Text(text))) => {
                    state.connections.lock().unwrap()[connection].push(text.as_str().to_string());
                }
                Some(Ok(Message::Close(_))) | None => return,
                Some(Ok(_)) => {}
                Some(Err(_)) => return,
            },
            pushed = push.recv() => {
                if let Ok(frame) = pushed {
                    if socket.send(Message::Text(frame.into())).await.is_err() {
                        return;
                    }
                }
            }
            _ = state.kill.notified() => {
                // Returning drops the socket mid-session; clients must
                // treat this as a lost connection.
                return;
            }
        }
    }
}

/// Polls `condition` until it holds or the timeout passes.
pub async fn wait_for(condition: impl Fn() -> bool, timeout: Duration, what: &str) {
    let deadline = Instant::now() + timeout;
    while Instant::now() < deadline {
        if condition() {
            return;
        }
        tokio::time::sleep(Duration::from_millis(25)).await;
    }
    panic!("timed out waiting for {what}");
}
