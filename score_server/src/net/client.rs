use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::{Duration, Instant};

use axum::extract::ws::{CloseFrame, Message, Utf8Bytes, WebSocket, WebSocketUpgrade, close_code};
use axum::extract::{ConnectInfo, State};
use axum::response::Response;
use futures_util::sink::SinkExt;
use futures_util::stream::{SplitSink, StreamExt};
use tokio::sync::broadcast::error::RecvError;
use tracing::{info, warn};
use uuid::Uuid;

use crate::interface_adapters::protocol::{
    ClientMessage, ConnectedPayload, ERR_INVALID_GAME, ERR_PARSE, ErrorPayload, ServerEnvelope,
    ServerMessage,
};
use crate::interface_adapters::state::AppState;

/// Clients sending garbage beyond this many frames are cut off.
const MAX_INVALID_FRAMES: usize = 10;
const LOG_THROTTLE: Duration = Duration::from_secs(2);

struct ConnCtx {
    client_id: String,
    subscriptions: HashSet<String>,
    invalid_frames: usize,
    last_warn: Option<Instant>,
}

enum LoopControl {
    Continue,
    Disconnect,
}

pub async fn ws_handler(
    ws: WebSocketUpgrade,
    State(state): State<AppState>,
    ConnectInfo(addr): ConnectInfo<SocketAddr>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state, addr))
}

async fn handle_socket(socket: WebSocket, state: AppState, addr: SocketAddr) {
    let mut ctx = ConnCtx {
        client_id: Uuid::new_v4().to_string(),
        subscriptions: HashSet::new(),
        invalid_frames: 0,
        last_warn: None,
    };
    let clients = state.feed.client_connected();
    info!(client = %ctx.client_id, %addr, clients, "feed client connected");

    drive(socket, &state, &mut ctx).await;

    for game in &ctx.subscriptions {
        state.feed.drop_subscription(game).await;
    }
    let clients = state.feed.client_disconnected();
    info!(client = %ctx.client_id, clients, "feed client disconnected");
}

async fn drive(socket: WebSocket, state: &AppState, ctx: &mut ConnCtx) {
    let (mut sender, mut receiver) = socket.split();
    let mut events = state.feed.subscribe_events();

    // The greeting carries the assigned client id and the games currently
    // known to the store.
    let games = state.store.all_games().await.unwrap_or_else(|error| {
        warn!(client = %ctx.client_id, %error, "could not list games for greeting");
        Vec::new()
    });
    let greeting = ServerMessage::Connected(ConnectedPayload {
        client_id: ctx.client_id.clone(),
        games,
    });
    if !send_message(&mut sender, greeting).await {
        return;
    }

    loop {
        tokio::select! {
            event = events.recv() => match event {
                Ok(frame) => {
                    if ctx.subscriptions.contains(frame.game.as_ref())
                        && sender.send(Message::Text(frame.frame)).await.is_err()
                    {
                        return;
                    }
                }
                Err(RecvError::Lagged(skipped)) => {
                    if should_log(&mut ctx.last_warn) {
                        warn!(client = %ctx.client_id, skipped, "feed client lagging, frames dropped");
                    }
                }
                Err(RecvError::Closed) => return,
            },
            incoming = receiver.next() => match incoming {
                Some(Ok(Message::Text(text))) => {
                    if let LoopControl::Disconnect =
                        handle_frame(state, ctx, &mut sender, text.as_str()).await
                    {
                        return;
                    }
                }
                Some(Ok(Message::Close(_))) | None => return,
                // Protocol-level ping and pong are handled by the socket
                // layer; binary frames are ignored.
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(client = %ctx.client_id, %error, "feed socket error");
                    return;
                }
            },
        }
    }
}

async fn handle_frame(
    state: &AppState,
    ctx: &mut ConnCtx,
    sender: &mut SplitSink<WebSocket, Message>,
    text: &str,
) -> LoopControl {
    let message = match serde_json::from_str::<ClientMessage>(text) {
        Ok(message) => message,
        Err(error) => return invalid_frame(ctx, sender, error).await,
    };
    match message {
        ClientMessage::Subscribe(payload) => {
            if payload.game_name.is_empty() {
                return cont(send_error(sender, ERR_INVALID_GAME, "game name is required").await);
            }
            if ctx.subscriptions.insert(payload.game_name.clone()) {
                state.feed.track_subscription(&payload.game_name).await;
                info!(client = %ctx.client_id, game = %payload.game_name, "subscribed");
            }
            LoopControl::Continue
        }
        ClientMessage::Unsubscribe(payload) => {
            if payload.game_name.is_empty() {
                return cont(send_error(sender, ERR_INVALID_GAME, "game name is required").await);
            }
            if ctx.subscriptions.remove(&payload.game_name) {
                state.feed.drop_subscription(&payload.game_name).await;
                info!(client = %ctx.client_id, game = %payload.game_name, "unsubscribed");
            }
            LoopControl::Continue
        }
        ClientMessage::Ping => cont(send_message(sender, ServerMessage::Pong).await),
    }
}

async fn invalid_frame(
    ctx: &mut ConnCtx,
    sender: &mut SplitSink<WebSocket, Message>,
    error: serde_json::Error,
) -> LoopControl {
    ctx.invalid_frames += 1;
    if should_log(&mut ctx.last_warn) {
        warn!(client = %ctx.client_id, %error, count = ctx.invalid_frames, "invalid feed frame");
    }
    if ctx.invalid_frames > MAX_INVALID_FRAMES {
        let close = Message::Close(Some(CloseFrame {
            code: close_code::POLICY,
            reason: Utf8Bytes::from_static("too many invalid frames"),
        }));
        let _ = sender.send(close).await;
        return LoopControl::Disconnect;
    }
    cont(send_error(sender, ERR_PARSE, "invalid message format").await)
}

fn cont(sent: bool) -> LoopControl {
    if sent {
        LoopControl::Continue
    } else {
        LoopControl::Disconnect
    }
}

async fn send_message(sender: &mut SplitSink<WebSocket, Message>, message: ServerMessage) -> bool {
    let frame = match ServerEnvelope::now(message).to_frame() {
        Ok(frame) => frame,
        Err(error) => {
            warn!(%error, "failed to encode feed frame");
            return true;
        }
    };
    sender
        .send(Message::Text(Utf8Bytes::from(frame)))
        .await
        .is_ok()
}

async fn send_error(sender: &mut SplitSink<WebSocket, Message>, code: &str, message: &str) -> bool {
    send_message(
        sender,
        ServerMessage::Error(ErrorPayload {
            code: code.to_string(),
            message: message.to_string(),
        }),
    )
    .await
}

fn should_log(last: &mut Option<Instant>) -> bool {
    match last {
        Some(at) if at.elapsed() < LOG_THROTTLE => false,
        _ => {
            *last = Some(Instant::now());
            true
        }
    }
}
