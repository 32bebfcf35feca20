use std::time::Duration;

use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Instant, sleep_until};
use tracing::info;

use crate::domain::feed::{Applied, ConnectionStatus, FeedEvent, FeedState};
use crate::interface_adapters::protocol::{ClientMessage, ServerMessage};
use crate::net::channel::ChannelHandle;

/// How long a surfaced server error stays visible before it clears.
pub const ERROR_CLEAR_DELAY: Duration = Duration::from_secs(5);

enum RegistryCommand {
    Subscribe(String),
    Unsubscribe(String),
}

/// Owns the channel and the [`FeedState`]. Watchers get a fresh state
/// clone after every change; subscriptions are replayed whenever the
/// channel comes back up.
pub struct RegistryHandle {
    commands: mpsc::Sender<RegistryCommand>,
    state: watch::Receiver<FeedState>,
    task: JoinHandle<()>,
}

impl RegistryHandle {
    pub fn spawn(channel: ChannelHandle, inbound: mpsc::Receiver<ServerMessage>) -> Self {
        let (command_tx, command_rx) = mpsc::channel(32);
        let (state_tx, state_rx) = watch::channel(FeedState::default());
        let task = tokio::spawn(run_registry(channel, inbound, command_rx, state_tx));
        Self {
            commands: command_tx,
            state: state_rx,
            task,
        }
    }

    pub async fn subscribe(&self, game: impl Into<String>) {
        let _ = self
            .commands
            .send(RegistryCommand::Subscribe(game.into()))
            .await;
    }

    pub async fn unsubscribe(&self, game: impl Into<String>) {
        let _ = self
            .commands
            .send(RegistryCommand::Unsubscribe(game.into()))
            .await;
    }

    pub fn state(&self) -> watch::Receiver<FeedState> {
        self.state.clone()
    }

    pub fn snapshot(&self) -> FeedState {
        self.state.borrow().clone()
    }

    /// Stops the registry and shuts the channel down with it.
    pub async fn stop(self) {
        drop(self.commands);
        let _ = self.task.await;
    }
}

async fn run_registry(
    channel: ChannelHandle,
    mut inbound: mpsc::Receiver<ServerMessage>,
    mut commands: mpsc::Receiver<RegistryCommand>,
    state_tx: watch::Sender<FeedState>,
) {
    let mut status = channel.status();
    // Only react to status edges from here on; the command path reads the
    // current value itself. Without this a pre-spawn Connected edge would
    // replay a subscription the command path already sent.
    status.mark_unchanged();
    let mut state = FeedState::default();
    let mut error_clear: Option<Instant> = None;

    loop {
        tokio::select! {
            message = inbound.recv() => {
                let Some(message) = message else { break };
                if state.apply(FeedEvent::from(message)) == Applied::ErrorSurfaced {
                    error_clear = Some(Instant::now() + ERROR_CLEAR_DELAY);
                }
                state_tx.send_replace(state.clone());
            }
            changed = status.changed() => {
                if changed.is_err() {
                    break;
                }
                if *status.borrow_and_update() == ConnectionStatus::Connected {
                    // A fresh session knows nothing about earlier
                    // subscriptions, so replay each one exactly once.
                    for game in &state.subscribed {
                        channel.send(ClientMessage::subscribe(game.clone()));
                    }
                    if !state.subscribed.is_empty() {
                        info!(games = state.subscribed.len(), "replayed feed subscriptions");
                    }
                }
            }
            command = commands.recv() => {
                let Some(command) = command else { break };
                apply_command(&mut state, command, &channel, &status);
                state_tx.send_replace(state.clone());
            }
            _ = clear_timer(error_clear) => {
                state.clear_error();
                error_clear = None;
                state_tx.send_replace(state.clone());
            }
        }
    }

    channel.shutdown().await;
}

fn apply_command(
    state: &mut FeedState,
    command: RegistryCommand,
    channel: &ChannelHandle,
    status: &watch::Receiver<ConnectionStatus>,
) {
    let connected = *status.borrow() == ConnectionStatus::Connected;
    match command {
        RegistryCommand::Subscribe(game) => {
            if state.subscribe(&game) && connected {
                channel.send(ClientMessage::subscribe(game));
            }
        }
        RegistryCommand::Unsubscribe(game) => {
            if state.unsubscribe(&game) && connected {
                channel.send(ClientMessage::unsubscribe(game));
            }
        }
    }
}

async fn clear_timer(deadline: Option<Instant>) {
    match deadline {
        Some(at) => sleep_until(at).await,
        None => std::future::pending().await,
    }
}
