use std::sync::Arc;

use futures_util::stream::SplitSink;
use futures_util::{SinkExt, StreamExt};
use tokio::net::TcpStream;
use tokio::sync::{Notify, mpsc, watch};
use tokio::task::JoinHandle;
use tokio::time::{Duration, Instant, interval_at, sleep, sleep_until};
use tokio_tungstenite::tungstenite::Message as WsMessage;
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async};
use tracing::{debug, info, warn};
use url::Url;

use crate::domain::feed::ConnectionStatus;
use crate::domain::reconnect::ReconnectPolicy;
use crate::interface_adapters::protocol::{
    ClientMessage, OutboundEnvelope, ServerMessage, decode_frame,
};

type FeedSocket = WebSocketStream<MaybeTlsStream<TcpStream>>;

#[derive(Debug, Clone)]
pub struct ChannelSettings {
    pub policy: ReconnectPolicy,
    /// How often a PING frame is written while a session is up.
    pub heartbeat_interval: Duration,
    /// A session with no inbound traffic for this long is torn down and
    /// reconnected.
    pub idle_timeout: Duration,
    pub outbound_capacity: usize,
}

impl Default for ChannelSettings {
    fn default() -> Self {
        Self {
            policy: ReconnectPolicy::default(),
            heartbeat_interval: Duration::from_secs(30),
            idle_timeout: Duration::from_secs(60),
            outbound_capacity: 64,
        }
    }
}

/// Control handle for the channel task. Dropping it without calling
/// [`ChannelHandle::shutdown`] leaves the task running until its consumer
/// side goes away.
pub struct ChannelHandle {
    outbound: mpsc::Sender<ClientMessage>,
    status: watch::Receiver<ConnectionStatus>,
    shutdown: Arc<Notify>,
    task: JoinHandle<()>,
}

impl ChannelHandle {
    /// Queues a frame without waiting. Frames queued while the channel is
    /// down or the queue is full are dropped; subscription state is
    /// replayed on reconnect anyway.
    pub fn send(&self, message: ClientMessage) {
        if self.outbound.try_send(message).is_err() {
            debug!("outbound feed frame dropped");
        }
    }

    pub fn status(&self) -> watch::Receiver<ConnectionStatus> {
        self.status.clone()
    }

    pub async fn shutdown(self) {
        self.shutdown.notify_one();
        let _ = self.task.await;
    }
}

/// Spawns the channel task. Decoded frames arrive on the returned
/// receiver; dropping that receiver stops the task.
pub fn connect(
    url: Url,
    settings: ChannelSettings,
) -> (ChannelHandle, mpsc::Receiver<ServerMessage>) {
    let (outbound_tx, outbound_rx) = mpsc::channel(settings.outbound_capacity);
    let (inbound_tx, inbound_rx) = mpsc::channel(64);
    let (status_tx, status_rx) = watch::channel(ConnectionStatus::Connecting);
    let shutdown = Arc::new(Notify::new());
    let task = tokio::spawn(run_channel(
        url,
        settings,
        outbound_rx,
        inbound_tx,
        status_tx,
        Arc::clone(&shutdown),
    ));
    (
        ChannelHandle {
            outbound: outbound_tx,
            status: status_rx,
            shutdown,
            task,
        },
        inbound_rx,
    )
}

enum SessionEnd {
    Shutdown,
    Closed,
}

async fn run_channel(
    url: Url,
    settings: ChannelSettings,
    mut outbound: mpsc::Receiver<ClientMessage>,
    inbound: mpsc::Sender<ServerMessage>,
    status: watch::Sender<ConnectionStatus>,
    shutdown: Arc<Notify>,
) {
    let mut attempt: u32 = 0;
    loop {
        let _ = status.send(ConnectionStatus::Connecting);
        let connected = tokio::select! {
            result = connect_async(url.as_str()) => result,
            _ = shutdown.notified() => {
                let _ = status.send(ConnectionStatus::Disconnected);
                return;
            }
        };

        match connected {
            Ok((socket, _)) => {
                info!(%url, "score feed connected");
                attempt = 0;
                let _ = status.send(ConnectionStatus::Connected);
                match drive_socket(socket, &settings, &mut outbound, &inbound, &shutdown).await {
                    SessionEnd::Shutdown => {
                        let _ = status.send(ConnectionStatus::Disconnected);
                        return;
                    }
                    SessionEnd::Closed => {
                        let _ = status.send(ConnectionStatus::Disconnected);
                    }
                }
            }
            Err(error) => {
                warn!(%error, "score feed connection failed");
                let _ = status.send(ConnectionStatus::Error);
            }
        }

        let Some(delay) = settings.policy.delay_for(attempt) else {
            warn!(attempt, "reconnect budget exhausted, giving up");
            let _ = status.send(ConnectionStatus::Disconnected);
            return;
        };
        attempt += 1;
        debug!(attempt, ?delay, "reconnecting to score feed");
        tokio::select! {
            _ = sleep(delay) => {}
            _ = shutdown.notified() => {
                let _ = status.send(ConnectionStatus::Disconnected);
                return;
            }
        }
    }
}

async fn drive_socket(
    socket: FeedSocket,
    settings: &ChannelSettings,
    outbound: &mut mpsc::Receiver<ClientMessage>,
    inbound: &mpsc::Sender<ServerMessage>,
    shutdown: &Notify,
) -> SessionEnd {
    let (mut sink, mut source) = socket.split();
    let mut heartbeat = interval_at(
        Instant::now() + settings.heartbeat_interval,
        settings.heartbeat_interval,
    );
    let mut last_rx = Instant::now();

    loop {
        tokio::select! {
            frame = source.next() => match frame {
                Some(Ok(WsMessage::Text(text))) => {
                    last_rx = Instant::now();
                    match decode_frame(text.as_str()) {
                        Ok(message) => {
                            if inbound.send(message).await.is_err() {
                                // Consumer is gone; stop for good.
                                return SessionEnd::Shutdown;
                            }
                        }
                        Err(error) => warn!(%error, "dropping undecodable feed frame"),
                    }
                }
                Some(Ok(WsMessage::Close(_))) | None => {
                    info!("score feed closed by server");
                    return SessionEnd::Closed;
                }
                Some(Ok(WsMessage::Ping(_) | WsMessage::Pong(_))) => {
                    last_rx = Instant::now();
                }
                Some(Ok(_)) => {}
                Some(Err(error)) => {
                    warn!(%error, "score feed socket error");
                    return SessionEnd::Closed;
                }
            },
            Some(message) = outbound.recv() => {
                if !write_frame(&mut sink, message).await {
                    return SessionEnd::Closed;
                }
            }
            _ = heartbeat.tick() => {
                if !write_frame(&mut sink, ClientMessage::Ping).await {
                    return SessionEnd::Closed;
                }
            }
            _ = sleep_until(last_rx + settings.idle_timeout) => {
                warn!("score feed idle too long, forcing reconnect");
                let _ = sink.send(WsMessage::Close(None)).await;
                return SessionEnd::Closed;
            }
            _ = shutdown.notified() => {
                let _ = sink.send(WsMessage::Close(None)).await;
                return SessionEnd::Shutdown;
            }
        }
    }
}

/// Returns false when the socket is no longer writable.
async fn write_frame(sink: &mut SplitSink<FeedSocket, WsMessage>, message: ClientMessage) -> bool {
    match OutboundEnvelope::new(message).encode() {
        Ok(frame) => sink.send(WsMessage::Text(frame.into())).await.is_ok(),
        Err(error) => {
            warn!(%error, "failed to encode outbound feed frame");
            true
        }
    }
}
