//! The event channel: one auto-reconnecting WebSocket per mounted consumer.
//!
//! The channel never surfaces failures. A lost connection or a failed
//! handshake is logged and answered with a scheduled reconnect; the only
//! externally visible signals are the state watch and the event stream
//! going quiet.

use std::sync::Arc;
use std::time::Duration;

use futures_util::{SinkExt, StreamExt};
use rand::Rng;
use tokio::sync::{mpsc, watch};
use tokio::time;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;

use super::events::{self, GatewayEvent};
use crate::config::Config;
use crate::error::ClientError;
use crate::session::Session;

/// Fixed pause between reconnect attempts.
const RECONNECT_DELAY: Duration = Duration::from_secs(3);
/// Random extra pause added per attempt so a fleet of clients does not
/// reconnect in lockstep after a server restart.
const RECONNECT_JITTER_MS: u64 = 250;
/// Parsed events buffered before the reader applies backpressure.
const EVENT_BUFFER: usize = 64;

type Socket = tokio_tungstenite::WebSocketStream<
    tokio_tungstenite::MaybeTlsStream<tokio::net::TcpStream>,
>;

/// Lifecycle of the channel, observable through [`EventChannel::state`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChannelState {
    /// No access token is stored; nothing to connect with yet.
    Idle,
    Connecting,
    Open,
    /// Connection lost; a reconnect is scheduled.
    Closed,
    /// Torn down for good. No further transitions happen.
    Disposed,
}

/// Handle to a live event channel.
///
/// Created with [`EventChannel::open`]; parsed events arrive on the returned
/// receiver in arrival order. Dropping the handle or calling
/// [`EventChannel::close`] cancels the connection task, which closes an open
/// socket and cancels any pending reconnect timer.
pub struct EventChannel {
    cancel: CancellationToken,
    state_rx: watch::Receiver<ChannelState>,
    task: Option<tokio::task::JoinHandle<()>>,
}

impl EventChannel {
    /// Spawn the connection task and hand back the event stream.
    pub fn open(config: &Config, session: Arc<Session>) -> (Self, mpsc::Receiver<GatewayEvent>) {
        let (event_tx, event_rx) = mpsc::channel(EVENT_BUFFER);
        let (state_tx, state_rx) = watch::channel(ChannelState::Idle);
        let cancel = CancellationToken::new();

        let task = tokio::spawn(run_channel(
            config.gateway_url.clone(),
            Duration::from_secs(config.connect_timeout_secs),
            session,
            event_tx,
            state_tx,
            cancel.clone(),
        ));

        (
            Self {
                cancel,
                state_rx,
                task: Some(task),
            },
            event_rx,
        )
    }

    /// Watchable lifecycle state.
    pub fn state(&self) -> watch::Receiver<ChannelState> {
        self.state_rx.clone()
    }

    /// Tear the channel down and wait for the connection task to exit.
    pub async fn close(mut self) {
        self.cancel.cancel();
        if let Some(task) = self.task.take() {
            let _ = task.await;
        }
    }
}

impl Drop for EventChannel {
    fn drop(&mut self) {
        self.cancel.cancel();
    }
}

/// Connection loop: Idle/Connecting → Open → Closed → (delay) → Connecting,
/// until cancelled.
async fn run_channel(
    gateway_url: String,
    connect_timeout: Duration,
    session: Arc<Session>,
    events: mpsc::Sender<GatewayEvent>,
    state: watch::Sender<ChannelState>,
    cancel: CancellationToken,
) {
    loop {
        if cancel.is_cancelled() || events.is_closed() {
            break;
        }

        // Re-read the token on every attempt: a refresh done by the request
        // path between attempts must be picked up here.
        let token = match session.access_token().await {
            Ok(token) => token,
            Err(err) => {
                tracing::warn!(error = %err, "credential store read failed");
                None
            }
        };

        match token {
            Some(token) => {
                let _ = state.send(ChannelState::Connecting);
                match connect(&gateway_url, &token, connect_timeout).await {
                    Ok(socket) => {
                        let _ = state.send(ChannelState::Open);
                        tracing::info!("event channel open");

                        let reason = read_frames(socket, &events, &cancel).await;
                        // No consumer left means no reconnect to schedule;
                        // dispose right away instead of sleeping first.
                        if cancel.is_cancelled() || events.is_closed() {
                            break;
                        }
                        tracing::info!(%reason, "event channel closed, reconnect scheduled");
                        let _ = state.send(ChannelState::Closed);
                    }
                    Err(err) => {
                        tracing::warn!(error = %err, "event channel connect failed");
                        let _ = state.send(ChannelState::Closed);
                    }
                }
            }
            // Not logged in yet. A valid resting state, not an error; keep
            // checking so a later login brings the channel up.
            None => {
                let _ = state.send(ChannelState::Idle);
            }
        }

        tokio::select! {
            _ = cancel.cancelled() => break,
            _ = time::sleep(reconnect_delay()) => {}
        }
    }

    let _ = state.send(ChannelState::Disposed);
    tracing::debug!("event channel disposed");
}

async fn connect(
    gateway_url: &str,
    token: &str,
    connect_timeout: Duration,
) -> Result<Socket, ClientError> {
    let url = format!("{gateway_url}?token={token}");
    match time::timeout(connect_timeout, tokio_tungstenite::connect_async(&url)).await {
        Ok(Ok((socket, _response))) => Ok(socket),
        Ok(Err(err)) => Err(ClientError::ConnectionLost {
            reason: err.to_string(),
        }),
        Err(_) => Err(ClientError::ConnectionLost {
            reason: "handshake timeout".to_string(),
        }),
    }
}

/// Pump frames to the consumer until the socket dies or the channel is
/// cancelled. Returns the close reason for the log line.
async fn read_frames(
    mut socket: Socket,
    events: &mpsc::Sender<GatewayEvent>,
    cancel: &CancellationToken,
) -> String {
    loop {
        tokio::select! {
            _ = cancel.cancelled() => {
                // Best-effort close handshake on our way out.
                let _ = socket.close(None).await;
                return "disposed".to_string();
            }

            frame = socket.next() => {
                match frame {
                    Some(Ok(Message::Text(text))) => match events::decode(text.as_str()) {
                        Ok(Some(event)) => {
                            if events.send(event).await.is_err() {
                                let _ = socket.close(None).await;
                                return "consumer dropped".to_string();
                            }
                        }
                        // Unknown tag; already logged by the decoder.
                        Ok(None) => {}
                        // Bad frame: drop it, the connection stays open.
                        Err(err) => {
                            tracing::warn!(error = %err, "dropping malformed frame");
                        }
                    },
                    Some(Ok(Message::Ping(payload))) => {
                        let _ = socket.send(Message::Pong(payload)).await;
                    }
                    Some(Ok(Message::Close(frame))) => {
                        return match frame {
                            Some(frame) => format!("close {}: {}", frame.code, frame.reason),
                            None => "closed by server".to_string(),
                        };
                    }
                    Some(Ok(_)) => {}
                    Some(Err(err)) => return err.to_string(),
                    None => return "stream ended".to_string(),
                }
            }
        }
    }
}

fn reconnect_delay() -> Duration {
    let jitter = rand::thread_rng().gen_range(0..=RECONNECT_JITTER_MS);
    RECONNECT_DELAY + Duration::from_millis(jitter)
}
