//! WebSocket connection lifecycle with automatic reconnection.
//!
//! [`ConnectionManager`] owns the transport and its state machine. A
//! single background task runs connect attempts, the read/write loop,
//! and the reconnect timer, so at most one attempt or timer is pending
//! at any moment. The rest of the system observes the connection only
//! through broadcast channels: one for state transitions (exactly one
//! event per transition, in order) and one for raw inbound text frames
//! (arrival order, no batching).

use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use futures::{SinkExt, StreamExt};
use tokio::sync::{Mutex, RwLock, broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_tungstenite::connect_async;
use tokio_tungstenite::tungstenite::Message;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::error::ClientError;

const STATE_BUFFER_SIZE: usize = 64;
const MESSAGE_BUFFER_SIZE: usize = 256;
const OUTBOUND_BUFFER_SIZE: usize = 32;

/// Connection lifecycle state. Transitions are owned solely by the
/// manager's background task and published in total order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// A connection attempt is in flight.
    Connecting,
    /// The connection is established; sends are accepted.
    Open,
    /// The connection dropped; a reconnect is about to be scheduled.
    Closed,
    /// Waiting out the fixed delay before the next attempt.
    Reconnecting,
    /// `close()` was called. Terminal; no further transitions.
    Terminated,
}

impl std::fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionState::Connecting => write!(f, "connecting"),
            ConnectionState::Open => write!(f, "open"),
            ConnectionState::Closed => write!(f, "closed"),
            ConnectionState::Reconnecting => write!(f, "reconnecting"),
            ConnectionState::Terminated => write!(f, "terminated"),
        }
    }
}

/// Owns the WebSocket connection to the Igor service.
///
/// Reconnect policy: on any unexpected close or transport error the
/// state moves Closed -> Reconnecting and a new attempt starts after a
/// fixed delay. No backoff growth, no attempt cap, no jitter; the
/// delay is a configuration knob, not a constant. Only [`close`]
/// suppresses the retry loop.
///
/// [`close`]: ConnectionManager::close
pub struct ConnectionManager {
    endpoint: String,
    reconnect_delay: Duration,
    state: RwLock<ConnectionState>,
    state_tx: broadcast::Sender<ConnectionState>,
    message_tx: broadcast::Sender<String>,
    outbound_tx: mpsc::Sender<String>,
    /// Taken by the background task on `open()`.
    outbound_rx: Mutex<Option<mpsc::Receiver<String>>>,
    shutdown: CancellationToken,
    run_handle: Mutex<Option<JoinHandle<()>>>,
}

impl ConnectionManager {
    pub fn new(endpoint: impl Into<String>, reconnect_delay: Duration) -> Self {
        let (state_tx, _) = broadcast::channel(STATE_BUFFER_SIZE);
        let (message_tx, _) = broadcast::channel(MESSAGE_BUFFER_SIZE);
        let (outbound_tx, outbound_rx) = mpsc::channel(OUTBOUND_BUFFER_SIZE);

        Self {
            endpoint: endpoint.into(),
            reconnect_delay,
            state: RwLock::new(ConnectionState::Connecting),
            state_tx,
            message_tx,
            outbound_tx,
            outbound_rx: Mutex::new(Some(outbound_rx)),
            shutdown: CancellationToken::new(),
            run_handle: Mutex::new(None),
        }
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> ConnectionState {
        *self.state.read().await
    }

    /// Subscribe to state transitions, one event per transition.
    pub fn subscribe_state(&self) -> broadcast::Receiver<ConnectionState> {
        self.state_tx.subscribe()
    }

    /// Subscribe to raw inbound text frames in arrival order.
    pub fn subscribe_messages(&self) -> broadcast::Receiver<String> {
        self.message_tx.subscribe()
    }

    /// Transmit one text frame.
    ///
    /// Fails with [`ClientError::NotConnected`] unless the state is
    /// Open; the frame is not queued for later.
    pub async fn send(&self, frame: String) -> Result<(), ClientError> {
        if *self.state.read().await != ConnectionState::Open {
            return Err(ClientError::NotConnected);
        }
        self.outbound_tx
            .send(frame)
            .await
            .map_err(|_| ClientError::NotConnected)
    }

    /// Start the connection task. Idempotent; the second and later
    /// calls are no-ops.
    pub async fn open(self: &Arc<Self>) {
        let mut slot = self.outbound_rx.lock().await;
        let Some(outbound_rx) = slot.take() else {
            warn!("Connection to {} already opened", self.endpoint);
            return;
        };
        drop(slot);

        let manager = Arc::clone(self);
        let handle = tokio::spawn(async move { manager.run_loop(outbound_rx).await });
        *self.run_handle.lock().await = Some(handle);
    }

    /// Terminate the connection and suppress further reconnects.
    ///
    /// Cancels a pending reconnect timer and abandons any in-flight
    /// attempt. When this returns, the state is Terminated and no
    /// further transitions or frame deliveries occur.
    pub async fn close(&self) {
        self.shutdown.cancel();
        let handle = self.run_handle.lock().await.take();
        match handle {
            Some(handle) => {
                let _ = handle.await;
            }
            None => {
                // Never opened, or already closed; still mark the
                // terminal state exactly once.
                if *self.state.read().await != ConnectionState::Terminated {
                    self.transition(ConnectionState::Terminated).await;
                }
            }
        }
    }

    async fn transition(&self, next: ConnectionState) {
        *self.state.write().await = next;
        debug!("Connection state -> {next}");
        let _ = self.state_tx.send(next);
    }

    async fn run_loop(&self, mut outbound_rx: mpsc::Receiver<String>) {
        loop {
            self.transition(ConnectionState::Connecting).await;

            match self.connect_and_stream(&mut outbound_rx).await {
                Ok(()) => info!("Connection to {} closed", self.endpoint),
                Err(e) => warn!(
                    "Connection lost ({e:#}); retrying in {:?}",
                    self.reconnect_delay
                ),
            }

            if self.shutdown.is_cancelled() {
                break;
            }

            self.transition(ConnectionState::Closed).await;
            self.transition(ConnectionState::Reconnecting).await;

            // Sends dropped while disconnected are not replayed.
            while outbound_rx.try_recv().is_ok() {}

            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                _ = tokio::time::sleep(self.reconnect_delay) => {}
            }
        }

        self.transition(ConnectionState::Terminated).await;
    }

    /// One connection attempt plus its read/write loop. Returns Ok on
    /// clean close or cancellation, Err on transport failure.
    async fn connect_and_stream(&self, outbound_rx: &mut mpsc::Receiver<String>) -> Result<()> {
        debug!("Connecting to {}", self.endpoint);

        let (ws_stream, _) = tokio::select! {
            _ = self.shutdown.cancelled() => return Ok(()),
            res = connect_async(self.endpoint.as_str()) => {
                res.context("WebSocket connect failed")?
            }
        };

        if self.shutdown.is_cancelled() {
            return Ok(());
        }

        self.transition(ConnectionState::Open).await;
        info!("Connected to {}", self.endpoint);

        let (mut write, mut read) = ws_stream.split();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => {
                    let _ = write.close().await;
                    return Ok(());
                }
                frame = outbound_rx.recv() => match frame {
                    Some(frame) => {
                        write
                            .send(Message::text(frame))
                            .await
                            .context("WebSocket send failed")?;
                    }
                    // Sender half dropped; the manager is going away.
                    None => return Ok(()),
                },
                msg = read.next() => match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = self.message_tx.send(text.as_str().to_owned());
                    }
                    // Control and binary frames are not part of the protocol.
                    Some(Ok(Message::Close(_))) | None => return Ok(()),
                    Some(Ok(_)) => {}
                    Some(Err(e)) => return Err(e).context("WebSocket stream error"),
                },
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_send_before_open_is_not_connected() {
        let manager = Arc::new(ConnectionManager::new(
            "ws://127.0.0.1:1/ws",
            Duration::from_millis(10),
        ));

        let err = manager.send("{}".to_string()).await.unwrap_err();
        assert!(matches!(err, ClientError::NotConnected));
    }

    #[tokio::test]
    async fn test_close_without_open_reaches_terminated() {
        let manager = Arc::new(ConnectionManager::new(
            "ws://127.0.0.1:1/ws",
            Duration::from_millis(10),
        ));
        let mut states = manager.subscribe_state();

        manager.close().await;

        assert_eq!(states.recv().await.unwrap(), ConnectionState::Terminated);
        assert_eq!(manager.state().await, ConnectionState::Terminated);
    }

    #[tokio::test]
    async fn test_unreachable_endpoint_cycles_through_reconnecting() {
        // Port 1 refuses immediately, so each attempt fails fast.
        let manager = Arc::new(ConnectionManager::new(
            "ws://127.0.0.1:1/ws",
            Duration::from_millis(20),
        ));
        let mut states = manager.subscribe_state();

        manager.open().await;

        // Two full failure cycles look identical.
        for _ in 0..2 {
            assert_eq!(states.recv().await.unwrap(), ConnectionState::Connecting);
            assert_eq!(states.recv().await.unwrap(), ConnectionState::Closed);
            assert_eq!(states.recv().await.unwrap(), ConnectionState::Reconnecting);
        }

        manager.close().await;
        assert_eq!(manager.state().await, ConnectionState::Terminated);

        // Dropping the manager closes the channel, so the drain below
        // terminates once the buffered transitions are consumed.
        drop(manager);
        let mut last = None;
        while let Ok(state) = states.recv().await {
            last = Some(state);
        }
        assert_eq!(last, Some(ConnectionState::Terminated));
    }

    #[tokio::test]
    async fn test_close_during_reconnecting_cancels_timer() {
        let manager = Arc::new(ConnectionManager::new(
            "ws://127.0.0.1:1/ws",
            Duration::from_secs(3600),
        ));
        let mut states = manager.subscribe_state();

        manager.open().await;

        assert_eq!(states.recv().await.unwrap(), ConnectionState::Connecting);
        assert_eq!(states.recv().await.unwrap(), ConnectionState::Closed);
        assert_eq!(states.recv().await.unwrap(), ConnectionState::Reconnecting);

        // With an hour-long delay, close() must return promptly by
        // cancelling the pending timer.
        manager.close().await;

        assert_eq!(states.recv().await.unwrap(), ConnectionState::Terminated);
        drop(manager);
        assert!(states.recv().await.is_err());
    }
}
