//! Client facade.
//!
//! [`IgorClient`] wires the connection manager, dispatch loop, state,
//! narrator, and intent sender together and owns their lifecycles.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::{Mutex, broadcast};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::warn;

use igor_protocol::Task;

use crate::config::ClientConfig;
use crate::connection::{ConnectionManager, ConnectionState};
use crate::dispatch::MessageDispatcher;
use crate::error::ClientError;
use crate::intent::IntentSender;
use crate::narrator::{Narrator, Speech};
use crate::state::{ApplicationState, StateChange};

pub struct IgorClient {
    connection: Arc<ConnectionManager>,
    state: ApplicationState,
    narrator: Narrator,
    intents: IntentSender,
    shutdown: CancellationToken,
    dispatch_handle: Mutex<Option<JoinHandle<()>>>,
}

impl IgorClient {
    pub fn new(config: &ClientConfig, speech: Arc<dyn Speech>) -> Self {
        let connection = Arc::new(ConnectionManager::new(
            config.endpoint.clone(),
            Duration::from_millis(config.reconnect_delay_ms),
        ));
        let narrator = Narrator::new(speech).with_enabled(config.narration_enabled);
        let state = ApplicationState::new();
        let intents = IntentSender::new(Arc::clone(&connection), narrator.clone());

        Self {
            connection,
            state,
            narrator,
            intents,
            shutdown: CancellationToken::new(),
            dispatch_handle: Mutex::new(None),
        }
    }

    /// Open the connection and start dispatching inbound frames.
    pub async fn open(&self) {
        let mut slot = self.dispatch_handle.lock().await;
        if slot.is_some() {
            warn!("Client already opened");
            return;
        }

        // Subscribe before connecting so no frame is missed.
        let mut frames = self.connection.subscribe_messages();
        let dispatcher = MessageDispatcher::new(self.state.clone(), self.narrator.clone());
        let shutdown = self.shutdown.clone();

        *slot = Some(tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = shutdown.cancelled() => break,
                    frame = frames.recv() => match frame {
                        Ok(raw) => dispatcher.dispatch_frame(&raw).await,
                        Err(broadcast::error::RecvError::Lagged(n)) => {
                            warn!("Dispatch loop lagged; {n} frames dropped");
                        }
                        Err(broadcast::error::RecvError::Closed) => break,
                    },
                }
            }
        }));
        drop(slot);

        self.connection.open().await;
    }

    /// Terminate the connection and stop dispatching. After this
    /// returns, no further state transitions or dispatches occur.
    pub async fn close(&self) {
        self.connection.close().await;
        self.shutdown.cancel();
        let handle = self.dispatch_handle.lock().await.take();
        if let Some(handle) = handle {
            let _ = handle.await;
        }
    }

    pub fn state(&self) -> &ApplicationState {
        &self.state
    }

    pub async fn connection_state(&self) -> ConnectionState {
        self.connection.state().await
    }

    pub fn subscribe_connection(&self) -> broadcast::Receiver<ConnectionState> {
        self.connection.subscribe_state()
    }

    pub fn subscribe_changes(&self) -> broadcast::Receiver<StateChange> {
        self.state.subscribe()
    }

    pub async fn execute_task(&self, task: &Task) -> Result<(), ClientError> {
        self.intents.execute_task(task).await
    }

    pub async fn search_knowledge(&self, query: &str) -> Result<(), ClientError> {
        self.intents.search_knowledge(query).await
    }
}
