//! Outbound user intents.
//!
//! Validates an intent, encodes it, and hands it to the connection
//! manager. Nothing is retried or queued: a send while the connection
//! is not open returns [`ClientError::NotConnected`] and performs no
//! action, which callers are free to ignore.

use std::sync::Arc;

use tracing::debug;

use igor_protocol::{OutboundIntent, Task};

use crate::connection::ConnectionManager;
use crate::error::ClientError;
use crate::narrator::Narrator;

pub struct IntentSender {
    connection: Arc<ConnectionManager>,
    narrator: Narrator,
}

impl IntentSender {
    pub fn new(connection: Arc<ConnectionManager>, narrator: Narrator) -> Self {
        Self {
            connection,
            narrator,
        }
    }

    /// Request execution of a task.
    ///
    /// Narrates "Executing task: {text}" immediately, independent of
    /// any server acknowledgment; execution feedback is optimistic.
    pub async fn execute_task(&self, task: &Task) -> Result<(), ClientError> {
        if task.text.trim().is_empty() {
            return Err(ClientError::InvalidIntent("task text is empty".to_string()));
        }

        self.narrator.say(format!("Executing task: {}", task.text));

        self.send(OutboundIntent::ExecuteTask {
            task: task.text.clone(),
            category: task.category,
        })
        .await
    }

    /// Request a knowledge excerpt for a query.
    ///
    /// An empty or whitespace-only query is a silent no-op, not an
    /// error. A non-empty query goes on the wire exactly as given.
    pub async fn search_knowledge(&self, query: &str) -> Result<(), ClientError> {
        if query.trim().is_empty() {
            debug!("Ignoring empty knowledge search");
            return Ok(());
        }

        self.send(OutboundIntent::SearchKnowledge {
            query: query.to_string(),
        })
        .await
    }

    async fn send(&self, intent: OutboundIntent) -> Result<(), ClientError> {
        let frame = intent
            .to_frame()
            .map_err(|e| ClientError::Transport(e.to_string()))?;

        match self.connection.send(frame).await {
            Ok(()) => Ok(()),
            Err(ClientError::NotConnected) => {
                debug!("Dropping outbound intent: not connected");
                Err(ClientError::NotConnected)
            }
            Err(e) => Err(e),
        }
    }
}
