//! Outbound intents (client -> service).
//!
//! Intents are constructed transiently by the intent sender, encoded,
//! transmitted, and never persisted. Inputs are validated before an
//! intent is built, so encoding a well-formed intent does not fail in
//! practice.

use serde::{Deserialize, Serialize};

use crate::tasks::TaskCategory;

/// User intents sent to the Igor service over the WebSocket.
///
/// `Deserialize` is derived so tests (and a simulated peer) can run the
/// inverse codec; the real client only ever serializes these.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum OutboundIntent {
    /// Ask the service to execute a task.
    #[serde(rename = "task_execute")]
    ExecuteTask {
        task: String,
        category: TaskCategory,
    },

    /// Ask the service for a knowledge excerpt matching a query.
    #[serde(rename = "knowledge_search")]
    SearchKnowledge { query: String },
}

impl OutboundIntent {
    /// Encode as a single text frame.
    pub fn to_frame(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }
}
