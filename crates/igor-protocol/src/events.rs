//! Inbound messages (service -> client).
//!
//! The service may push any of these unsolicited at any time. Unknown
//! type tags decode to [`InboundMessage::Unrecognized`] for forward
//! compatibility; only structurally broken frames are errors.

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::tasks::Task;

/// A single-frame decode failure. The frame is dropped and processing
/// continues; this is never fatal to the connection.
#[derive(Debug, Error)]
pub enum DecodeError {
    #[error("malformed frame: {0}")]
    MalformedFrame(#[from] serde_json::Error),
}

/// Messages pushed from the Igor service over the WebSocket.
#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum InboundMessage {
    /// A new task for the client's task list.
    Task { task: Task },

    /// A knowledge excerpt. Replaces the previous excerpt wholesale.
    Knowledge { content: String },

    /// Acknowledgment of a `task_execute` intent. Carries the raw
    /// execution result; the client does not act on it.
    TaskExecution { result: Value },

    /// Any frame with a type tag this client does not know. Dropped
    /// downstream without surfacing an error.
    #[serde(other)]
    Unrecognized,
}

impl InboundMessage {
    /// Parse one raw text frame.
    pub fn parse(raw: &str) -> Result<Self, DecodeError> {
        Ok(serde_json::from_str(raw)?)
    }
}
