//! Client error taxonomy.
//!
//! No error here is fatal to the process. Every failure degrades to
//! "skip this operation, keep the loop alive": dropped sends, dropped
//! frames, and an advisory connection-lost notice on the state stream.

use thiserror::Error;

#[derive(Debug, Error)]
pub enum ClientError {
    /// Send attempted while the connection is not open. The operation
    /// performed no action; nothing is queued for later.
    #[error("not connected")]
    NotConnected,

    /// Caller-side validation failure (empty required field). The
    /// operation performed no action.
    #[error("invalid intent: {0}")]
    InvalidIntent(String),

    /// Connection-level failure. Triggers reconnection internally;
    /// surfaced to callers only where a send was in flight.
    #[error("transport error: {0}")]
    Transport(String),
}
