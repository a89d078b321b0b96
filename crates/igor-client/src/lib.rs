//! Client core for the Igor assistant.
//!
//! Maintains a persistent WebSocket connection to the Igor service,
//! translates inbound frames into local state changes, and translates
//! user intents into outbound frames:
//!
//! ```text
//! wire bytes -> codec -> dispatcher -> ApplicationState (+ narration)
//! user intent -> IntentSender -> codec -> ConnectionManager -> wire
//! ```
//!
//! The connection manager owns its own lifecycle state machine and
//! reconnects on a fixed interval after any drop; the rest of the
//! system observes it only through state-change and raw-frame events.
//! The presentation layer is a consumer of [`ApplicationState`] and a
//! caller of the intent operations on [`IgorClient`]; it is not part
//! of this crate.

pub mod client;
pub mod config;
pub mod connection;
pub mod dispatch;
pub mod error;
pub mod intent;
pub mod narrator;
pub mod state;

pub use client::IgorClient;
pub use config::{ClientConfig, LoggingConfig};
pub use connection::{ConnectionManager, ConnectionState};
pub use error::ClientError;
pub use narrator::{Narrator, NullSpeech, Speech};
pub use state::{ApplicationState, StateChange};
