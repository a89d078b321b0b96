//! Wire protocol types for the Igor assistant connection.
//!
//! This crate defines the typed message model spoken over the persistent
//! WebSocket between the client core and the Igor service:
//!
//! ```text
//! Client core <--[WS: JSON text frames]--> Igor service
//! ```
//!
//! Frames are internally tagged JSON objects (`"type"` field). Inbound
//! frames decode into [`InboundMessage`]; outbound user intents encode
//! from [`OutboundIntent`]. Everything past this boundary works with
//! typed data only.
//!
//! ## Design Principles
//!
//! 1. **Unknown is not an error.** Frames with an unrecognized type tag
//!    decode to [`InboundMessage::Unrecognized`] so new server-side
//!    message types never break an older client.
//! 2. **Malformed is dropped, not fatal.** A frame that fails to parse
//!    yields a [`DecodeError`] the caller logs and skips.
//! 3. **No I/O here.** This crate holds types and codec logic only.

pub mod commands;
pub mod events;
pub mod tasks;

pub use commands::OutboundIntent;
pub use events::{DecodeError, InboundMessage};
pub use tasks::{Task, TaskCategory};
