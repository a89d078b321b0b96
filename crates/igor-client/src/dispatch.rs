//! Inbound message dispatch.
//!
//! Applies one decoded message at a time to [`ApplicationState`] and
//! triggers side effects. The dispatcher runs on a single loop task,
//! so messages are processed strictly in arrival order and state is
//! never mutated concurrently.

use tracing::{debug, warn};

use igor_protocol::InboundMessage;

use crate::narrator::Narrator;
use crate::state::ApplicationState;

pub struct MessageDispatcher {
    state: ApplicationState,
    narrator: Narrator,
}

impl MessageDispatcher {
    pub fn new(state: ApplicationState, narrator: Narrator) -> Self {
        Self { state, narrator }
    }

    /// Decode and apply one raw text frame. Malformed frames are
    /// logged and dropped; processing continues.
    pub async fn dispatch_frame(&self, raw: &str) {
        match InboundMessage::parse(raw) {
            Ok(message) => self.dispatch(message).await,
            Err(e) => {
                let snippet: String = raw.chars().take(200).collect();
                warn!("Dropping malformed frame: {e}, frame: {snippet}");
            }
        }
    }

    /// Apply one decoded message.
    pub async fn dispatch(&self, message: InboundMessage) {
        match message {
            InboundMessage::Task { task } => {
                debug!("Received task: {} ({})", task.text, task.category);
                self.state.push_task(task).await;
            }
            InboundMessage::Knowledge { content } => {
                self.state.set_knowledge(content.clone()).await;
                // Narration is dispatched, not awaited; a slow or
                // broken TTS device never stalls the message loop.
                self.narrator.say(content);
            }
            InboundMessage::TaskExecution { result } => {
                debug!("Task execution result: {result}");
            }
            InboundMessage::Unrecognized => {}
        }
    }
}
