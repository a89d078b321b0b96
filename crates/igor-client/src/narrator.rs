//! Fire-and-forget narration.
//!
//! The platform's text-to-speech facility is an opaque capability
//! behind the [`Speech`] trait. [`Narrator`] dispatches each call on
//! its own task and never waits for completion; a failing or missing
//! speech device must not affect the connection or the state.

use std::sync::Arc;

use anyhow::Result;
use async_trait::async_trait;
use tracing::warn;

/// Abstract narration capability.
///
/// Implementations must tolerate concurrent, rapid calls; each call is
/// independent, with no de-duplication or queuing beyond whatever the
/// underlying device provides.
#[async_trait]
pub trait Speech: Send + Sync {
    async fn narrate(&self, text: &str) -> Result<()>;
}

/// Speech implementation that discards everything. Used when no TTS
/// device is wired up.
#[derive(Debug, Default)]
pub struct NullSpeech;

#[async_trait]
impl Speech for NullSpeech {
    async fn narrate(&self, _text: &str) -> Result<()> {
        Ok(())
    }
}

/// Fire-and-forget invoker wrapping a [`Speech`] capability.
#[derive(Clone)]
pub struct Narrator {
    speech: Arc<dyn Speech>,
    enabled: bool,
}

impl Narrator {
    pub fn new(speech: Arc<dyn Speech>) -> Self {
        Self {
            speech,
            enabled: true,
        }
    }

    pub fn with_enabled(mut self, enabled: bool) -> Self {
        self.enabled = enabled;
        self
    }

    /// Narrate `text` without awaiting the result. Failures are logged
    /// and swallowed.
    pub fn say(&self, text: impl Into<String>) {
        if !self.enabled {
            return;
        }

        let speech = Arc::clone(&self.speech);
        let text = text.into();
        tokio::spawn(async move {
            if let Err(e) = speech.narrate(&text).await {
                warn!("Narration failed: {e:#}");
            }
        });
    }
}


#[cfg(test)]
mod tests {
    use super::test_support::{BrokenSpeech, RecordingSpeech};
    use super::*;
    use std::time::Duration;

    #[tokio::test]
    async fn test_say_invokes_speech() {
        let speech = Arc::new(RecordingSpeech::default());
        let narrator = Narrator::new(speech.clone());

        narrator.say("hello");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert_eq!(*speech.spoken.lock().await, vec!["hello".to_string()]);
    }

    #[tokio::test]
    async fn test_disabled_narrator_is_silent() {
        let speech = Arc::new(RecordingSpeech::default());
        let narrator = Narrator::new(speech.clone()).with_enabled(false);

        narrator.say("hello");
        tokio::time::sleep(Duration::from_millis(50)).await;

        assert!(speech.spoken.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_speech_failure_is_swallowed() {
        let narrator = Narrator::new(Arc::new(BrokenSpeech));

        // Must not panic or propagate anywhere.
        narrator.say("hello");
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
