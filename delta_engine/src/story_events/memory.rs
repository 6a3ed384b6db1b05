//! In-memory story event sink for development and testing.

use std::sync::Mutex;

use serde::{Deserialize, Serialize};
use world_rules::SessionId;

use super::{SinkError, StoryEventSink};

/// A story event the sink accepted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueuedStoryEvent {
    pub session_id: SessionId,
    pub text: String,
}

#[derive(Debug, Default)]
struct MemorySinkInner {
    events: Vec<QueuedStoryEvent>,
    rejecting: bool,
}

/// Vec-backed sink. Can be switched to reject events to simulate an outage.
#[derive(Debug, Default)]
pub struct MemorySink {
    inner: Mutex<MemorySinkInner>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make subsequent `enqueue` calls fail (or succeed again).
    pub fn set_rejecting(&self, rejecting: bool) {
        if let Ok(mut inner) = self.inner.lock() {
            inner.rejecting = rejecting;
        }
    }

    /// Everything accepted so far, oldest first.
    pub fn events(&self) -> Vec<QueuedStoryEvent> {
        self.inner
            .lock()
            .map(|inner| inner.events.clone())
            .unwrap_or_default()
    }

    /// Texts accepted so far, oldest first.
    pub fn texts(&self) -> Vec<String> {
        self.events().into_iter().map(|event| event.text).collect()
    }
}

impl StoryEventSink for MemorySink {
    fn enqueue(&self, session_id: SessionId, event_text: &str) -> Result<(), SinkError> {
        let mut inner = self
            .inner
            .lock()
            .map_err(|_| SinkError::Unavailable("memory sink lock poisoned".to_string()))?;
        if inner.rejecting {
            return Err(SinkError::Unavailable("memory sink is rejecting".to_string()));
        }
        inner.events.push(QueuedStoryEvent {
            session_id,
            text: event_text.to_string(),
        });
        Ok(())
    }
}
