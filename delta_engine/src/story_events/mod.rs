//! Story event port - the side channel triggered narrative events leave by.
//!
//! The engine hands each fired event to a [`StoryEventSink`] and records it as
//! delivered once the sink accepts it. Refused events wait in the session's
//! story backlog for a later turn. What the sink does with the text (queueing,
//! narration, persistence) is up to the surrounding pipeline.

mod memory;

pub use memory::*;

use thiserror::Error;
use world_rules::SessionId;

/// Why a sink refused an event.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SinkError {
    #[error("story event rejected: {0}")]
    Rejected(String),

    #[error("story event queue unavailable: {0}")]
    Unavailable(String),
}

/// Receives story events for narration.
#[cfg_attr(test, mockall::automock)]
pub trait StoryEventSink: Send + Sync {
    fn enqueue(&self, session_id: SessionId, event_text: &str) -> Result<(), SinkError>;
}
