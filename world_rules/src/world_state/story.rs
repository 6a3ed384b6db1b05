//! Bookkeeping for one-shot rules and story events.

use serde::{Deserialize, Serialize};

/// Identifies a conditional or story event across the whole scenario.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct RuleKey {
    pub scene: String,
    pub id: String,
}

impl RuleKey {
    pub fn new(scene: impl Into<String>, id: impl Into<String>) -> Self {
        Self {
            scene: scene.into(),
            id: id.into(),
        }
    }
}

/// Where a story event came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum StoryEventSource {
    /// `then.prompt` of a triggered conditional.
    Conditional,
    /// A scene story event whose predicate matched.
    SceneEvent,
}

/// A story event that fired and is waiting to be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PendingStoryEvent {
    /// Scene and id of the rule or event that produced it.
    pub key: RuleKey,
    pub text: String,
    pub source: StoryEventSource,
}

impl PendingStoryEvent {
    pub fn new(key: RuleKey, text: impl Into<String>, source: StoryEventSource) -> Self {
        Self {
            key,
            text: text.into(),
            source,
        }
    }
}
