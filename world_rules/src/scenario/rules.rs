//! Scene rules: conditionals, story events and contingency prompts.

use serde::{Deserialize, Serialize};

use super::keyed::Keyed;
use crate::conditions::When;
use crate::delta::GameStateDelta;

/// A deterministic when/then rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Conditional {
    /// Stable key within the scene.
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub when: When,
    /// Delta merged into the turn when the rule fires. A `prompt` here is
    /// queued as a story event.
    #[serde(default)]
    pub then: GameStateDelta,
}

impl Conditional {
    pub fn new(id: impl Into<String>, when: When, then: GameStateDelta) -> Self {
        Self {
            id: id.into(),
            when,
            then,
        }
    }
}

impl Keyed for Conditional {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

/// A one-shot narrative injection.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StoryEvent {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub when: When,
    pub prompt: String,
}

impl StoryEvent {
    pub fn new(id: impl Into<String>, when: When, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            when,
            prompt: prompt.into(),
        }
    }
}

impl Keyed for StoryEvent {
    fn key(&self) -> &str {
        &self.id
    }

    fn set_key(&mut self, key: String) {
        self.id = key;
    }
}

/// Guidance for the narrator that applies while its predicate holds.
///
/// Unlike story events these are not one-shot; they are re-evaluated every turn.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ContingencyPrompt {
    #[serde(default)]
    pub when: When,
    pub prompt: String,
}
