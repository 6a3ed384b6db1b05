//! Scenario model - the read-only world definition a session is played in.

pub mod keyed;
mod location;
mod rules;

pub use location::*;
pub use rules::*;

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use thiserror::Error;

use crate::lookup::{resolve_key, Named};

/// Errors raised while loading scenario data.
#[derive(Debug, Error)]
pub enum ScenarioError {
    #[error("invalid scenario TOML: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("invalid scenario JSON: {0}")]
    Json(#[from] serde_json::Error),

    #[error("opening scene '{0}' is not defined")]
    UnknownOpeningScene(String),

    #[error("scene '{0}' is not defined")]
    UnknownScene(String),

    #[error("scene '{0}' has no locations")]
    EmptyScene(String),
}

/// A complete scenario: global settings plus every scene.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Scenario {
    pub name: String,
    #[serde(default)]
    pub rating: String,
    /// Global rules handed to the narrator.
    #[serde(default)]
    pub rules: Vec<String>,
    /// Scene a new session starts in.
    pub opening_scene: String,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub contingency_prompts: Vec<ContingencyPrompt>,
    pub scenes: HashMap<String, Scene>,
}

impl Scenario {
    /// Load a scenario document written in TOML.
    pub fn from_toml_str(source: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = toml::from_str(source)?;
        scenario.check()?;
        Ok(scenario)
    }

    /// Load a scenario document written in JSON.
    pub fn from_json_str(source: &str) -> Result<Self, ScenarioError> {
        let scenario: Scenario = serde_json::from_str(source)?;
        scenario.check()?;
        Ok(scenario)
    }

    fn check(&self) -> Result<(), ScenarioError> {
        if !self.scenes.contains_key(&self.opening_scene) {
            return Err(ScenarioError::UnknownOpeningScene(
                self.opening_scene.clone(),
            ));
        }
        Ok(())
    }

    /// Get scene by id.
    pub fn scene(&self, id: &str) -> Option<&Scene> {
        self.scenes.get(id)
    }

    /// Resolve a scene reference (id, id ignoring case, or name) to its id.
    pub fn resolve_scene(&self, query: &str) -> Option<String> {
        resolve_key(&self.scenes, query)
    }
}

/// One scene: its story, entities and rules.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Scene {
    pub name: String,
    pub story: String,
    /// Where the player is placed on entry if their location is not part of
    /// this scene. Falls back to the smallest location id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub starting_location: Option<String>,
    pub locations: HashMap<String, Location>,
    pub npcs: HashMap<String, Npc>,
    /// Evaluated in declaration order.
    #[serde(with = "keyed")]
    pub conditionals: Vec<Conditional>,
    /// Evaluated in declaration order.
    #[serde(with = "keyed")]
    pub story_events: Vec<StoryEvent>,
    /// Seed values for session variables.
    pub vars: HashMap<String, String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contingency_prompts: Vec<ContingencyPrompt>,
}

impl Scene {
    /// Location the player enters this scene at.
    pub fn entry_location(&self) -> Option<String> {
        self.starting_location
            .as_ref()
            .filter(|id| self.locations.contains_key(id.as_str()))
            .cloned()
            .or_else(|| self.locations.keys().min().cloned())
    }

    /// Get conditional by id.
    pub fn conditional(&self, id: &str) -> Option<&Conditional> {
        self.conditionals.iter().find(|c| c.id == id)
    }

    /// Get story event by id.
    pub fn story_event(&self, id: &str) -> Option<&StoryEvent> {
        self.story_events.iter().find(|e| e.id == id)
    }
}

impl Named for Scene {
    fn display_name(&self) -> &str {
        &self.name
    }
}
