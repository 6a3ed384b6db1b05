//! Locations and NPCs - the scene-scoped entities a session mirrors and mutates.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use super::ContingencyPrompt;
use crate::lookup::{eq_ignore_case, Named};

/// A place the player can stand in.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Location {
    pub name: String,
    pub description: String,
    /// Direction -> destination location id.
    pub exits: BTreeMap<String, String>,
    /// Direction -> reason the exit is currently impassable.
    pub blocked_exits: BTreeMap<String, String>,
    pub items: Vec<String>,
    /// Visibility hint for prompt assembly.
    pub important: bool,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contingency_prompts: Vec<ContingencyPrompt>,
}

impl Location {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Default::default()
        }
    }

    pub fn with_exit(
        mut self,
        direction: impl Into<String>,
        destination: impl Into<String>,
    ) -> Self {
        self.exits.insert(direction.into(), destination.into());
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }

    /// Resolve an exit reference to its direction key.
    ///
    /// Accepts the direction itself, the direction ignoring case, or the
    /// destination location id.
    pub fn resolve_exit(&self, exit_id: &str) -> Option<String> {
        let exit_id = exit_id.trim();
        if self.exits.contains_key(exit_id) {
            return Some(exit_id.to_string());
        }
        self.exits
            .keys()
            .find(|direction| eq_ignore_case(direction, exit_id))
            .or_else(|| {
                self.exits
                    .iter()
                    .find(|(_, destination)| eq_ignore_case(destination, exit_id))
                    .map(|(direction, _)| direction)
            })
            .cloned()
    }

    /// Whether the exit in `direction` is currently blocked.
    pub fn is_blocked(&self, direction: &str) -> bool {
        self.blocked_exits.contains_key(direction)
    }

    /// Exits the player can take right now.
    pub fn open_exits(&self) -> impl Iterator<Item = (&String, &String)> {
        self.exits
            .iter()
            .filter(|(direction, _)| !self.blocked_exits.contains_key(*direction))
    }
}

impl Named for Location {
    fn display_name(&self) -> &str {
        &self.name
    }
}

/// A non-player character.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Npc {
    pub name: String,
    pub description: String,
    /// Id of the location the NPC stands in.
    pub location: String,
    /// Empty, a player token, or another NPC's id or name.
    pub following: String,
    pub items: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub contingency_prompts: Vec<ContingencyPrompt>,
}

impl Npc {
    pub fn new(name: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            location: location.into(),
            ..Default::default()
        }
    }

    pub fn following(mut self, target: impl Into<String>) -> Self {
        self.following = target.into();
        self
    }

    pub fn with_item(mut self, item: impl Into<String>) -> Self {
        self.items.push(item.into());
        self
    }

    /// The trimmed follow target, if the NPC follows anyone.
    pub fn follow_target(&self) -> Option<&str> {
        Some(self.following.trim()).filter(|target| !target.is_empty())
    }
}

impl Named for Npc {
    fn display_name(&self) -> &str {
        &self.name
    }
}
