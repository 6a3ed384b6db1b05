//! The turn delta - the compact change-set the generator emits each turn and
//! that triggered conditionals carry in their `then` payload.

mod events;

pub use events::*;

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use std::collections::HashMap;

/// Request to switch the active scene.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneChange {
    pub to: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub reason: String,
}

/// Everything one turn changes about the world.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameStateDelta {
    /// Where the player ends up; empty means "stays put".
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_location: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub scene_change: Option<SceneChange>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub item_events: Vec<ItemEvent>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub npc_events: Vec<NpcEvent>,

    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub location_events: Vec<LocationEvent>,

    /// Variables to set. Scalar wire values are stringified.
    #[serde(
        default,
        deserialize_with = "deserialize_vars",
        skip_serializing_if = "HashMap::is_empty"
    )]
    pub set_vars: HashMap<String, String>,

    /// Narrative prompt. Only meaningful on a conditional's `then`, where it
    /// becomes a story event.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub prompt: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub game_ended: Option<bool>,
}

impl GameStateDelta {
    /// An empty delta.
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a delta from the generator's JSON.
    pub fn from_json_str(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// The requested player location, if any.
    pub fn target_location(&self) -> Option<&str> {
        self.user_location
            .as_deref()
            .map(str::trim)
            .filter(|location| !location.is_empty())
    }

    /// The requested scene, if any.
    pub fn target_scene(&self) -> Option<&str> {
        self.scene_change
            .as_ref()
            .map(|change| change.to.trim())
            .filter(|scene| !scene.is_empty())
    }

    /// The story-event text carried by this delta, if any.
    pub fn story_prompt(&self) -> Option<&str> {
        self.prompt
            .as_deref()
            .map(str::trim)
            .filter(|prompt| !prompt.is_empty())
    }

    /// True when applying the delta would change nothing.
    pub fn is_empty(&self) -> bool {
        self.target_location().is_none()
            && self.target_scene().is_none()
            && self.item_events.is_empty()
            && self.npc_events.is_empty()
            && self.location_events.is_empty()
            && self.set_vars.is_empty()
            && self.game_ended.is_none()
    }

    /// Fold a triggered conditional's `then` payload into this delta.
    ///
    /// Scene change, game end and player location are overwritten when the
    /// payload sets them; variables are merged key by key with the payload
    /// winning; event lists are appended. The prompt is left alone.
    pub fn merge_conditional(&mut self, then: &GameStateDelta) {
        if then.target_scene().is_some() {
            self.scene_change = then.scene_change.clone();
        }

        if then.game_ended.is_some() {
            self.game_ended = then.game_ended;
        }

        if let Some(location) = then.target_location() {
            self.user_location = Some(location.to_string());
        }

        self.set_vars
            .extend(then.set_vars.iter().map(|(k, v)| (k.clone(), v.clone())));
        self.item_events.extend(then.item_events.iter().cloned());
        self.npc_events.extend(then.npc_events.iter().cloned());
        self.location_events
            .extend(then.location_events.iter().cloned());
    }

    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.user_location = Some(location.into());
        self
    }

    pub fn with_scene_change(
        mut self,
        scene: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        self.scene_change = Some(SceneChange {
            to: scene.into(),
            reason: reason.into(),
        });
        self
    }

    pub fn with_item_event(mut self, event: ItemEvent) -> Self {
        self.item_events.push(event);
        self
    }

    pub fn with_npc_event(mut self, event: NpcEvent) -> Self {
        self.npc_events.push(event);
        self
    }

    pub fn with_location_event(mut self, event: LocationEvent) -> Self {
        self.location_events.push(event);
        self
    }

    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.set_vars.insert(key.into(), value.into());
        self
    }

    pub fn with_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.prompt = Some(prompt.into());
        self
    }

    pub fn with_game_ended(mut self, ended: bool) -> Self {
        self.game_ended = Some(ended);
        self
    }
}

/// Treat an explicit `null` like a missing field.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn deserialize_vars<'de, D>(deserializer: D) -> Result<HashMap<String, String>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw: Option<HashMap<String, Value>> = Option::deserialize(deserializer)?;
    Ok(raw
        .unwrap_or_default()
        .into_iter()
        .filter_map(|(key, value)| match value {
            Value::Null => None,
            Value::String(text) => Some((key, text)),
            other => Some((key, other.to_string())),
        })
        .collect())
}
