//! World state - the mutable per-session record of where everything is.

mod story;
mod variables;

pub use story::*;
pub use variables::*;

use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use uuid::Uuid;

use crate::conditions::ConditionContext;
use crate::lookup::{resolve_key, EntityKind};
use crate::scenario::{Location, Npc, Scenario, ScenarioError, Scene};

/// Unique identifier for a play session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct SessionId(pub Uuid);

impl SessionId {
    /// Create a new random session ID.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Create a session ID from a specific UUID.
    pub fn from_uuid(uuid: Uuid) -> Self {
        Self(uuid)
    }
}

impl Default for SessionId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for SessionId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Session copies of one scene's locations and NPCs.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SceneEntities {
    pub locations: HashMap<String, Location>,
    pub npcs: HashMap<String, Npc>,
}

impl SceneEntities {
    /// Copy a scene's entities for a session.
    pub fn from_scene(scene: &Scene) -> Self {
        Self {
            locations: scene.locations.clone(),
            npcs: scene.npcs.clone(),
        }
    }

    /// Resolve a location or NPC reference to its id.
    pub fn resolve(&self, kind: EntityKind, query: &str) -> Option<String> {
        match kind {
            EntityKind::Location => resolve_key(&self.locations, query),
            EntityKind::Npc => resolve_key(&self.npcs, query),
            EntityKind::Scene => None,
        }
    }

    pub fn resolve_location(&self, query: &str) -> Option<String> {
        self.resolve(EntityKind::Location, query)
    }

    pub fn resolve_npc(&self, query: &str) -> Option<String> {
        self.resolve(EntityKind::Npc, query)
    }
}

/// The complete state of one session at any point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameState {
    pub session_id: SessionId,

    pub scenario_name: String,

    /// Id of the active scene.
    pub scene_id: String,

    /// Id of the player's location.
    pub location: String,

    pub turn_counter: u32,

    /// Turns since the active scene was entered.
    pub scene_turn_counter: u32,

    /// Session variables, keys normalized.
    pub vars: HashMap<String, String>,

    /// Items the player carries.
    pub inventory: Vec<String>,

    /// Mirrors of the active scene's locations and NPCs.
    pub entities: SceneEntities,

    /// Mirrors of previously visited scenes, restored on re-entry.
    #[serde(default)]
    pub dormant_scenes: HashMap<String, SceneEntities>,

    /// Conditionals whose payload was applied, and story events that fired.
    #[serde(default)]
    pub fired: BTreeSet<RuleKey>,

    /// Story events the sink accepted.
    #[serde(default)]
    pub delivered: BTreeSet<RuleKey>,

    /// Fired story events the sink has not accepted yet, oldest first.
    #[serde(default)]
    pub story_backlog: Vec<PendingStoryEvent>,

    pub ended: bool,
}

impl GameState {
    /// Start a new session in the scenario's opening scene.
    pub fn new(scenario: &Scenario) -> Result<Self, ScenarioError> {
        Self::with_session_id(scenario, SessionId::new())
    }

    /// Start a session with a caller-chosen id.
    pub fn with_session_id(
        scenario: &Scenario,
        session_id: SessionId,
    ) -> Result<Self, ScenarioError> {
        let mut state = Self {
            session_id,
            scenario_name: scenario.name.clone(),
            ..Default::default()
        };
        state.enter_scene(scenario, &scenario.opening_scene, true)?;
        Ok(state)
    }

    /// Make `scene_id` the active scene.
    ///
    /// The outgoing scene's mirrors are stashed when `persist` is set, and the
    /// incoming scene's stash (if any) is restored instead of reloading it from
    /// the scenario. Scene variables seed keys the session has not set yet.
    /// The scene-turn counter restarts and the player is moved to the scene's
    /// entry location if their current location is not part of it.
    ///
    /// Fails without touching the state if the scene is unknown or has no
    /// location to put the player in.
    pub fn enter_scene(
        &mut self,
        scenario: &Scenario,
        scene_id: &str,
        persist: bool,
    ) -> Result<(), ScenarioError> {
        let scene = scenario
            .scene(scene_id)
            .ok_or_else(|| ScenarioError::UnknownScene(scene_id.to_string()))?;
        let entry_location = scene
            .entry_location()
            .ok_or_else(|| ScenarioError::EmptyScene(scene_id.to_string()))?;

        let incoming = if persist {
            self.dormant_scenes.remove(scene_id)
        } else {
            None
        }
        .unwrap_or_else(|| SceneEntities::from_scene(scene));

        let outgoing = std::mem::replace(&mut self.entities, incoming);
        if persist && !self.scene_id.is_empty() {
            self.dormant_scenes.insert(self.scene_id.clone(), outgoing);
        }

        self.scene_id = scene_id.to_string();
        self.scene_turn_counter = 0;

        for (key, value) in &scene.vars {
            let key = normalize_var_key(key);
            if !key.is_empty() {
                self.vars.entry(key).or_insert_with(|| value.clone());
            }
        }

        if !self.entities.locations.contains_key(&self.location) {
            self.location = entry_location;
        }

        Ok(())
    }

    /// Count a played turn.
    pub fn advance_turn(&mut self) {
        self.turn_counter = self.turn_counter.saturating_add(1);
        self.scene_turn_counter = self.scene_turn_counter.saturating_add(1);
    }

    /// Set a variable, normalizing its key. Empty keys are ignored.
    pub fn set_var(&mut self, key: &str, value: impl Into<String>) -> bool {
        let key = normalize_var_key(key);
        if key.is_empty() {
            return false;
        }
        self.vars.insert(key, value.into());
        true
    }

    /// Get a variable by (unnormalized) key.
    pub fn get_var(&self, key: &str) -> Option<&str> {
        self.vars.get(&normalize_var_key(key)).map(String::as_str)
    }

    /// Whether the player carries `item`.
    pub fn has_item(&self, item: &str) -> bool {
        self.inventory.iter().any(|held| held == item)
    }

    /// The player's current location record.
    pub fn current_location(&self) -> Option<&Location> {
        self.entities.locations.get(&self.location)
    }

    /// Ids of NPCs standing in `location`, sorted.
    pub fn npcs_at(&self, location: &str) -> Vec<&str> {
        let mut ids: Vec<_> = self
            .entities
            .npcs
            .iter()
            .filter(|(_, npc)| npc.location == location)
            .map(|(id, _)| id.as_str())
            .collect();
        ids.sort_unstable();
        ids
    }

    /// Whether the rule or event `id` of `scene` already fired.
    pub fn has_fired(&self, scene: &str, id: &str) -> bool {
        self.fired.contains(&RuleKey::new(scene, id))
    }

    /// Record that rule or event `id` of `scene` fired. Returns false if it
    /// was already recorded.
    pub fn mark_fired(&mut self, scene: &str, id: &str) -> bool {
        self.fired.insert(RuleKey::new(scene, id))
    }

    /// Whether the story event of `id` in `scene` reached the sink.
    pub fn has_delivered(&self, scene: &str, id: &str) -> bool {
        self.delivered.contains(&RuleKey::new(scene, id))
    }

    pub fn mark_delivered(&mut self, key: RuleKey) -> bool {
        self.delivered.insert(key)
    }

    /// Whether a story event for `key` is waiting in the backlog.
    pub fn is_backlogged(&self, key: &RuleKey) -> bool {
        self.story_backlog.iter().any(|event| &event.key == key)
    }
}

impl ConditionContext for GameState {
    fn scene_id(&self) -> &str {
        &self.scene_id
    }

    fn var(&self, key: &str) -> Option<&str> {
        self.vars.get(key).map(String::as_str)
    }

    fn turn_counter(&self) -> u32 {
        self.turn_counter
    }

    fn scene_turn_counter(&self) -> u32 {
        self.scene_turn_counter
    }

    fn current_location(&self) -> &str {
        &self.location
    }
}
