//! `when` predicates - the deterministic half of scenario rules.
//!
//! A predicate is a conjunction of optional sub-conditions. Absent
//! sub-conditions do not constrain the match, but a predicate with none at all
//! never matches: an accidentally empty rule must not fire every turn.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use crate::world_state::normalize_var_key;

/// Read-only view of the world a predicate is evaluated against.
pub trait ConditionContext {
    /// Id of the active scene.
    fn scene_id(&self) -> &str;

    /// Value of a (normalized) variable, if set.
    fn var(&self, key: &str) -> Option<&str>;

    /// Turns played since the session started.
    fn turn_counter(&self) -> u32;

    /// Turns played since the active scene was entered.
    fn scene_turn_counter(&self) -> u32;

    /// Id of the player's current location.
    fn current_location(&self) -> &str;
}

/// Conjunction of world conditions.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct When {
    /// Variables that must all be set to exactly these values.
    #[serde(skip_serializing_if = "HashMap::is_empty")]
    pub vars: HashMap<String, String>,

    /// Exact session turn.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub turn_counter: Option<u32>,

    /// Exact turn within the current scene.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub scene_turn_counter: Option<u32>,

    /// Inclusive lower bound on session turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_turns: Option<u32>,

    /// Inclusive lower bound on scene turns.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_scene_turns: Option<u32>,

    /// Exact current location id.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
}

impl When {
    /// A predicate with no sub-conditions.
    pub fn new() -> Self {
        Self::default()
    }

    /// Require a variable value.
    pub fn with_var(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.vars.insert(key.into(), value.into());
        self
    }

    /// Require an exact session turn.
    pub fn with_turn(mut self, turn: u32) -> Self {
        self.turn_counter = Some(turn);
        self
    }

    /// Require an exact scene turn.
    pub fn with_scene_turn(mut self, turn: u32) -> Self {
        self.scene_turn_counter = Some(turn);
        self
    }

    /// Require at least `turns` session turns.
    pub fn with_min_turns(mut self, turns: u32) -> Self {
        self.min_turns = Some(turns);
        self
    }

    /// Require at least `turns` scene turns.
    pub fn with_min_scene_turns(mut self, turns: u32) -> Self {
        self.min_scene_turns = Some(turns);
        self
    }

    /// Require the player to stand in `location`.
    pub fn at_location(mut self, location: impl Into<String>) -> Self {
        self.location = Some(location.into());
        self
    }

    /// True when no sub-condition is set.
    pub fn is_empty(&self) -> bool {
        self.vars.is_empty()
            && self.turn_counter.is_none()
            && self.scene_turn_counter.is_none()
            && self.min_turns.is_none()
            && self.min_scene_turns.is_none()
            && self.location.is_none()
    }

    /// Evaluate the predicate against `ctx`.
    pub fn matches<C: ConditionContext + ?Sized>(&self, ctx: &C) -> bool {
        if self.is_empty() {
            tracing::trace!(scene = ctx.scene_id(), "empty when predicate never matches");
            return false;
        }

        let vars_match = self.vars.iter().all(|(key, expected)| {
            ctx.var(&normalize_var_key(key))
                .is_some_and(|actual| actual == expected)
        });
        if !vars_match {
            return false;
        }

        if self
            .turn_counter
            .is_some_and(|turn| ctx.turn_counter() != turn)
        {
            return false;
        }

        if self
            .scene_turn_counter
            .is_some_and(|turn| ctx.scene_turn_counter() != turn)
        {
            return false;
        }

        if self.min_turns.is_some_and(|min| ctx.turn_counter() < min) {
            return false;
        }

        if self
            .min_scene_turns
            .is_some_and(|min| ctx.scene_turn_counter() < min)
        {
            return false;
        }

        let matched = match &self.location {
            Some(location) => ctx.current_location() == location,
            None => true,
        };
        if matched {
            tracing::trace!(scene = ctx.scene_id(), "when predicate matched");
        }
        matched
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Snapshot {
        vars: HashMap<String, String>,
        turn: u32,
        scene_turn: u32,
        location: String,
    }

    impl Snapshot {
        fn new() -> Self {
            Self {
                vars: HashMap::new(),
                turn: 5,
                scene_turn: 2,
                location: "dock".to_string(),
            }
        }
    }

    impl ConditionContext for Snapshot {
        fn scene_id(&self) -> &str {
            "harbor"
        }

        fn var(&self, key: &str) -> Option<&str> {
            self.vars.get(key).map(String::as_str)
        }

        fn turn_counter(&self) -> u32 {
            self.turn
        }

        fn scene_turn_counter(&self) -> u32 {
            self.scene_turn
        }

        fn current_location(&self) -> &str {
            &self.location
        }
    }

    #[test]
    fn test_empty_when_never_matches() {
        let mut ctx = Snapshot::new();
        assert!(!When::new().matches(&ctx));

        ctx.turn = 0;
        ctx.scene_turn = 0;
        ctx.vars.insert("anything".into(), "true".into());
        assert!(!When::default().matches(&ctx));
    }

    #[test]
    fn test_var_match() {
        let mut ctx = Snapshot::new();
        let when = When::new().with_var("opened_grimoire", "true");

        assert!(!when.matches(&ctx), "missing variable is a non-match");

        ctx.vars.insert("opened_grimoire".into(), "false".into());
        assert!(!when.matches(&ctx));

        ctx.vars.insert("opened_grimoire".into(), "true".into());
        assert!(when.matches(&ctx));
    }

    #[test]
    fn test_var_keys_are_normalized() {
        let mut ctx = Snapshot::new();
        ctx.vars.insert("opened_grimoire".into(), "true".into());
        assert!(When::new().with_var("Opened Grimoire", "true").matches(&ctx));
    }

    #[test]
    fn test_all_vars_must_match() {
        let mut ctx = Snapshot::new();
        ctx.vars.insert("a".into(), "1".into());
        let when = When::new().with_var("a", "1").with_var("b", "2");
        assert!(!when.matches(&ctx));

        ctx.vars.insert("b".into(), "2".into());
        assert!(when.matches(&ctx));
    }

    #[test]
    fn test_exact_counters() {
        let ctx = Snapshot::new();
        assert!(When::new().with_turn(5).matches(&ctx));
        assert!(!When::new().with_turn(4).matches(&ctx));
        assert!(When::new().with_scene_turn(2).matches(&ctx));
        assert!(!When::new().with_scene_turn(3).matches(&ctx));
    }

    #[test]
    fn test_thresholds_are_inclusive() {
        let ctx = Snapshot::new();
        assert!(When::new().with_min_turns(5).matches(&ctx));
        assert!(!When::new().with_min_turns(6).matches(&ctx));
        assert!(When::new().with_min_scene_turns(2).matches(&ctx));
        assert!(!When::new().with_min_scene_turns(3).matches(&ctx));
    }

    #[test]
    fn test_location_match() {
        let ctx = Snapshot::new();
        assert!(When::new().at_location("dock").matches(&ctx));
        assert!(!When::new().at_location("market").matches(&ctx));
    }

    #[test]
    fn test_combined_conditions_short_circuit() {
        let mut ctx = Snapshot::new();
        ctx.vars.insert("alarm".into(), "raised".into());
        let when = When::new()
            .with_var("alarm", "raised")
            .with_min_turns(3)
            .at_location("market");
        assert!(!when.matches(&ctx));

        ctx.location = "market".into();
        assert!(when.matches(&ctx));
    }

    #[test]
    fn test_deserialize_when() {
        let when: When = serde_json::from_str(
            r#"{"vars": {"door": "open"}, "min_scene_turns": 1}"#,
        )
        .unwrap();
        assert_eq!(when.vars.get("door").map(String::as_str), Some("open"));
        assert_eq!(when.min_scene_turns, Some(1));
        assert!(when.location.is_none());
    }
}
