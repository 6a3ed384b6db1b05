//! Delta Worker - turns one generator delta into world changes.
//!
//! A turn runs four steps over a single borrowed [`GameState`]:
//! 1. **Variables**: `set_vars` land in the session variables
//! 2. **Conditionals**: matching scene rules merge their `then` payloads
//! 3. **Story events**: newly fired narrative events go to the sink
//! 4. **Apply**: the merged delta mutates scene, locations, items and NPCs
//!
//! Steps can be driven one by one or all at once with
//! [`DeltaWorker::process_turn`].

mod apply;
mod items;
mod merge;

use serde::{Deserialize, Serialize};
use world_rules::{GameState, GameStateDelta, PendingStoryEvent, Scenario};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::story_events::StoryEventSink;

/// What a processed turn fired.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TurnReport {
    /// Conditionals whose `then` payload was merged, in declaration order.
    pub fired_conditionals: Vec<String>,
    /// Story events the sink accepted.
    pub queued_events: Vec<String>,
}

/// Applies one turn's delta to one session.
///
/// The worker holds the session state mutably for its whole life, so only one
/// delta can be in flight per state.
pub struct DeltaWorker<'a> {
    scenario: &'a Scenario,
    state: &'a mut GameState,
    sink: &'a dyn StoryEventSink,
    config: EngineConfig,
    delta: GameStateDelta,
    pending: Vec<PendingStoryEvent>,
}

impl<'a> DeltaWorker<'a> {
    /// Create a worker with default configuration.
    pub fn new(
        scenario: &'a Scenario,
        state: &'a mut GameState,
        sink: &'a dyn StoryEventSink,
        delta: GameStateDelta,
    ) -> Self {
        Self {
            scenario,
            state,
            sink,
            config: EngineConfig::default(),
            delta,
            pending: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// The working delta, including merged conditional payloads.
    pub fn delta(&self) -> &GameStateDelta {
        &self.delta
    }

    pub fn into_delta(self) -> GameStateDelta {
        self.delta
    }

    /// Story events fired this turn but not yet handed to the sink.
    pub fn pending_events(&self) -> &[PendingStoryEvent] {
        &self.pending
    }

    /// Merge `set_vars` into the session variables.
    ///
    /// Keys are normalized to lower snake case. Keys that normalize to nothing
    /// are skipped with a warning.
    pub fn apply_vars(&mut self) {
        apply::apply_var_map(self.state, &self.delta.set_vars);
    }

    /// Run a whole turn: variables, conditionals, story events, apply.
    ///
    /// Counters are not advanced here; call [`GameState::advance_turn`] once
    /// the turn is committed.
    pub fn process_turn(&mut self) -> Result<TurnReport, EngineError> {
        self.apply_vars();
        let fired_conditionals = self.apply_conditional_overrides();
        let queued_events = self.queue_story_events();
        self.apply()?;

        tracing::debug!(
            session = %self.state.session_id,
            fired = fired_conditionals.len(),
            queued = queued_events.len(),
            "turn processed"
        );

        Ok(TurnReport {
            fired_conditionals,
            queued_events,
        })
    }
}
