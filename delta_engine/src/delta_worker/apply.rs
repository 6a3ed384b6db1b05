//! Apply phase: the merged delta mutates the session.

use std::collections::HashMap;

use world_rules::{
    eq_ignore_case, ExitStatus, GameState, GameStateDelta, Location, LocationEvent, NpcEvent,
    Scenario,
};

use crate::config::EngineConfig;
use crate::error::EngineError;
use crate::following::sync_followers;
use crate::normalize::normalize_items;

use super::items::apply_item_event;
use super::DeltaWorker;

impl<'a> DeltaWorker<'a> {
    /// Apply the merged delta.
    ///
    /// Runs in a fixed order: variables, scene change, player location, item
    /// events, NPC events, location events, game end, following sync and item
    /// normalization. Unresolved references are logged and skipped. Only a
    /// scene that resolves but cannot be loaded fails the turn.
    pub fn apply(&mut self) -> Result<(), EngineError> {
        let scenario = self.scenario;
        let config = &self.config;
        let delta = &self.delta;
        let state = &mut *self.state;

        // Conditional payloads may have added variables since `apply_vars`.
        apply_var_map(state, &delta.set_vars);

        apply_scene_change(scenario, state, delta, config)?;
        apply_location_change(state, delta);

        for event in &delta.item_events {
            apply_item_event(state, event);
        }

        for event in &delta.npc_events {
            apply_npc_event(state, event);
        }

        for event in &delta.location_events {
            apply_location_event(state, event, config);
        }

        if delta.game_ended == Some(true) && !state.ended {
            state.ended = true;
            tracing::info!(session = %state.session_id, "game ended");
        }

        sync_followers(state, config);
        normalize_items(state);
        Ok(())
    }
}

pub(super) fn apply_var_map(state: &mut GameState, vars: &HashMap<String, String>) {
    let mut keys: Vec<&String> = vars.keys().collect();
    keys.sort();
    for key in keys {
        if !state.set_var(key, vars[key].as_str()) {
            tracing::warn!(key = %key, "variable key is empty after normalization, skipping");
        }
    }
}

fn apply_scene_change(
    scenario: &Scenario,
    state: &mut GameState,
    delta: &GameStateDelta,
    config: &EngineConfig,
) -> Result<(), EngineError> {
    let Some(target) = delta.target_scene() else {
        return Ok(());
    };
    let Some(scene_id) = scenario.resolve_scene(target) else {
        tracing::warn!(scene = %target, "scene change target not found");
        return Ok(());
    };
    if scene_id == state.scene_id {
        return Ok(());
    }

    let from = state.scene_id.clone();
    state
        .enter_scene(scenario, &scene_id, config.persist_scene_state)
        .map_err(|source| EngineError::scene_load(scene_id.clone(), source))?;

    let reason = delta
        .scene_change
        .as_ref()
        .map(|change| change.reason.as_str())
        .unwrap_or_default();
    tracing::info!(from = %from, to = %scene_id, reason = %reason, "scene changed");
    Ok(())
}

fn apply_location_change(state: &mut GameState, delta: &GameStateDelta) {
    let Some(target) = delta.target_location() else {
        return;
    };
    match state.entities.resolve_location(target) {
        Some(location_id) => {
            if location_id != state.location {
                tracing::info!(from = %state.location, to = %location_id, "player moved");
                state.location = location_id;
            }
        }
        None => tracing::warn!(location = %target, "player location not found, staying put"),
    }
}

fn apply_npc_event(state: &mut GameState, event: &NpcEvent) {
    let Some(npc_id) = state.entities.resolve_npc(&event.npc_id) else {
        tracing::warn!(npc = %event.npc_id, "npc not found, skipping event");
        return;
    };

    if let Some(change) = &event.following_change {
        if let Some(npc) = state.entities.npcs.get_mut(&npc_id) {
            npc.following = change.to.trim().to_string();
            tracing::info!(npc = %npc_id, following = %npc.following, "npc following changed");
        }
    }

    if let Some(change) = &event.location_change {
        let Some(location_id) = state.entities.resolve_location(&change.to) else {
            tracing::warn!(npc = %npc_id, location = %change.to, "npc destination not found");
            return;
        };
        if let Some(npc) = state.entities.npcs.get_mut(&npc_id) {
            if npc.location != location_id {
                tracing::info!(npc = %npc_id, from = %npc.location, to = %location_id, "npc moved");
                npc.location = location_id;
            }
        }
    }
}

fn apply_location_event(state: &mut GameState, event: &LocationEvent, config: &EngineConfig) {
    let Some(location_id) = state.entities.resolve_location(&event.location_id) else {
        tracing::warn!(location = %event.location_id, "location not found, skipping exit changes");
        return;
    };
    let Some(location) = state.entities.locations.get_mut(&location_id) else {
        return;
    };

    for change in &event.exit_changes {
        if let ExitStatus::Unknown(status) = &change.status {
            tracing::warn!(
                location = %location_id,
                exit = %change.exit_id,
                status = %status,
                "unknown exit status"
            );
            continue;
        }
        let Some(direction) = resolve_exit_key(location, &change.exit_id) else {
            tracing::warn!(location = %location_id, exit = %change.exit_id, "exit not found");
            continue;
        };

        match &change.status {
            ExitStatus::Blocked => {
                let reason = change
                    .reason
                    .as_deref()
                    .map(str::trim)
                    .filter(|reason| !reason.is_empty())
                    .unwrap_or(&config.default_block_reason)
                    .to_string();
                tracing::info!(
                    location = %location_id,
                    exit = %direction,
                    reason = %reason,
                    "exit blocked"
                );
                location.blocked_exits.insert(direction, reason);
            }
            ExitStatus::Unblocked => {
                if location.blocked_exits.remove(&direction).is_some() {
                    tracing::info!(location = %location_id, exit = %direction, "exit unblocked");
                }
            }
            ExitStatus::Unknown(_) => {}
        }
    }
}

/// Exit direction an exit reference points at. Blocked directions without a
/// matching exit still resolve so they can be unblocked.
fn resolve_exit_key(location: &Location, exit_id: &str) -> Option<String> {
    location.resolve_exit(exit_id).or_else(|| {
        let exit_id = exit_id.trim();
        location
            .blocked_exits
            .keys()
            .find(|direction| eq_ignore_case(direction, exit_id))
            .cloned()
    })
}
