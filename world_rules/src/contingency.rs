//! Contingency prompts currently in effect.

use crate::scenario::{ContingencyPrompt, Scenario};
use crate::world_state::GameState;

/// Prompts whose predicate matches `state`, in scope order: scenario, active
/// scene, the player's location, then NPCs present at that location by id.
pub fn active_contingency_prompts<'a>(
    scenario: &'a Scenario,
    state: &'a GameState,
) -> Vec<&'a str> {
    let mut scopes: Vec<&'a [ContingencyPrompt]> = vec![scenario.contingency_prompts.as_slice()];

    if let Some(scene) = scenario.scene(&state.scene_id) {
        scopes.push(scene.contingency_prompts.as_slice());
    }

    if let Some(location) = state.current_location() {
        scopes.push(location.contingency_prompts.as_slice());
    }

    for npc_id in state.npcs_at(&state.location) {
        if let Some(npc) = state.entities.npcs.get(npc_id) {
            scopes.push(npc.contingency_prompts.as_slice());
        }
    }

    scopes
        .into_iter()
        .flatten()
        .filter(|contingency| contingency.when.matches(state))
        .map(|contingency| contingency.prompt.as_str())
        .collect()
}
