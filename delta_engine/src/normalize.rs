//! Item singleton normalization.
//!
//! An item name lives in at most one container. Player inventory beats NPC
//! possession, which beats location presence. Ties between two NPCs or two
//! locations go to the smallest id. Normalization only removes duplicates; an
//! item that was anywhere before is somewhere afterwards.

use std::collections::HashSet;

use world_rules::GameState;

/// Enforce the singleton invariant. Returns how many duplicate entries were
/// removed.
pub fn normalize_items(state: &mut GameState) -> usize {
    let mut removed = 0;

    let mut player_items: HashSet<String> = HashSet::new();
    let before = state.inventory.len();
    state.inventory.retain(|item| player_items.insert(item.clone()));
    removed += before - state.inventory.len();

    let mut npc_ids: Vec<String> = state.entities.npcs.keys().cloned().collect();
    npc_ids.sort();
    let mut npc_items: HashSet<String> = HashSet::new();
    for npc_id in &npc_ids {
        if let Some(npc) = state.entities.npcs.get_mut(npc_id) {
            let before = npc.items.len();
            npc.items
                .retain(|item| !player_items.contains(item) && npc_items.insert(item.clone()));
            removed += before - npc.items.len();
        }
    }

    let mut location_ids: Vec<String> = state.entities.locations.keys().cloned().collect();
    location_ids.sort();
    let mut location_items: HashSet<String> = HashSet::new();
    for location_id in &location_ids {
        if let Some(location) = state.entities.locations.get_mut(location_id) {
            let before = location.items.len();
            location.items.retain(|item| {
                !player_items.contains(item)
                    && !npc_items.contains(item)
                    && location_items.insert(item.clone())
            });
            removed += before - location.items.len();
        }
    }

    if removed > 0 {
        tracing::debug!(removed, "removed duplicate item entries");
    }
    removed
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeSet;
    use world_rules::{Location, Npc};

    fn messy_state() -> GameState {
        let mut state = GameState::default();
        state.inventory = vec!["key".into(), "lamp".into(), "key".into()];

        state.entities.npcs.insert(
            "guard".into(),
            Npc::new("Guard", "gate")
                .with_item("key")
                .with_item("sword")
                .with_item("coin"),
        );
        state.entities.npcs.insert(
            "cook".into(),
            Npc::new("Cook", "galley").with_item("coin").with_item("ladle"),
        );

        state.entities.locations.insert(
            "gate".into(),
            Location::new("Gate")
                .with_item("sword")
                .with_item("lamp")
                .with_item("rope"),
        );
        state.entities.locations.insert(
            "cell".into(),
            Location::new("Cell").with_item("rope").with_item("straw").with_item("straw"),
        );
        state
    }

    fn all_items(state: &GameState) -> BTreeSet<String> {
        let mut items: BTreeSet<String> = state.inventory.iter().cloned().collect();
        for npc in state.entities.npcs.values() {
            items.extend(npc.items.iter().cloned());
        }
        for location in state.entities.locations.values() {
            items.extend(location.items.iter().cloned());
        }
        items
    }

    fn count(state: &GameState, item: &str) -> usize {
        state.inventory.iter().filter(|i| *i == item).count()
            + state
                .entities
                .npcs
                .values()
                .map(|npc| npc.items.iter().filter(|i| *i == item).count())
                .sum::<usize>()
            + state
                .entities
                .locations
                .values()
                .map(|loc| loc.items.iter().filter(|i| *i == item).count())
                .sum::<usize>()
    }

    #[test]
    fn test_priority_order() {
        let mut state = messy_state();
        normalize_items(&mut state);

        assert_eq!(state.inventory, vec!["key", "lamp"]);
        assert_eq!(state.entities.npcs["guard"].items, vec!["sword"]);
        assert_eq!(state.entities.npcs["cook"].items, vec!["coin", "ladle"]);
        assert!(state.entities.locations["gate"].items.is_empty());
        assert_eq!(state.entities.locations["cell"].items, vec!["rope", "straw"]);
    }

    #[test]
    fn test_every_item_ends_in_exactly_one_container() {
        let mut state = messy_state();
        let before = all_items(&state);

        normalize_items(&mut state);

        assert_eq!(all_items(&state), before, "normalization never deletes");
        for item in &before {
            assert_eq!(count(&state, item), 1, "{item} should be a singleton");
        }
    }

    #[test]
    fn test_idempotent() {
        let mut state = messy_state();
        let removed = normalize_items(&mut state);
        assert_eq!(removed, 7);

        let once = state.clone();
        assert_eq!(normalize_items(&mut state), 0);
        assert_eq!(state, once);
    }

    #[test]
    fn test_clean_state_untouched() {
        let mut state = GameState::default();
        state.inventory.push("key".into());
        state
            .entities
            .locations
            .insert("cell".into(), Location::new("Cell").with_item("straw"));
        let before = state.clone();

        assert_eq!(normalize_items(&mut state), 0);
        assert_eq!(state, before);
    }
}
