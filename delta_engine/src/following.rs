//! Following synchronization - followers end every turn next to whoever they
//! follow.
//!
//! Follow edges form chains (the guard follows the captain who follows the
//! player). Each chain is walked to its end and every NPC on it takes the end's
//! location, so a whole chain catches up within a single turn. Cycles are
//! detected up front; NPCs on a cycle stay where they are.

use std::collections::{HashMap, HashSet};

use world_rules::GameState;

use crate::config::EngineConfig;

/// Where a follow edge points.
#[derive(Debug, Clone, PartialEq, Eq)]
enum FollowTarget {
    Player,
    Npc(String),
    /// Named target does not resolve.
    Missing,
}

/// Move every follower to its target's location. Returns the ids of NPCs that
/// moved, sorted.
pub fn sync_followers(state: &mut GameState, config: &EngineConfig) -> Vec<String> {
    let edges = follow_edges(state, config);
    if edges.is_empty() {
        return Vec::new();
    }

    let on_cycle = cycle_members(&edges);
    for npc_id in sorted(&on_cycle) {
        tracing::warn!(npc = %npc_id, "npc is part of a following cycle, leaving it in place");
    }

    let mut resolved: HashMap<String, String> = HashMap::new();
    let mut follower_ids: Vec<&String> = edges.keys().collect();
    follower_ids.sort();

    for npc_id in follower_ids {
        if resolved.contains_key(npc_id) {
            continue;
        }

        // Walk the chain until a resolved NPC, the player or a chain end.
        let mut path: Vec<String> = Vec::new();
        let mut current = npc_id.clone();
        let location = loop {
            if let Some(location) = resolved.get(&current) {
                break Some(location.clone());
            }
            if path.len() > edges.len() {
                tracing::warn!(
                    npc = %npc_id,
                    "follow chain did not terminate, leaving it in place"
                );
                break None;
            }
            path.push(current.clone());

            let edge = if on_cycle.contains(&current) {
                None
            } else {
                edges.get(&current)
            };
            match edge {
                Some(FollowTarget::Player) => break Some(state.location.clone()),
                Some(FollowTarget::Npc(target_id)) => current = target_id.clone(),
                Some(FollowTarget::Missing) | None => {
                    break state.entities.npcs.get(&current).map(|npc| npc.location.clone())
                }
            }
        };

        if let Some(location) = location {
            for id in path {
                resolved.insert(id, location.clone());
            }
        }
    }

    let mut moved = Vec::new();
    for (npc_id, location) in resolved {
        if let Some(npc) = state.entities.npcs.get_mut(&npc_id) {
            if npc.location != location {
                tracing::info!(
                    npc = %npc_id,
                    from = %npc.location,
                    to = %location,
                    "follower moved"
                );
                npc.location = location;
                moved.push(npc_id);
            }
        }
    }
    moved.sort();
    moved
}

/// Follow edge of every NPC that follows someone.
fn follow_edges(state: &GameState, config: &EngineConfig) -> HashMap<String, FollowTarget> {
    state
        .entities
        .npcs
        .iter()
        .filter_map(|(npc_id, npc)| {
            let target = npc.follow_target()?;
            let edge = if config.is_player_token(target) {
                FollowTarget::Player
            } else {
                match state.entities.resolve_npc(target) {
                    Some(target_id) => FollowTarget::Npc(target_id),
                    None => {
                        tracing::warn!(npc = %npc_id, target = %target, "follow target not found");
                        FollowTarget::Missing
                    }
                }
            };
            Some((npc_id.clone(), edge))
        })
        .collect()
}

/// NPCs whose follow chain leads back to themselves.
fn cycle_members(edges: &HashMap<String, FollowTarget>) -> HashSet<String> {
    let mut members = HashSet::new();
    for start in edges.keys() {
        let mut visited = HashSet::new();
        let mut current = start;
        while let Some(FollowTarget::Npc(next)) = edges.get(current) {
            if next == start {
                members.insert(start.clone());
                break;
            }
            if !visited.insert(next) {
                break;
            }
            current = next;
        }
    }
    members
}

fn sorted(ids: &HashSet<String>) -> Vec<&String> {
    let mut ids: Vec<_> = ids.iter().collect();
    ids.sort();
    ids
}
