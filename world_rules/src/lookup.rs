//! Identifier resolution shared by scenes, locations and NPCs.
//!
//! Deltas come from a probabilistic generator, so references arrive as ids,
//! as ids in the wrong case, or as display names. Every handler resolves them
//! through [`resolve_key`] instead of re-implementing the fallbacks.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Entities that carry a human-facing name besides their map key.
pub trait Named {
    fn display_name(&self) -> &str;
}

/// Kinds of entity a reference can point at.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EntityKind {
    Scene,
    Location,
    Npc,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            EntityKind::Scene => "scene",
            EntityKind::Location => "location",
            EntityKind::Npc => "npc",
        };
        f.write_str(label)
    }
}

/// Case-insensitive comparison that also folds non-ASCII letters.
pub fn eq_ignore_case(a: &str, b: &str) -> bool {
    a.eq_ignore_ascii_case(b) || a.to_lowercase() == b.to_lowercase()
}

/// Resolve `query` to a key of `entries`.
///
/// Tries, in order: the exact key, the key ignoring case, the display name
/// ignoring case. When several entries match a fallback the smallest key wins,
/// so resolution never depends on hash order.
pub fn resolve_key<T: Named>(entries: &HashMap<String, T>, query: &str) -> Option<String> {
    let query = query.trim();
    if query.is_empty() {
        return None;
    }

    if entries.contains_key(query) {
        return Some(query.to_string());
    }

    if let Some(key) = entries.keys().filter(|key| eq_ignore_case(key, query)).min() {
        return Some(key.clone());
    }

    entries
        .iter()
        .filter(|(_, entry)| eq_ignore_case(entry.display_name().trim(), query))
        .map(|(key, _)| key)
        .min()
        .cloned()
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Thing(&'static str);

    impl Named for Thing {
        fn display_name(&self) -> &str {
            self.0
        }
    }

    fn things() -> HashMap<String, Thing> {
        let mut map = HashMap::new();
        map.insert("captain".to_string(), Thing("Captain Morgan"));
        map.insert("guard".to_string(), Thing("Gate Guard"));
        map.insert("Cellar".to_string(), Thing("Wine Cellar"));
        map
    }

    #[test]
    fn test_exact_key_wins() {
        assert_eq!(resolve_key(&things(), "captain").as_deref(), Some("captain"));
    }

    #[test]
    fn test_key_ignoring_case() {
        assert_eq!(resolve_key(&things(), "cellar").as_deref(), Some("Cellar"));
        assert_eq!(resolve_key(&things(), "GUARD").as_deref(), Some("guard"));
    }

    #[test]
    fn test_display_name_ignoring_case() {
        assert_eq!(
            resolve_key(&things(), "captain morgan").as_deref(),
            Some("captain")
        );
        assert_eq!(resolve_key(&things(), " Wine Cellar ").as_deref(), Some("Cellar"));
    }

    #[test]
    fn test_unresolved() {
        assert!(resolve_key(&things(), "dragon").is_none());
        assert!(resolve_key(&things(), "   ").is_none());
    }

    #[test]
    fn test_ambiguous_name_picks_smallest_key() {
        let mut map = HashMap::new();
        map.insert("twin_b".to_string(), Thing("Twin"));
        map.insert("twin_a".to_string(), Thing("Twin"));
        assert_eq!(resolve_key(&map, "twin").as_deref(), Some("twin_a"));
    }
}
