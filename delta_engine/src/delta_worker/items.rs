//! Item event handlers.

use world_rules::{Endpoint, EndpointKind, GameState, ItemAction, ItemEvent};

/// A resolved item container.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Container {
    Inventory,
    Npc(String),
    Location(String),
}

impl std::fmt::Display for Container {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Container::Inventory => f.write_str("inventory"),
            Container::Npc(id) => write!(f, "npc:{id}"),
            Container::Location(id) => write!(f, "location:{id}"),
        }
    }
}

pub(super) fn apply_item_event(state: &mut GameState, event: &ItemEvent) {
    let item = event.item.trim();
    if item.is_empty() {
        tracing::warn!(action = %event.action, "item event without an item name");
        return;
    }

    match &event.action {
        ItemAction::Acquire => acquire(state, event, item),
        ItemAction::Drop => drop_item(state, event, item),
        ItemAction::Give => transfer(state, event, item, Some(Container::Inventory)),
        ItemAction::Move => transfer(state, event, item, None),
        ItemAction::Use => use_item(state, event, item),
        ItemAction::Unknown(action) => {
            tracing::warn!(item = %item, action = %action, "unknown item action, skipping");
        }
    }
}

fn acquire(state: &mut GameState, event: &ItemEvent, item: &str) {
    if !event.consumed {
        if let Some(source) = event.from.as_ref().and_then(|from| resolve(state, from)) {
            if source != Container::Inventory {
                remove(state, &source, item);
            }
        }
    }
    if add(state, &Container::Inventory, item) {
        tracing::info!(item = %item, "item acquired");
    }
}

fn drop_item(state: &mut GameState, event: &ItemEvent, item: &str) {
    let destination = match &event.to {
        Some(to) => match resolve(state, to) {
            Some(container) => Some(container),
            None => return,
        },
        None => None,
    };

    if !remove(state, &Container::Inventory, item) {
        tracing::debug!(item = %item, "dropped item was not in inventory");
    }
    if let Some(destination) = destination {
        add(state, &destination, item);
        tracing::info!(item = %item, to = %destination, "item dropped");
    } else {
        tracing::info!(item = %item, "item dropped");
    }
}

/// `give` and `move`: both endpoints resolve before anything changes.
fn transfer(
    state: &mut GameState,
    event: &ItemEvent,
    item: &str,
    default_source: Option<Container>,
) {
    let source = match &event.from {
        Some(from) => resolve(state, from),
        None => default_source,
    };
    let Some(source) = source else {
        tracing::warn!(item = %item, action = %event.action, "item source missing or not found");
        return;
    };
    let Some(destination) = event.to.as_ref().and_then(|to| resolve(state, to)) else {
        tracing::warn!(
            item = %item,
            action = %event.action,
            "item destination missing or not found"
        );
        return;
    };

    if !remove(state, &source, item) {
        tracing::debug!(item = %item, from = %source, "item was not at its source");
    }
    add(state, &destination, item);
    tracing::info!(
        item = %item,
        from = %source,
        to = %destination,
        action = %event.action,
        "item transferred"
    );
}

fn use_item(state: &mut GameState, event: &ItemEvent, item: &str) {
    if !event.consumed {
        return;
    }
    let source = match &event.from {
        Some(from) => resolve(state, from),
        None => Some(Container::Inventory),
    };
    let Some(source) = source else {
        return;
    };
    if remove(state, &source, item) {
        tracing::info!(item = %item, from = %source, "item consumed");
    }
}

fn resolve(state: &GameState, endpoint: &Endpoint) -> Option<Container> {
    let container = match &endpoint.kind {
        EndpointKind::Player => Some(Container::Inventory),
        EndpointKind::Npc => endpoint
            .name()
            .and_then(|name| state.entities.resolve_npc(name))
            .map(Container::Npc),
        EndpointKind::Location => {
            let location = match endpoint.name() {
                Some(name) => state.entities.resolve_location(name),
                // No name means where the player stands.
                None => state.current_location().map(|_| state.location.clone()),
            };
            location.map(Container::Location)
        }
        EndpointKind::Unknown(kind) => {
            tracing::warn!(kind = %kind, "unknown item endpoint type");
            return None;
        }
    };

    if container.is_none() {
        tracing::warn!(
            kind = %endpoint.kind,
            name = endpoint.name().unwrap_or_default(),
            "item endpoint not found"
        );
    }
    container
}

fn items_mut<'s>(state: &'s mut GameState, container: &Container) -> Option<&'s mut Vec<String>> {
    match container {
        Container::Inventory => Some(&mut state.inventory),
        Container::Npc(id) => state.entities.npcs.get_mut(id).map(|npc| &mut npc.items),
        Container::Location(id) => state
            .entities
            .locations
            .get_mut(id)
            .map(|location| &mut location.items),
    }
}

/// Remove every copy of `item`. Returns whether anything was removed.
fn remove(state: &mut GameState, container: &Container, item: &str) -> bool {
    let Some(items) = items_mut(state, container) else {
        return false;
    };
    let before = items.len();
    items.retain(|held| held != item);
    items.len() != before
}

/// Add `item` unless it is already there. Returns whether it was added.
fn add(state: &mut GameState, container: &Container, item: &str) -> bool {
    let Some(items) = items_mut(state, container) else {
        return false;
    };
    if items.iter().any(|held| held == item) {
        return false;
    }
    items.push(item.to_string());
    true
}

#[cfg(test)]
mod tests {
    use super::*;
    use world_rules::{Location, Npc};

    fn state() -> GameState {
        let mut state = GameState::default();
        state.location = "cell".into();
        state.inventory.push("lamp".into());
        state
            .entities
            .locations
            .insert("cell".into(), Location::new("Cell").with_item("key"));
        state
            .entities
            .locations
            .insert("hall".into(), Location::new("Great Hall"));
        state.entities.npcs.insert(
            "renfield".into(),
            Npc::new("Renfield", "hall").with_item("fly"),
        );
        state
    }

    #[test]
    fn test_acquire_without_source_keeps_location_copy() {
        let mut state = state();
        apply_item_event(&mut state, &ItemEvent::new("key", ItemAction::Acquire));

        assert!(state.has_item("key"));
        assert_eq!(state.entities.locations["cell"].items, vec!["key"]);

        apply_item_event(&mut state, &ItemEvent::new("key", ItemAction::Acquire));
        assert_eq!(state.inventory, vec!["lamp", "key"]);
    }

    #[test]
    fn test_acquire_consumed_leaves_source() {
        let mut state = state();
        let event = ItemEvent::new("key", ItemAction::Acquire)
            .source(Endpoint::location("cell"))
            .consumed();

        apply_item_event(&mut state, &event);

        assert!(state.has_item("key"));
        assert_eq!(state.entities.locations["cell"].items, vec!["key"]);
    }

    #[test]
    fn test_drop_to_current_location() {
        let mut state = state();
        let event = ItemEvent::new("lamp", ItemAction::Drop).destination(Endpoint {
            kind: EndpointKind::Location,
            name: None,
        });

        apply_item_event(&mut state, &event);

        assert!(!state.has_item("lamp"));
        assert_eq!(state.entities.locations["cell"].items, vec!["key", "lamp"]);
    }

    #[test]
    fn test_drop_to_unknown_destination_keeps_item() {
        let mut state = state();
        let event =
            ItemEvent::new("lamp", ItemAction::Drop).destination(Endpoint::location("Attic"));

        apply_item_event(&mut state, &event);

        assert!(state.has_item("lamp"));
    }

    #[test]
    fn test_drop_without_destination() {
        let mut state = state();
        apply_item_event(&mut state, &ItemEvent::new("lamp", ItemAction::Drop));
        assert!(state.inventory.is_empty());
    }

    #[test]
    fn test_give_defaults_to_inventory() {
        let mut state = state();
        let event = ItemEvent::new("lamp", ItemAction::Give).destination(Endpoint::npc("renfield"));

        apply_item_event(&mut state, &event);

        assert!(!state.has_item("lamp"));
        assert_eq!(state.entities.npcs["renfield"].items, vec!["fly", "lamp"]);
    }

    #[test]
    fn test_give_from_npc_to_player() {
        let mut state = state();
        let event = ItemEvent::new("fly", ItemAction::Give)
            .source(Endpoint::npc("RENFIELD"))
            .destination(Endpoint::player());

        apply_item_event(&mut state, &event);

        assert!(state.has_item("fly"));
        assert!(state.entities.npcs["renfield"].items.is_empty());
    }

    #[test]
    fn test_move_requires_both_endpoints() {
        let mut state = state();
        let missing_source = ItemEvent::new("key", ItemAction::Move)
            .destination(Endpoint::location("Great Hall"));
        apply_item_event(&mut state, &missing_source);
        assert_eq!(state.entities.locations["cell"].items, vec!["key"]);
        assert!(state.entities.locations["hall"].items.is_empty());

        let unresolved = ItemEvent::new("key", ItemAction::Move)
            .source(Endpoint::location("Cell"))
            .destination(Endpoint::npc("Van Helsing"));
        apply_item_event(&mut state, &unresolved);
        assert_eq!(state.entities.locations["cell"].items, vec!["key"]);

        let event = ItemEvent::new("key", ItemAction::Move)
            .source(Endpoint::location("Cell"))
            .destination(Endpoint::location("Great Hall"));
        apply_item_event(&mut state, &event);
        assert!(state.entities.locations["cell"].items.is_empty());
        assert_eq!(state.entities.locations["hall"].items, vec!["key"]);
    }

    #[test]
    fn test_use_consumes_only_when_flagged() {
        let mut state = state();
        apply_item_event(&mut state, &ItemEvent::new("lamp", ItemAction::Use));
        assert!(state.has_item("lamp"));

        apply_item_event(&mut state, &ItemEvent::new("lamp", ItemAction::Use).consumed());
        assert!(!state.has_item("lamp"));

        let event = ItemEvent::new("fly", ItemAction::Use)
            .source(Endpoint::npc("Renfield"))
            .consumed();
        apply_item_event(&mut state, &event);
        assert!(state.entities.npcs["renfield"].items.is_empty());
    }

    #[test]
    fn test_unknown_action_and_endpoint_are_skipped() {
        let mut state = state();
        let before = state.clone();

        apply_item_event(
            &mut state,
            &ItemEvent::new("lamp", ItemAction::Unknown("polish".into())),
        );
        let event = ItemEvent::new("lamp", ItemAction::Give).destination(Endpoint {
            kind: EndpointKind::Unknown("chest".into()),
            name: Some("chest".into()),
        });
        apply_item_event(&mut state, &event);
        apply_item_event(&mut state, &ItemEvent::new("  ", ItemAction::Acquire));

        assert_eq!(state, before);
    }
}
