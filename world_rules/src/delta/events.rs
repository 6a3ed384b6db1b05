//! Event records carried by a delta: items, NPCs and location exits.

use serde::{Deserialize, Serialize};

use super::null_as_default;

/// What happens to an item.
///
/// Tags the generator invents are kept as [`ItemAction::Unknown`] so one bad
/// event is skipped instead of rejecting the whole delta.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ItemAction {
    /// The player picks the item up.
    Acquire,
    /// The item changes hands, player inventory by default.
    Give,
    /// The player lets go of the item.
    Drop,
    /// The item moves between two named containers.
    Move,
    /// The item is used, and possibly consumed.
    Use,
    Unknown(String),
}

impl ItemAction {
    pub fn as_str(&self) -> &str {
        match self {
            ItemAction::Acquire => "acquire",
            ItemAction::Give => "give",
            ItemAction::Drop => "drop",
            ItemAction::Move => "move",
            ItemAction::Use => "use",
            ItemAction::Unknown(tag) => tag,
        }
    }
}

impl From<String> for ItemAction {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "acquire" => ItemAction::Acquire,
            "give" => ItemAction::Give,
            "drop" => ItemAction::Drop,
            "move" => ItemAction::Move,
            "use" => ItemAction::Use,
            _ => ItemAction::Unknown(tag),
        }
    }
}

impl From<ItemAction> for String {
    fn from(action: ItemAction) -> Self {
        action.as_str().to_string()
    }
}

impl std::fmt::Display for ItemAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Kind of container an item endpoint names.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum EndpointKind {
    Player,
    Npc,
    Location,
    Unknown(String),
}

impl EndpointKind {
    pub fn as_str(&self) -> &str {
        match self {
            EndpointKind::Player => "player",
            EndpointKind::Npc => "npc",
            EndpointKind::Location => "location",
            EndpointKind::Unknown(tag) => tag,
        }
    }
}

impl From<String> for EndpointKind {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "player" | "pc" | "inventory" => EndpointKind::Player,
            "npc" => EndpointKind::Npc,
            "location" => EndpointKind::Location,
            _ => EndpointKind::Unknown(tag),
        }
    }
}

impl From<EndpointKind> for String {
    fn from(kind: EndpointKind) -> Self {
        kind.as_str().to_string()
    }
}

impl std::fmt::Display for EndpointKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One side of an item transfer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    #[serde(rename = "type")]
    pub kind: EndpointKind,
    /// Location or NPC reference; ignored for the player.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
}

impl Endpoint {
    pub fn player() -> Self {
        Self {
            kind: EndpointKind::Player,
            name: None,
        }
    }

    pub fn npc(name: impl Into<String>) -> Self {
        Self {
            kind: EndpointKind::Npc,
            name: Some(name.into()),
        }
    }

    pub fn location(name: impl Into<String>) -> Self {
        Self {
            kind: EndpointKind::Location,
            name: Some(name.into()),
        }
    }

    /// The trimmed name, if one was given.
    pub fn name(&self) -> Option<&str> {
        self.name
            .as_deref()
            .map(str::trim)
            .filter(|name| !name.is_empty())
    }
}

/// A single item change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ItemEvent {
    pub item: String,
    pub action: ItemAction,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub from: Option<Endpoint>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub to: Option<Endpoint>,
    /// The item ceases to exist rather than changing hands.
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "std::ops::Not::not"
    )]
    pub consumed: bool,
}

impl ItemEvent {
    pub fn new(item: impl Into<String>, action: ItemAction) -> Self {
        Self {
            item: item.into(),
            action,
            from: None,
            to: None,
            consumed: false,
        }
    }

    pub fn source(mut self, endpoint: Endpoint) -> Self {
        self.from = Some(endpoint);
        self
    }

    pub fn destination(mut self, endpoint: Endpoint) -> Self {
        self.to = Some(endpoint);
        self
    }

    pub fn consumed(mut self) -> Self {
        self.consumed = true;
        self
    }
}

/// Move an NPC somewhere else.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationChange {
    pub to: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub reason: String,
}

/// Change whom an NPC follows; an empty `to` stops following.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FollowingChange {
    #[serde(default, deserialize_with = "null_as_default")]
    pub to: String,
    #[serde(
        default,
        deserialize_with = "null_as_default",
        skip_serializing_if = "String::is_empty"
    )]
    pub reason: String,
}

/// Changes to one NPC.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NpcEvent {
    pub npc_id: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location_change: Option<LocationChange>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub following_change: Option<FollowingChange>,
}

impl NpcEvent {
    pub fn move_to(npc_id: impl Into<String>, location: impl Into<String>) -> Self {
        Self {
            npc_id: npc_id.into(),
            location_change: Some(LocationChange {
                to: location.into(),
                reason: String::new(),
            }),
            following_change: None,
        }
    }

    pub fn follow(npc_id: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            npc_id: npc_id.into(),
            location_change: None,
            following_change: Some(FollowingChange {
                to: target.into(),
                reason: String::new(),
            }),
        }
    }
}

/// Passability of an exit.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ExitStatus {
    Blocked,
    Unblocked,
    Unknown(String),
}

impl ExitStatus {
    pub fn as_str(&self) -> &str {
        match self {
            ExitStatus::Blocked => "blocked",
            ExitStatus::Unblocked => "unblocked",
            ExitStatus::Unknown(tag) => tag,
        }
    }
}

impl From<String> for ExitStatus {
    fn from(tag: String) -> Self {
        match tag.trim().to_ascii_lowercase().as_str() {
            "blocked" => ExitStatus::Blocked,
            "unblocked" => ExitStatus::Unblocked,
            _ => ExitStatus::Unknown(tag),
        }
    }
}

impl From<ExitStatus> for String {
    fn from(status: ExitStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// New status for one exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExitChange {
    pub exit_id: String,
    pub status: ExitStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
}

/// Exit changes for one location.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LocationEvent {
    pub location_id: String,
    #[serde(default, deserialize_with = "null_as_default")]
    pub exit_changes: Vec<ExitChange>,
}

impl LocationEvent {
    pub fn new(location_id: impl Into<String>) -> Self {
        Self {
            location_id: location_id.into(),
            exit_changes: Vec::new(),
        }
    }

    pub fn block(mut self, exit_id: impl Into<String>, reason: impl Into<String>) -> Self {
        self.exit_changes.push(ExitChange {
            exit_id: exit_id.into(),
            status: ExitStatus::Blocked,
            reason: Some(reason.into()),
        });
        self
    }

    pub fn unblock(mut self, exit_id: impl Into<String>) -> Self {
        self.exit_changes.push(ExitChange {
            exit_id: exit_id.into(),
            status: ExitStatus::Unblocked,
            reason: None,
        });
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_action_tags() {
        assert_eq!(ItemAction::from("acquire".to_string()), ItemAction::Acquire);
        assert_eq!(ItemAction::from(" Drop ".to_string()), ItemAction::Drop);
        assert_eq!(
            ItemAction::from("juggle".to_string()),
            ItemAction::Unknown("juggle".to_string())
        );
    }

    #[test]
    fn test_unknown_tags_survive_deserialization() {
        let event: ItemEvent =
            serde_json::from_str(r#"{"item": "torch", "action": "ignite"}"#).unwrap();
        assert_eq!(event.action, ItemAction::Unknown("ignite".to_string()));
        assert!(!event.consumed);

        let change: ExitChange =
            serde_json::from_str(r#"{"exit_id": "north", "status": "sealed"}"#).unwrap();
        assert_eq!(change.status, ExitStatus::Unknown("sealed".to_string()));
    }

    #[test]
    fn test_null_fields_read_as_defaults() {
        let event: ItemEvent =
            serde_json::from_str(r#"{"item": "bread", "action": "use", "consumed": null}"#)
                .unwrap();
        assert!(!event.consumed);

        let event: LocationEvent =
            serde_json::from_str(r#"{"location_id": "dock", "exit_changes": null}"#).unwrap();
        assert!(event.exit_changes.is_empty());

        let event: NpcEvent = serde_json::from_str(
            r#"{"npc_id": "guard",
                "location_change": {"to": "gate", "reason": null},
                "following_change": {"to": null}}"#,
        )
        .unwrap();
        assert_eq!(event.location_change.map(|c| c.to).as_deref(), Some("gate"));
        assert_eq!(event.following_change.map(|c| c.to).as_deref(), Some(""));
    }

    #[test]
    fn test_endpoint_kinds() {
        let endpoint: Endpoint =
            serde_json::from_str(r#"{"type": "location", "name": "Cell"}"#).unwrap();
        assert_eq!(endpoint.kind, EndpointKind::Location);
        assert_eq!(endpoint.name(), Some("Cell"));

        let endpoint: Endpoint = serde_json::from_str(r#"{"type": "PC", "name": "  "}"#).unwrap();
        assert_eq!(endpoint.kind, EndpointKind::Player);
        assert_eq!(endpoint.name(), None);
    }

    #[test]
    fn test_serialize_uses_wire_tags() {
        let event = ItemEvent::new("key", ItemAction::Acquire).source(Endpoint::location("Cell"));
        let json = serde_json::to_value(&event).unwrap();
        assert_eq!(json["action"], "acquire");
        assert_eq!(json["from"]["type"], "location");
        assert!(json.get("consumed").is_none());
    }
}
