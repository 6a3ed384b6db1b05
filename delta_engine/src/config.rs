//! Engine configuration.

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

/// Tunables for applying deltas.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineConfig {
    /// `following` values (case-insensitive) that mean "follows the player".
    pub player_tokens: Vec<String>,

    /// Reason recorded when an exit is blocked without one.
    pub default_block_reason: String,

    /// Keep a scene's mutated NPCs and locations when the player leaves it,
    /// and restore them on re-entry.
    pub persist_scene_state: bool,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            player_tokens: vec!["pc".to_string(), "player".to_string()],
            default_block_reason: "blocked".to_string(),
            persist_scene_state: true,
        }
    }
}

impl EngineConfig {
    /// Load configuration from TOML; missing keys keep their defaults.
    pub fn from_toml_str(source: &str) -> Result<Self, EngineError> {
        Ok(toml::from_str(source)?)
    }

    /// Whether `target` names the player.
    pub fn is_player_token(&self, target: &str) -> bool {
        let target = target.trim();
        self.player_tokens
            .iter()
            .any(|token| token.eq_ignore_ascii_case(target))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = EngineConfig::default();
        assert!(config.is_player_token("pc"));
        assert!(config.is_player_token(" PC "));
        assert!(config.is_player_token("Player"));
        assert!(!config.is_player_token("captain"));
        assert_eq!(config.default_block_reason, "blocked");
        assert!(config.persist_scene_state);
    }

    #[test]
    fn test_partial_toml() {
        let config = EngineConfig::from_toml_str(
            r#"
            default_block_reason = "sealed"
            persist_scene_state = false
            "#,
        )
        .unwrap();

        assert_eq!(config.default_block_reason, "sealed");
        assert!(!config.persist_scene_state);
        assert!(config.is_player_token("pc"));
    }

    #[test]
    fn test_invalid_toml() {
        let err = EngineConfig::from_toml_str("persist_scene_state = \"maybe\"").unwrap_err();
        assert!(matches!(err, EngineError::Config(_)));
    }
}
