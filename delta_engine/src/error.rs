//! Errors that abort a turn.

use thiserror::Error;
use world_rules::ScenarioError;

/// Failures the caller must handle. Resolution problems inside a delta are
/// logged and skipped instead; they never surface here.
#[derive(Debug, Error)]
pub enum EngineError {
    /// The target scene exists but could not be loaded into the session,
    /// leaving scene-scoped data undefined.
    #[error("failed to load scene '{scene}': {source}")]
    SceneLoad {
        scene: String,
        #[source]
        source: ScenarioError,
    },

    #[error("invalid engine configuration: {0}")]
    Config(#[from] toml::de::Error),
}

impl EngineError {
    pub fn scene_load(scene: impl Into<String>, source: ScenarioError) -> Self {
        Self::SceneLoad {
            scene: scene.into(),
            source,
        }
    }
}
