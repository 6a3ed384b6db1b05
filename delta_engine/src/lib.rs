//! # Delta Engine
//!
//! Applies a turn's change-set to a Waypoint session. The narrator's generator
//! emits a [`world_rules::GameStateDelta`] every turn; this crate folds in
//! whatever scenario rules the turn triggers and mutates the session's
//! [`world_rules::GameState`] to match.
//!
//! ## Core Components
//!
//! - **delta_worker**: The per-turn pipeline (variables, conditionals, story events, apply)
//! - **following**: Keeps followers next to whoever they follow
//! - **normalize**: Keeps every item in exactly one container
//! - **story_events**: The sink port narrative events leave through
//!
//! ## Design Philosophy
//!
//! - **Forgiving**: Deltas come from a language model; bad references are logged and skipped
//! - **Synchronous**: One borrowed state per turn, no threads, no I/O besides the sink
//! - **Deterministic**: Rules evaluate in declaration order and ties resolve by id

pub mod config;
pub mod delta_worker;
pub mod error;
pub mod following;
pub mod normalize;
pub mod story_events;

pub use config::*;
pub use delta_worker::*;
pub use error::*;
pub use following::*;
pub use normalize::*;
pub use story_events::*;
