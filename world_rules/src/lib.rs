//! # World Rules
//!
//! The static half of a Waypoint session and the record it mutates: the
//! scenario model, the per-session [`GameState`], the turn delta contract and
//! the `when` predicates scenario authors write. This crate holds no engine
//! logic; applying a delta to a state lives in `delta_engine`.

pub mod conditions;
pub mod contingency;
pub mod delta;
pub mod lookup;
pub mod scenario;
pub mod world_state;

pub use conditions::*;
pub use contingency::*;
pub use delta::*;
pub use lookup::*;
pub use scenario::*;
pub use world_state::*;
