//! Heuristic discovery of multi-round linear relation trails.

pub mod selection;
pub mod trail;

pub use self::selection::{Relation, RelationSelector};
pub use self::trail::{assemble_trail, DeadTrail, Trail};
