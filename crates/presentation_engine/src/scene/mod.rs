//! Scene data model
//!
//! Plain data for everything the presenter switches on and off over time.
//! Nothing here knows about ticks, jobs or cameras; the presenter owns one
//! [`SceneData`] and mutates it in place.
//!
//! ## Layout
//!
//! ```text
//! SceneData
//!   ├── ModelRegistry      master list of static models ("blank" at index 0)
//!   ├── VisibilitySet[]    toggle / radio groups over registry models
//!   ├── TimeSet[]          groups active over half-open tick ranges
//!   ├── DynamicSet[]       steps discovered on disk, one slot per step
//!   ├── Sequence           scripted visibility + camera stops
//!   └── NamedLocations     saved camera transforms
//! ```

mod models;
mod sets;
mod timeline;
mod dynamic;
mod sequence;
pub mod definition;

pub use models::{ModelRegistry, ModelEntry, BLANK_MODEL};
pub use sets::{VisibilitySet, VisibilityGroup, SetKind};
pub use timeline::{GlobalTimeline, TimeSet, TimeGroup, wrap_next, wrap_prev};
pub use dynamic::{DynamicSet, DynamicSetHeader, DynamicGroup};
pub use sequence::{Sequence, SequenceStep, NamedLocations};
pub use definition::{SceneDefinition, DefinitionError};

use std::collections::BTreeMap;

/// Model name to visibility, iterated in name order
pub type VisibilityMap = BTreeMap<String, bool>;

/// Everything a presentation document declares
#[derive(Debug, Clone, Default)]
pub struct SceneData {
    /// Static models
    pub models: ModelRegistry,
    /// Toggle and radio sets
    pub sets: Vec<VisibilitySet>,
    /// Time-indexed sets
    pub time_sets: Vec<TimeSet>,
    /// Incrementally loaded sets
    pub dynamic_sets: Vec<DynamicSet>,
    /// Scripted sequence
    pub sequence: Sequence,
    /// Saved camera transforms
    pub locations: NamedLocations,
}

impl SceneData {
    /// Create an empty scene with only the blank model
    pub fn new() -> Self {
        Self::default()
    }
}
