//! Scripted sequences and saved camera locations

use super::VisibilityMap;
use crate::foundation::math::Transform;
use std::collections::HashMap;

/// One stop of a sequence
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SequenceStep {
    /// Step name
    pub name: String,
    /// Named location the camera moves to
    pub location_name: String,
    /// Whether entering this step moves the camera
    pub change_location: bool,
    /// Models shown (`true`) while this step is current
    pub models: VisibilityMap,
}

impl SequenceStep {
    /// Create a step that leaves the camera where it is
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            ..Self::default()
        }
    }

    /// Move the camera to `location` when entering this step
    pub fn with_location(mut self, location: impl Into<String>) -> Self {
        self.location_name = location.into();
        self.change_location = true;
        self
    }

    /// Add a model shown by this step
    pub fn show(mut self, model: impl Into<String>) -> Self {
        self.models.insert(model.into(), true);
        self
    }
}

/// Ordered steps navigated independently of the timeline
#[derive(Debug, Clone, PartialEq)]
pub struct Sequence {
    /// Sequence name
    pub name: String,
    /// Menu the sequence appears under
    pub menu_name: String,
    /// Steps in order
    pub steps: Vec<SequenceStep>,
    /// Cursor into `steps`
    pub current: usize,
}

impl Default for Sequence {
    fn default() -> Self {
        Self::new("Sequence", "Sequence")
    }
}

impl Sequence {
    /// Create a sequence without steps
    pub fn new(name: impl Into<String>, menu_name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            menu_name: menu_name.into(),
            steps: Vec::new(),
            current: 0,
        }
    }

    /// Append a step
    pub fn with_step(mut self, step: SequenceStep) -> Self {
        self.steps.push(step);
        self
    }

    /// Whether there are no steps
    pub fn is_empty(&self) -> bool {
        self.steps.is_empty()
    }

    /// Move to the next step, wrapping to the first
    pub fn next(&mut self) -> Option<&SequenceStep> {
        if self.steps.is_empty() {
            return None;
        }
        self.current = (self.current + 1) % self.steps.len();
        self.steps.get(self.current)
    }

    /// Move to the previous step, wrapping to the last
    pub fn prev(&mut self) -> Option<&SequenceStep> {
        if self.steps.is_empty() {
            return None;
        }
        self.current = if self.current == 0 || self.current >= self.steps.len() {
            self.steps.len() - 1
        } else {
            self.current - 1
        };
        self.steps.get(self.current)
    }

    /// Move to the first step
    pub fn first(&mut self) -> Option<&SequenceStep> {
        self.current = 0;
        self.steps.first()
    }

    /// The step under the cursor
    pub fn current_step(&self) -> Option<&SequenceStep> {
        self.steps.get(self.current)
    }
}

/// Saved camera transforms by name
#[derive(Debug, Clone, Default, PartialEq)]
pub struct NamedLocations {
    transforms: HashMap<String, Transform>,
    order: Vec<String>,
}

impl NamedLocations {
    /// Create an empty table
    pub fn new() -> Self {
        Self::default()
    }

    /// Add or replace a location
    pub fn insert(&mut self, name: impl Into<String>, transform: Transform) {
        let name = name.into();
        if self.transforms.insert(name.clone(), transform).is_none() {
            self.order.push(name);
        }
    }

    /// Look up a location
    pub fn get(&self, name: &str) -> Option<&Transform> {
        self.transforms.get(name)
    }

    /// Location names in insertion order
    pub fn names(&self) -> &[String] {
        &self.order
    }

    /// Number of locations
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// Whether the table is empty
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn three_steps() -> Sequence {
        Sequence::new("tour", "Sequence")
            .with_step(SequenceStep::new("a").show("x"))
            .with_step(SequenceStep::new("b").show("y"))
            .with_step(SequenceStep::new("c").show("z"))
    }

    #[test]
    fn test_next_wraps_after_last_step() {
        let mut sequence = three_steps();
        sequence.first();
        for _ in 0..3 {
            sequence.next();
        }
        assert_eq!(sequence.current, 0);
    }

    #[test]
    fn test_prev_wraps_before_first_step() {
        let mut sequence = three_steps();
        let step = sequence.prev().map(|s| s.name.clone());
        assert_eq!(step.as_deref(), Some("c"));
        assert_eq!(sequence.current, 2);
    }

    #[test]
    fn test_empty_sequence_navigation_is_noop() {
        let mut sequence = Sequence::default();
        assert!(sequence.next().is_none());
        assert!(sequence.prev().is_none());
        assert!(sequence.first().is_none());
        assert_eq!(sequence.current, 0);
    }

    #[test]
    fn test_with_location_sets_change_flag() {
        let step = SequenceStep::new("s").with_location("home");
        assert!(step.change_location);
        assert!(!SequenceStep::new("t").change_location);
    }

    #[test]
    fn test_locations_keep_insertion_order() {
        let mut locations = NamedLocations::new();
        locations.insert("b", Transform::identity());
        locations.insert("a", Transform::from_position(Vec3::new(1.0, 0.0, 0.0)));
        locations.insert("b", Transform::from_position(Vec3::new(2.0, 0.0, 0.0)));

        assert_eq!(locations.names(), &["b".to_string(), "a".to_string()]);
        assert_eq!(locations.len(), 2);
        assert!(locations.get("missing").is_none());
    }
}
