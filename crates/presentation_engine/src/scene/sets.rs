//! Toggle and radio sets

use super::{VisibilityMap, BLANK_MODEL};
use serde::{Serialize, Deserialize};

/// How a set chooses which group is shown
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SetKind {
    /// Two groups switched by an on/off flag
    Toggle,
    /// Any number of groups, one chosen by index
    #[default]
    Radio,
}

/// A named model-visibility map inside a set
#[derive(Debug, Clone, Default, PartialEq)]
pub struct VisibilityGroup {
    /// Group name
    pub name: String,
    /// Models this group shows (`true`) or hides (`false`)
    pub models: VisibilityMap,
}

impl VisibilityGroup {
    /// Create an empty group
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            models: VisibilityMap::new(),
        }
    }

    /// Add a model the group shows
    pub fn show(mut self, model: impl Into<String>) -> Self {
        self.models.insert(model.into(), true);
        self
    }

    /// Add a model the group hides
    pub fn hide(mut self, model: impl Into<String>) -> Self {
        self.models.insert(model.into(), false);
        self
    }

    /// The group injected into single-group sets
    pub fn blank() -> Self {
        Self::new(BLANK_MODEL).show(BLANK_MODEL)
    }
}

/// Mutually exclusive groups of static models
#[derive(Debug, Clone, PartialEq)]
pub struct VisibilitySet {
    /// Set name
    pub name: String,
    /// Menu the set appears under
    pub menu_name: String,
    /// Toggle or radio
    pub kind: SetKind,
    /// Groups in declaration order
    pub groups: Vec<VisibilityGroup>,
    /// Group last applied by `set_group`
    pub active_group: usize,
    /// Toggle state: group 0 when true, group 1 when false
    pub visible: bool,
}

impl VisibilitySet {
    /// Create a set without groups
    pub fn new(name: impl Into<String>, menu_name: impl Into<String>, kind: SetKind) -> Self {
        Self {
            name: name.into(),
            menu_name: menu_name.into(),
            kind,
            groups: Vec::new(),
            active_group: 0,
            visible: true,
        }
    }

    /// Append a group
    pub fn with_group(mut self, group: VisibilityGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Give a single-group set a blank partner and make it a toggle
    pub fn ensure_toggle_pair(&mut self) {
        if self.groups.len() == 1 {
            self.groups.push(VisibilityGroup::blank());
            self.kind = SetKind::Toggle;
        }
    }

    /// Group the per-tick enforcement should show, if any
    pub fn enforced_group(&self) -> Option<usize> {
        match self.kind {
            SetKind::Toggle if self.groups.len() == 2 => Some(if self.visible { 0 } else { 1 }),
            SetKind::Toggle => None,
            SetKind::Radio => (self.active_group < self.groups.len()).then_some(self.active_group),
        }
    }
}
