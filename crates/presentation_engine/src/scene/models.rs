//! Master model registry

use super::VisibilityMap;
use crate::assets::ModelNode;
use std::collections::HashMap;
use std::sync::Arc;

/// Name of the always-present empty model at index 0
pub const BLANK_MODEL: &str = "blank";

/// One static model and its visibility
#[derive(Debug, Clone)]
pub struct ModelEntry {
    /// Unique model name
    pub name: String,
    /// Renderable content
    pub node: Arc<ModelNode>,
    /// Current visibility
    pub visible: bool,
}

/// Ordered list of static models with a name index
///
/// Index 0 is always [`BLANK_MODEL`], so a toggle set can switch to
/// "nothing" without a special case.
#[derive(Debug, Clone)]
pub struct ModelRegistry {
    entries: Vec<ModelEntry>,
    index: HashMap<String, usize>,
}

impl Default for ModelRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ModelRegistry {
    /// Create a registry holding only the blank model
    pub fn new() -> Self {
        let mut registry = Self {
            entries: Vec::new(),
            index: HashMap::new(),
        };
        registry.add(BLANK_MODEL, ModelNode::empty(BLANK_MODEL));
        registry
    }

    /// Add a model, replacing the node of an existing model with the same name
    pub fn add(&mut self, name: impl Into<String>, node: ModelNode) -> usize {
        let name = name.into();
        if let Some(&existing) = self.index.get(&name) {
            log::warn!("Model '{}' declared twice; keeping the later definition", name);
            self.entries[existing].node = Arc::new(node);
            return existing;
        }

        let index = self.entries.len();
        self.index.insert(name.clone(), index);
        self.entries.push(ModelEntry {
            name,
            node: Arc::new(node),
            visible: false,
        });
        index
    }

    /// Index of a model by name
    pub fn index_of(&self, name: &str) -> Option<usize> {
        self.index.get(name).copied()
    }

    /// Number of models including the blank model
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Always false; the blank model is never removed
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// All entries in declaration order
    pub fn entries(&self) -> &[ModelEntry] {
        &self.entries
    }

    /// Set a model's visibility by name; returns false for unknown names
    pub fn set_visible(&mut self, name: &str, visible: bool) -> bool {
        match self.index.get(name) {
            Some(&i) => {
                self.entries[i].visible = visible;
                true
            }
            None => {
                log::trace!("Unknown model '{}' ignored", name);
                false
            }
        }
    }

    /// Visibility of a model by name
    pub fn is_visible(&self, name: &str) -> bool {
        self.index_of(name).is_some_and(|i| self.entries[i].visible)
    }

    /// Hide every model
    pub fn hide_all(&mut self) {
        for entry in &mut self.entries {
            entry.visible = false;
        }
    }

    /// Set each listed model to its mapped value
    pub fn apply(&mut self, map: &VisibilityMap) {
        for (name, &visible) in map {
            self.set_visible(name, visible);
        }
    }

    /// Hide each listed model whose mapped value is `true`
    pub fn hide_shown(&mut self, map: &VisibilityMap) {
        for (name, _) in map.iter().filter(|(_, shown)| **shown) {
            self.set_visible(name, false);
        }
    }

    /// Visibility of every model in declaration order
    pub fn visibility_mask(&self) -> Vec<bool> {
        self.entries.iter().map(|e| e.visible).collect()
    }

    /// Names of visible models in declaration order
    pub fn visible_names(&self) -> Vec<&str> {
        self.entries
            .iter()
            .filter(|e| e.visible)
            .map(|e| e.name.as_str())
            .collect()
    }
}
