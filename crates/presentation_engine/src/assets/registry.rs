//! Extension-based dispatch over several model loaders

use super::{AssetError, ModelLoader, ModelNode};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

/// Routes each file to the loader registered for its extension
#[derive(Default, Clone)]
pub struct LoaderRegistry {
    loaders: HashMap<String, Arc<dyn ModelLoader>>,
}

impl LoaderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `loader` for files ending in `extension` (case-insensitive)
    pub fn with_loader(mut self, extension: &str, loader: Arc<dyn ModelLoader>) -> Self {
        self.register(extension, loader);
        self
    }

    /// Register `loader` for files ending in `extension` (case-insensitive)
    pub fn register(&mut self, extension: &str, loader: Arc<dyn ModelLoader>) {
        let key = extension.trim_start_matches('.').to_ascii_lowercase();
        self.loaders.insert(key, loader);
    }

    fn loader_for(&self, path: &Path) -> Option<&Arc<dyn ModelLoader>> {
        let ext = path.extension()?.to_str()?.to_ascii_lowercase();
        self.loaders.get(&ext)
    }
}

impl ModelLoader for LoaderRegistry {
    fn can_load(&self, path: &Path) -> bool {
        self.loader_for(path).is_some()
    }

    fn load(&self, path: &Path) -> Result<ModelNode, AssetError> {
        self.loader_for(path)
            .ok_or_else(|| AssetError::UnsupportedFormat(path.display().to_string()))?
            .load(path)
    }
}
