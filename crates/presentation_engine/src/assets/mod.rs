//! Asset management system
//!
//! The presenter never parses model files itself. It asks a [`ModelLoader`]
//! for a [`ModelNode`] and treats any failure as "skip and continue".

pub mod obj_loader;
pub mod registry;

pub use obj_loader::ObjModelLoader;
pub use registry::LoaderRegistry;

use std::path::{Path, PathBuf};
use std::sync::Arc;
use thiserror::Error;

/// Triangle geometry produced by a format loader
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MeshData {
    /// Vertex positions
    pub positions: Vec<[f32; 3]>,
    /// Triangle list indices into `positions`
    pub indices: Vec<u32>,
}

impl MeshData {
    /// Number of triangles
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }
}

/// What a renderable node contains
#[derive(Debug, Clone, PartialEq)]
pub enum NodeKind {
    /// Nothing to draw (failed loads, blank model, placeholders)
    Empty,
    /// A single mesh
    Mesh(MeshData),
    /// Child nodes drawn together
    Group(Vec<Arc<ModelNode>>),
}

/// Renderable content handed to the scene
#[derive(Debug, Clone, PartialEq)]
pub struct ModelNode {
    /// Display name
    pub name: String,
    /// File or directory this node came from
    pub source: Option<PathBuf>,
    /// Node payload
    pub kind: NodeKind,
}

impl ModelNode {
    /// Create a node with nothing to draw
    pub fn empty(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            source: None,
            kind: NodeKind::Empty,
        }
    }

    /// Create a mesh node loaded from `source`
    pub fn mesh(name: impl Into<String>, source: impl Into<PathBuf>, mesh: MeshData) -> Self {
        Self {
            name: name.into(),
            source: Some(source.into()),
            kind: NodeKind::Mesh(mesh),
        }
    }

    /// Create a group node
    pub fn group(name: impl Into<String>, children: Vec<Arc<ModelNode>>) -> Self {
        Self {
            name: name.into(),
            source: None,
            kind: NodeKind::Group(children),
        }
    }

    /// Set the source path
    pub fn with_source(mut self, source: impl Into<PathBuf>) -> Self {
        self.source = Some(source.into());
        self
    }

    /// True when the node draws nothing
    pub fn is_empty(&self) -> bool {
        match &self.kind {
            NodeKind::Empty => true,
            NodeKind::Mesh(mesh) => mesh.indices.is_empty(),
            NodeKind::Group(children) => children.iter().all(|child| child.is_empty()),
        }
    }

    /// Total triangles in this node and its children
    pub fn triangle_count(&self) -> usize {
        match &self.kind {
            NodeKind::Empty => 0,
            NodeKind::Mesh(mesh) => mesh.triangle_count(),
            NodeKind::Group(children) => children.iter().map(|child| child.triangle_count()).sum(),
        }
    }
}

/// Format-specific model loader
///
/// Loaders run on watcher worker threads, so they must be shareable.
pub trait ModelLoader: Send + Sync {
    /// Whether this loader understands the file
    fn can_load(&self, path: &Path) -> bool;

    /// Load a single file
    fn load(&self, path: &Path) -> Result<ModelNode, AssetError>;
}

/// Load every loadable file in a directory into one group node
///
/// Files are visited in name order. Files that fail are logged and skipped.
pub fn load_directory(loader: &dyn ModelLoader, dir: &Path) -> Result<ModelNode, AssetError> {
    if !dir.is_dir() {
        return Err(AssetError::NotFound(dir.display().to_string()));
    }

    let mut files: Vec<PathBuf> = std::fs::read_dir(dir)?
        .filter_map(Result::ok)
        .map(|entry| entry.path())
        .filter(|path| path.is_file() && loader.can_load(path))
        .collect();
    files.sort();

    let mut children = Vec::with_capacity(files.len());
    for file in &files {
        match loader.load(file) {
            Ok(node) => children.push(Arc::new(node)),
            Err(e) => log::warn!("Skipping {} in {}: {}", file.display(), dir.display(), e),
        }
    }

    let name = dir
        .file_name()
        .map_or_else(|| dir.display().to_string(), |n| n.to_string_lossy().into_owned());
    Ok(ModelNode::group(name, children).with_source(dir))
}

/// Load a file or directory, substituting an empty node on failure
pub fn load_or_empty(loader: &dyn ModelLoader, name: &str, path: &Path) -> ModelNode {
    let result = if path.is_dir() {
        load_directory(loader, path)
    } else {
        loader.load(path)
    };

    match result {
        Ok(node) => node,
        Err(e) => {
            log::warn!("Failed to load model '{}' from {}: {}", name, path.display(), e);
            ModelNode::empty(name).with_source(path)
        }
    }
}

/// Asset loading errors
#[derive(Error, Debug)]
pub enum AssetError {
    /// Asset not found
    #[error("Asset not found: {0}")]
    NotFound(String),

    /// Invalid asset data
    #[error("Parse error in {file}: {message}")]
    Parse {
        /// File being parsed
        file: String,
        /// What went wrong
        message: String,
    },

    /// Unsupported asset format
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// IO error during asset loading
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> MeshData {
        MeshData {
            positions: vec![[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]],
            indices: vec![0, 1, 2],
        }
    }

    #[test]
    fn test_group_counts_children() {
        let a = Arc::new(ModelNode::mesh("a", "a.obj", triangle()));
        let b = Arc::new(ModelNode::mesh("b", "b.obj", triangle()));
        let group = ModelNode::group("both", vec![a, b]);

        assert_eq!(group.triangle_count(), 2);
        assert!(!group.is_empty());
    }

    #[test]
    fn test_group_of_empties_is_empty() {
        let group = ModelNode::group("g", vec![Arc::new(ModelNode::empty("x"))]);
        assert!(group.is_empty());
    }

    #[test]
    fn test_load_or_empty_swallows_missing_file() {
        let loader = ObjModelLoader::new();
        let node = load_or_empty(&loader, "ghost", Path::new("/definitely/not/here.obj"));

        assert_eq!(node.name, "ghost");
        assert!(node.is_empty());
    }

    #[test]
    fn test_load_directory_skips_bad_files() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.obj"), "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n").unwrap();
        std::fs::write(dir.path().join("b.obj"), "v 0 0 0\nf 1 2 9\n").unwrap();
        std::fs::write(dir.path().join("notes.txt"), "ignored").unwrap();

        let node = load_directory(&ObjModelLoader::new(), dir.path()).unwrap();

        match &node.kind {
            NodeKind::Group(children) => assert_eq!(children.len(), 1),
            other => panic!("expected group, got {:?}", other),
        }
        assert_eq!(node.triangle_count(), 1);
    }
}
