//! OBJ file loader for 3D models

use super::{AssetError, MeshData, ModelLoader, ModelNode};
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;

/// Loader for Wavefront OBJ geometry
///
/// Only positions and faces are read; polygons are fan-triangulated.
#[derive(Debug, Default, Clone, Copy)]
pub struct ObjModelLoader;

impl ObjModelLoader {
    /// Create a new OBJ loader
    pub fn new() -> Self {
        Self
    }

    /// Parse OBJ text read from `reader`
    pub fn parse<R: BufRead>(reader: R, file: &str) -> Result<MeshData, AssetError> {
        let parse_error = |message: String| AssetError::Parse {
            file: file.to_string(),
            message,
        };

        let mut positions = Vec::new();
        let mut indices = Vec::new();

        for (line_number, line) in reader.lines().enumerate() {
            let line = line?;
            let line = line.trim();

            if line.is_empty() || line.starts_with('#') {
                continue;
            }

            let parts: Vec<&str> = line.split_whitespace().collect();

            match parts[0] {
                "v" => {
                    if parts.len() < 4 {
                        return Err(parse_error(format!("line {}: vertex needs 3 coordinates", line_number + 1)));
                    }
                    let mut position = [0.0_f32; 3];
                    for (axis, value) in parts[1..4].iter().enumerate() {
                        position[axis] = value.parse().map_err(|_| {
                            parse_error(format!("line {}: invalid coordinate '{}'", line_number + 1, value))
                        })?;
                    }
                    positions.push(position);
                }
                "f" => {
                    if parts.len() < 4 {
                        return Err(parse_error(format!("line {}: face needs 3 vertices", line_number + 1)));
                    }

                    let mut face = Vec::with_capacity(parts.len() - 1);
                    for vertex in &parts[1..] {
                        // Position index is the first field of v/vt/vn, 1-based
                        let index_text = vertex.split('/').next().unwrap_or_default();
                        let index: i64 = index_text.parse().map_err(|_| {
                            parse_error(format!("line {}: invalid face index '{}'", line_number + 1, vertex))
                        })?;
                        let resolved = if index < 0 {
                            positions.len() as i64 + index
                        } else {
                            index - 1
                        };
                        if resolved < 0 || resolved >= positions.len() as i64 {
                            return Err(parse_error(format!(
                                "line {}: face index {} out of bounds",
                                line_number + 1,
                                index
                            )));
                        }
                        face.push(u32::try_from(resolved).map_err(|_| {
                            parse_error(format!("line {}: face index too large", line_number + 1))
                        })?);
                    }

                    for i in 1..(face.len() - 1) {
                        indices.extend_from_slice(&[face[0], face[i], face[i + 1]]);
                    }
                }
                _ => {
                    // Normals, texture coordinates, groups and materials are ignored
                }
            }
        }

        if positions.is_empty() {
            return Err(parse_error("no vertices found".to_string()));
        }

        Ok(MeshData { positions, indices })
    }
}

impl ModelLoader for ObjModelLoader {
    fn can_load(&self, path: &Path) -> bool {
        path.extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"))
    }

    fn load(&self, path: &Path) -> Result<ModelNode, AssetError> {
        if !path.exists() {
            return Err(AssetError::NotFound(path.display().to_string()));
        }
        let file = File::open(path)?;
        let mesh = Self::parse(BufReader::new(file), &path.display().to_string())?;

        let name = path
            .file_stem()
            .map_or_else(|| path.display().to_string(), |stem| stem.to_string_lossy().into_owned());
        log::trace!("Loaded {} ({} triangles)", path.display(), mesh.triangle_count());
        Ok(ModelNode::mesh(name, path, mesh))
    }
}
