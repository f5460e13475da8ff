//! Declarative scene definition
//!
//! A [`SceneDefinition`] is what a document author writes, in TOML or RON.
//! [`SceneDefinition::build`] turns it into [`SceneData`], loading static
//! models and filling in defaults for anything left out. Malformed entries
//! are logged and skipped; only an unreadable definition file is an error.

use super::{
    DynamicSet, DynamicSetHeader, NamedLocations, SceneData, Sequence, SequenceStep, SetKind,
    TimeGroup, TimeSet, VisibilityGroup, VisibilitySet, VisibilityMap,
};
use crate::assets::{load_or_empty, ModelLoader, ModelNode};
use crate::config::{Config, ConfigError};
use crate::foundation::math::{Mat4, Transform, Vec3};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while turning a definition into scene data
#[derive(Error, Debug)]
pub enum DefinitionError {
    /// The definition file could not be read or parsed
    #[error("Definition error: {0}")]
    Config(#[from] ConfigError),

    /// A location entry has an unusable value
    #[error("Invalid location '{name}': {reason}")]
    InvalidLocation {
        /// Location name
        name: String,
        /// What was wrong
        reason: String,
    },

    /// A dynamic set entry cannot be watched
    #[error("Invalid dynamic set '{name}': {reason}")]
    InvalidDynamicSet {
        /// Set name
        name: String,
        /// What was wrong
        reason: String,
    },
}

/// A static model entry
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ModelDefinition {
    /// Unique name; `Unknown<index>` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Single model file
    #[serde(skip_serializing_if = "Option::is_none")]
    pub file: Option<PathBuf>,
    /// Directory whose files form one model
    #[serde(skip_serializing_if = "Option::is_none")]
    pub directory: Option<PathBuf>,
    /// Only load on this host (`localhost` always matches)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub machine: Option<String>,
}

/// A group inside a toggle or radio set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GroupDefinition {
    /// Group name; `Group` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Models this group shows
    pub show: Vec<String>,
    /// Models this group hides
    pub hide: Vec<String>,
}

/// A toggle or radio set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SetDefinition {
    /// Set name; `Set` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Menu name; `Sets` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    /// Toggle or radio
    pub kind: SetKind,
    /// Initial toggle state
    pub visible: bool,
    /// Groups in order
    pub groups: Vec<GroupDefinition>,
}

impl Default for SetDefinition {
    fn default() -> Self {
        Self {
            name: None,
            menu: None,
            kind: SetKind::Radio,
            visible: true,
            groups: Vec::new(),
        }
    }
}

/// A group inside a time set
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeGroupDefinition {
    /// First active tick; the group's position when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub start_time: Option<u32>,
    /// First inactive tick; `start_time + 1` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u32>,
    /// Models this group shows
    pub show: Vec<String>,
    /// Models this group hides
    pub hide: Vec<String>,
}

/// A time-indexed set
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct TimeSetDefinition {
    /// Set name; `TimeSet` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Menu name; `TimeSets` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    /// Initial visibility
    pub visible: bool,
    /// Explicit last tick, if longer than the groups cover
    #[serde(skip_serializing_if = "Option::is_none")]
    pub end_time: Option<u32>,
    /// Groups in order
    pub groups: Vec<TimeGroupDefinition>,
}

impl Default for TimeSetDefinition {
    fn default() -> Self {
        Self {
            name: None,
            menu: None,
            visible: true,
            end_time: None,
            groups: Vec::new(),
        }
    }
}

/// A directory watched for new steps
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DynamicSetDefinition {
    /// Set name; `DynamicSet` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Menu name; `Dynamic` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    /// Directory to watch
    pub directory: PathBuf,
    /// Required file-name prefix
    pub prefix: String,
    /// Required extension
    pub extension: String,
    /// Number of steps
    pub max: u32,
}

/// One sequence step
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StepDefinition {
    /// Step name
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Named location for the camera
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<String>,
    /// Move the camera when entering the step
    pub change_location: bool,
    /// Models shown by the step
    pub show: Vec<String>,
}

/// The document's sequence
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SequenceDefinition {
    /// Sequence name; `Sequence` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Menu name; `Sequence` when absent
    #[serde(skip_serializing_if = "Option::is_none")]
    pub menu: Option<String>,
    /// Steps in order
    pub steps: Vec<StepDefinition>,
}

/// How a location value is written
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LocationKind {
    /// `x y z pitch roll yaw`, angles in degrees
    #[default]
    Xyzpry,
    /// Sixteen comma-separated values in row order
    Matrix,
}

/// A saved camera location
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LocationDefinition {
    /// Location name
    pub name: String,
    /// Value encoding
    pub kind: LocationKind,
    /// Encoded transform
    pub value: String,
}

impl LocationDefinition {
    /// Decode the transform
    pub fn transform(&self) -> Result<Transform, DefinitionError> {
        let invalid = |reason: String| DefinitionError::InvalidLocation {
            name: self.name.clone(),
            reason,
        };

        match self.kind {
            LocationKind::Xyzpry => {
                let values = parse_numbers(self.value.split_whitespace()).map_err(invalid)?;
                let [x, y, z, pitch, roll, yaw] = values[..] else {
                    return Err(invalid(format!("expected 6 values, found {}", values.len())));
                };
                Ok(Transform::from_xyz_pry(Vec3::new(x, y, z), pitch, roll, yaw))
            }
            LocationKind::Matrix => {
                let values = parse_numbers(self.value.split(',').map(str::trim)).map_err(invalid)?;
                if values.len() != 16 {
                    return Err(invalid(format!("expected 16 values, found {}", values.len())));
                }
                Ok(Transform::from_matrix(Mat4::from_row_slice(&values)))
            }
        }
    }
}

fn parse_numbers<'a>(tokens: impl Iterator<Item = &'a str>) -> Result<Vec<f32>, String> {
    tokens
        .filter(|token| !token.is_empty())
        .map(|token| token.parse::<f32>().map_err(|e| format!("'{token}': {e}")))
        .collect()
}

/// A complete presentation document
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SceneDefinition {
    /// Static models
    pub models: Vec<ModelDefinition>,
    /// Toggle and radio sets
    pub sets: Vec<SetDefinition>,
    /// Time-indexed sets
    pub time_sets: Vec<TimeSetDefinition>,
    /// Watched directories
    pub dynamic_sets: Vec<DynamicSetDefinition>,
    /// Scripted sequence
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sequence: Option<SequenceDefinition>,
    /// Saved camera locations
    pub locations: Vec<LocationDefinition>,
}

impl Config for SceneDefinition {}

fn visibility_map(show: &[String], hide: &[String]) -> VisibilityMap {
    let mut map = VisibilityMap::new();
    for name in show {
        map.insert(name.clone(), true);
    }
    for name in hide {
        map.insert(name.clone(), false);
    }
    map
}

fn resolve(base_dir: &Path, path: &Path) -> PathBuf {
    if path.is_absolute() {
        path.to_path_buf()
    } else {
        base_dir.join(path)
    }
}

/// Name of the machine this process runs on, if it can be found
pub fn current_hostname() -> Option<String> {
    ["HOSTNAME", "COMPUTERNAME"]
        .iter()
        .find_map(|var| std::env::var(var).ok())
        .or_else(|| std::fs::read_to_string("/etc/hostname").ok())
        .map(|name| name.trim().to_string())
        .filter(|name| !name.is_empty())
}

/// Whether a model restricted to `machine` should load here
pub fn machine_matches(machine: &str, hostname: Option<&str>) -> bool {
    machine.eq_ignore_ascii_case("localhost")
        || hostname.is_some_and(|host| host.eq_ignore_ascii_case(machine))
}

impl SceneDefinition {
    /// Read a definition and build it, resolving paths against its directory
    pub fn build_from_file(path: impl AsRef<Path>, loader: &dyn ModelLoader) -> Result<SceneData, DefinitionError> {
        let path = path.as_ref();
        let definition = Self::load_from_file(path)?;
        let base_dir = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(definition.build(base_dir, loader))
    }

    /// Build scene data, loading static models through `loader`
    pub fn build(&self, base_dir: &Path, loader: &dyn ModelLoader) -> SceneData {
        let mut scene = SceneData::new();
        let hostname = current_hostname();

        for (i, model) in self.models.iter().enumerate() {
            let name = model.name.clone().unwrap_or_else(|| format!("Unknown{i}"));
            let node = load_model(model, &name, base_dir, loader, hostname.as_deref());
            scene.models.add(name, node);
        }

        scene.sets = self.sets.iter().map(build_set).collect();
        scene.time_sets = self.time_sets.iter().map(build_time_set).collect();

        for definition in &self.dynamic_sets {
            match build_dynamic_set(definition, base_dir) {
                Ok(mut set) => {
                    set.visible = scene.dynamic_sets.is_empty();
                    scene.dynamic_sets.push(set);
                }
                Err(e) => log::warn!("Skipping dynamic set: {}", e),
            }
        }

        if let Some(sequence) = &self.sequence {
            scene.sequence = build_sequence(sequence);
        }

        for location in &self.locations {
            match location.transform() {
                Ok(transform) => scene.locations.insert(location.name.clone(), transform),
                Err(e) => log::warn!("Skipping location: {}", e),
            }
        }

        log::info!(
            "Scene built: {} models, {} sets, {} time sets, {} dynamic sets, {} sequence steps, {} locations",
            scene.models.len(),
            scene.sets.len(),
            scene.time_sets.len(),
            scene.dynamic_sets.len(),
            scene.sequence.steps.len(),
            scene.locations.len()
        );
        scene
    }
}

fn load_model(
    model: &ModelDefinition,
    name: &str,
    base_dir: &Path,
    loader: &dyn ModelLoader,
    hostname: Option<&str>,
) -> ModelNode {
    if let Some(machine) = &model.machine {
        if !machine_matches(machine, hostname) {
            log::info!("Model '{}' is for machine '{}'; not loading here", name, machine);
            return ModelNode::empty(name);
        }
    }

    match (&model.file, &model.directory) {
        (Some(file), _) => load_or_empty(loader, name, &resolve(base_dir, file)),
        (None, Some(directory)) => load_or_empty(loader, name, &resolve(base_dir, directory)),
        (None, None) => {
            log::warn!("Model '{}' has neither file nor directory", name);
            ModelNode::empty(name)
        }
    }
}

fn build_set(definition: &SetDefinition) -> VisibilitySet {
    let mut set = VisibilitySet::new(
        definition.name.as_deref().unwrap_or("Set"),
        definition.menu.as_deref().unwrap_or("Sets"),
        definition.kind,
    );
    set.visible = definition.visible;
    set.groups = definition
        .groups
        .iter()
        .map(|group| VisibilityGroup {
            name: group.name.clone().unwrap_or_else(|| "Group".to_string()),
            models: visibility_map(&group.show, &group.hide),
        })
        .collect();
    set.ensure_toggle_pair();
    set
}

fn build_time_set(definition: &TimeSetDefinition) -> TimeSet {
    let mut set = TimeSet::new(
        definition.name.as_deref().unwrap_or("TimeSet"),
        definition.menu.as_deref().unwrap_or("TimeSets"),
    );
    set.visible = definition.visible;

    for (i, group) in definition.groups.iter().enumerate() {
        let start = group.start_time.unwrap_or(i as u32);
        let end = group.end_time.unwrap_or(start + 1);
        if end <= start {
            log::warn!(
                "Time group {} of '{}' covers no ticks ({}..{})",
                i,
                set.name,
                start,
                end
            );
        }
        set.push_group(TimeGroup {
            start_time: start,
            end_time: end,
            models: visibility_map(&group.show, &group.hide),
        });
    }

    if let Some(end) = definition.end_time {
        set.end_time = set.end_time.max(end);
    }
    set
}

fn build_dynamic_set(definition: &DynamicSetDefinition, base_dir: &Path) -> Result<DynamicSet, DefinitionError> {
    let name = definition.name.as_deref().unwrap_or("DynamicSet");
    let invalid = |reason: &str| DefinitionError::InvalidDynamicSet {
        name: name.to_string(),
        reason: reason.to_string(),
    };

    if definition.max == 0 {
        return Err(invalid("max must be at least 1"));
    }
    if definition.directory.as_os_str().is_empty() {
        return Err(invalid("directory is empty"));
    }

    let header = DynamicSetHeader::new(
        resolve(base_dir, &definition.directory),
        definition.prefix.clone(),
        definition.extension.clone(),
    );
    Ok(DynamicSet::new(
        name,
        definition.menu.as_deref().unwrap_or("Dynamic"),
        header,
        definition.max,
    ))
}

fn build_sequence(definition: &SequenceDefinition) -> Sequence {
    let mut sequence = Sequence::new(
        definition.name.as_deref().unwrap_or("Sequence"),
        definition.menu.as_deref().unwrap_or("Sequence"),
    );
    sequence.steps = definition
        .steps
        .iter()
        .enumerate()
        .map(|(i, step)| SequenceStep {
            name: step.name.clone().unwrap_or_else(|| format!("Step {}", i + 1)),
            location_name: step.location.clone().unwrap_or_default(),
            change_location: step.change_location,
            models: visibility_map(&step.show, &[]),
        })
        .collect();
    sequence
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{AssetError, MeshData};
    use crate::config::ConfigFormat;
    use approx::assert_relative_eq;

    struct FakeLoader;

    impl ModelLoader for FakeLoader {
        fn can_load(&self, _path: &Path) -> bool {
            true
        }

        fn load(&self, path: &Path) -> Result<ModelNode, AssetError> {
            if path.to_string_lossy().contains("broken") {
                return Err(AssetError::Parse {
                    file: path.display().to_string(),
                    message: "bad".into(),
                });
            }
            Ok(ModelNode::mesh(
                "m",
                path,
                MeshData {
                    positions: vec![[0.0; 3]; 3],
                    indices: vec![0, 1, 2],
                },
            ))
        }
    }

    const DOCUMENT: &str = r#"
[[models]]
name = "terrain"
file = "terrain.obj"

[[models]]
file = "broken.obj"

[[models]]
name = "remote"
file = "remote.obj"
machine = "no-such-host-anywhere"

[[sets]]
name = "Terrain"
groups = [{ show = ["terrain"] }]

[[sets]]
groups = [{ name = "A" }, { name = "B" }, { name = "C" }]

[[time_sets]]
groups = [{ show = ["a"] }, { show = ["b"] }, { start_time = 1, end_time = 4, show = ["c"] }]

[[dynamic_sets]]
directory = "out"
prefix = "step_"
extension = "obj"
max = 4

[[dynamic_sets]]
name = "second"
directory = "more"
max = 2

[[dynamic_sets]]
name = "bad"
directory = "out"
max = 0

[sequence]
steps = [{ location = "home", change_location = true, show = ["terrain"] }, { location = "home" }]

[[locations]]
name = "home"
value = "1 2 3 0 0 90"

[[locations]]
name = "broken"
kind = "matrix"
value = "1, 2, 3"
"#;

    fn build_document() -> SceneData {
        let definition = SceneDefinition::from_str_with_format(DOCUMENT, ConfigFormat::Toml).unwrap();
        definition.build(Path::new("/scenes"), &FakeLoader)
    }

    #[test]
    fn test_models_get_defaults_and_blank() {
        let scene = build_document();
        let names: Vec<&str> = scene.models.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["blank", "terrain", "Unknown1", "remote"]);

        let entries = scene.models.entries();
        assert!(!entries[1].node.is_empty());
        assert!(entries[2].node.is_empty());
        assert!(entries[3].node.is_empty());
    }

    #[test]
    fn test_single_group_set_becomes_toggle() {
        let scene = build_document();
        let terrain = &scene.sets[0];
        assert_eq!(terrain.kind, SetKind::Toggle);
        assert_eq!(terrain.groups.len(), 2);
        assert_eq!(terrain.groups[1].name, "blank");

        let radio = &scene.sets[1];
        assert_eq!(radio.name, "Set");
        assert_eq!(radio.menu_name, "Sets");
        assert_eq!(radio.kind, SetKind::Radio);
    }

    #[test]
    fn test_time_groups_default_to_unit_ranges() {
        let scene = build_document();
        let set = &scene.time_sets[0];
        assert_eq!(set.name, "TimeSet");
        assert_eq!((set.groups[0].start_time, set.groups[0].end_time), (0, 1));
        assert_eq!((set.groups[1].start_time, set.groups[1].end_time), (1, 2));
        assert_eq!((set.groups[2].start_time, set.groups[2].end_time), (1, 4));
        assert_eq!(set.end_time, 3);
    }

    #[test]
    fn test_dynamic_sets_validated_and_first_visible() {
        let scene = build_document();
        assert_eq!(scene.dynamic_sets.len(), 2);
        assert!(scene.dynamic_sets[0].visible);
        assert!(!scene.dynamic_sets[1].visible);
        assert_eq!(scene.dynamic_sets[0].header.directory, Path::new("/scenes/out"));
        assert_eq!(scene.dynamic_sets[0].end_time, 4);
    }

    #[test]
    fn test_sequence_and_locations() {
        let scene = build_document();
        assert_eq!(scene.sequence.steps.len(), 2);
        assert!(scene.sequence.steps[0].change_location);
        assert!(!scene.sequence.steps[1].change_location);

        assert_eq!(scene.locations.len(), 1);
        let home = scene.locations.get("home").unwrap();
        assert_relative_eq!(home.position, Vec3::new(1.0, 2.0, 3.0), epsilon = 1e-6);
    }

    #[test]
    fn test_matrix_location_reads_translation_column() {
        let location = LocationDefinition {
            name: "m".into(),
            kind: LocationKind::Matrix,
            value: "1,0,0,5, 0,1,0,6, 0,0,1,7, 0,0,0,1".into(),
        };
        let transform = location.transform().unwrap();
        assert_relative_eq!(transform.position, Vec3::new(5.0, 6.0, 7.0), epsilon = 1e-6);
    }

    #[test]
    fn test_bad_location_values_are_errors() {
        let location = LocationDefinition {
            name: "x".into(),
            kind: LocationKind::Xyzpry,
            value: "1 2 three 0 0 0".into(),
        };
        assert!(matches!(location.transform(), Err(DefinitionError::InvalidLocation { .. })));
    }

    #[test]
    fn test_machine_matching() {
        assert!(machine_matches("localhost", None));
        assert!(machine_matches("Render01", Some("render01")));
        assert!(!machine_matches("render02", Some("render01")));
        assert!(!machine_matches("render02", None));
    }

    #[test]
    fn test_definition_round_trips_through_ron_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("scene.ron");
        let definition = SceneDefinition::from_str_with_format(DOCUMENT, ConfigFormat::Toml).unwrap();
        definition.save_to_file(&path).unwrap();

        let loaded = SceneDefinition::load_from_file(&path).unwrap();
        assert_eq!(loaded, definition);
    }
}
