//! Incrementally loaded dynamic sets

use crate::assets::ModelNode;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// What a watcher scans for
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct DynamicSetHeader {
    /// Directory to scan
    pub directory: PathBuf,
    /// Required file-name prefix
    pub prefix: String,
    /// Required file extension, with or without the leading dot
    pub extension: String,
    /// File names already incorporated, in load order
    pub known_files: Vec<String>,
}

impl DynamicSetHeader {
    /// Create a header with no known files
    pub fn new(directory: impl Into<PathBuf>, prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            directory: directory.into(),
            prefix: prefix.into(),
            extension: extension.into(),
            known_files: Vec::new(),
        }
    }

    /// Whether a file name has this header's prefix and extension
    pub fn matches(&self, file_name: &str) -> bool {
        let wanted = self.extension.trim_start_matches('.');
        let extension_ok = wanted.is_empty()
            || Path::new(file_name)
                .extension()
                .and_then(|ext| ext.to_str())
                .is_some_and(|ext| ext.eq_ignore_ascii_case(wanted));

        file_name.starts_with(&self.prefix) && extension_ok
    }
}

/// One step of a dynamic set
#[derive(Debug, Clone)]
pub struct DynamicGroup {
    /// File this step was loaded from (empty while a placeholder)
    pub filename: String,
    /// A file has been incorporated for this step
    pub loaded: bool,
    /// The loaded file produced drawable content
    pub valid: bool,
    /// What the step displays; placeholders show the last loaded step
    pub content: Arc<ModelNode>,
    /// Whether this step is currently shown
    pub visible: bool,
}

impl DynamicGroup {
    fn placeholder(step: u32, total: u32) -> Self {
        Self {
            filename: String::new(),
            loaded: false,
            valid: false,
            content: Arc::new(ModelNode::empty(not_loaded_message(step, total))),
            visible: false,
        }
    }
}

/// Text shown while a step has no data
pub fn not_loaded_message(step: u32, total: u32) -> String {
    format!("Step {} of {} is not loaded...", step + 1, total)
}

/// Steps discovered on disk one file at a time
///
/// Invariants: `next_index_to_load <= max_files_to_load`; groups at or past
/// `next_index_to_load` are placeholders.
#[derive(Debug, Clone)]
pub struct DynamicSet {
    /// Set name
    pub name: String,
    /// Menu the set appears under
    pub menu_name: String,
    /// Where to look for new steps
    pub header: DynamicSetHeader,
    /// Number of steps
    pub max_files_to_load: u32,
    /// First step without data
    pub next_index_to_load: u32,
    /// Local tick
    pub current_time: u32,
    /// Equal to `max_files_to_load`; valid steps are `[0, end_time)`
    pub end_time: u32,
    /// One group per step
    pub groups: Vec<DynamicGroup>,
    /// Hidden sets show no step
    pub visible: bool,
}

impl DynamicSet {
    /// Create a set of `max_files_to_load` placeholder steps, step 0 shown
    pub fn new(
        name: impl Into<String>,
        menu_name: impl Into<String>,
        header: DynamicSetHeader,
        max_files_to_load: u32,
    ) -> Self {
        let mut groups: Vec<DynamicGroup> = (0..max_files_to_load)
            .map(|step| DynamicGroup::placeholder(step, max_files_to_load))
            .collect();
        if let Some(first) = groups.first_mut() {
            first.visible = true;
        }

        Self {
            name: name.into(),
            menu_name: menu_name.into(),
            header,
            max_files_to_load,
            next_index_to_load: 0,
            current_time: 0,
            end_time: max_files_to_load,
            groups,
            visible: true,
        }
    }

    /// Last step index the timeline visits
    pub fn last_step(&self) -> u32 {
        self.end_time.saturating_sub(1)
    }

    /// Every step has data
    pub fn is_complete(&self) -> bool {
        self.next_index_to_load >= self.max_files_to_load
    }

    /// Advance one tick, wrapping at this set's own end
    pub fn step_forward(&mut self) {
        self.current_time = super::wrap_next(self.current_time, self.last_step());
    }

    /// Go back one tick, wrapping at this set's own end
    pub fn step_back(&mut self) {
        self.current_time = super::wrap_prev(self.current_time, self.last_step());
    }

    /// Follow global tick `t`, wrapping onto this set's own length
    pub fn follow(&mut self, t: u32) {
        self.current_time = t % (self.last_step() + 1);
    }

    /// Hide every step
    pub fn hide_all(&mut self) {
        for group in &mut self.groups {
            group.visible = false;
        }
    }

    fn set_step_visible(&mut self, step: u32, visible: bool) {
        if let Some(group) = self.groups.get_mut(step as usize) {
            group.visible = visible;
        }
    }

    /// Show the current step, hiding the step the timeline just left
    ///
    /// Outside `[0, end_time)` every step is hidden.
    pub fn show_current(&mut self) {
        let t = self.current_time;
        let end = self.end_time;

        if t >= end {
            self.hide_all();
            return;
        }

        if t == 0 {
            self.set_step_visible(end - 1, false);
        } else if t == end - 1 {
            self.set_step_visible(end.saturating_sub(2), false);
        } else {
            self.set_step_visible(t - 1, false);
        }
        self.set_step_visible(t, true);
    }

    /// Whether a step has data
    pub fn is_step_loaded(&self, step: u32) -> bool {
        self.groups.get(step as usize).is_some_and(|g| g.loaded)
    }

    /// Indicator text for the current step, if it has no data yet
    pub fn pending_message(&self) -> Option<String> {
        (self.current_time < self.end_time && !self.is_step_loaded(self.current_time))
            .then(|| not_loaded_message(self.current_time, self.max_files_to_load))
    }

    /// Record a newly loaded file as the next step
    ///
    /// Later placeholders are pointed at the new content so the set keeps
    /// showing the most recent data. Returns false when every step is
    /// already loaded.
    pub fn incorporate(&mut self, filename: String, node: Arc<ModelNode>, known_files: Vec<String>) -> bool {
        let index = self.next_index_to_load as usize;
        let Some(group) = self.groups.get_mut(index) else {
            log::warn!(
                "Dynamic set '{}' has no step {} for {}; ignoring",
                self.name,
                index,
                filename
            );
            return false;
        };

        group.valid = !node.is_empty();
        group.loaded = true;
        group.filename = filename;
        group.content = Arc::clone(&node);

        self.header.known_files = known_files;
        self.next_index_to_load += 1;

        for placeholder in &mut self.groups[index + 1..] {
            placeholder.content = Arc::clone(&node);
        }

        log::info!(
            "Loaded {} of {} steps for '{}'",
            self.next_index_to_load,
            self.max_files_to_load,
            self.name
        );
        true
    }

    /// Content of visible steps
    pub fn visible_nodes(&self) -> impl Iterator<Item = &Arc<ModelNode>> {
        self.groups.iter().filter(|g| g.visible).map(|g| &g.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::MeshData;

    fn mesh(name: &str) -> Arc<ModelNode> {
        Arc::new(ModelNode::mesh(
            name,
            format!("{name}.obj"),
            MeshData {
                positions: vec![[0.0; 3]; 3],
                indices: vec![0, 1, 2],
            },
        ))
    }

    fn visible_steps(set: &DynamicSet) -> Vec<usize> {
        set.groups
            .iter()
            .enumerate()
            .filter(|(_, g)| g.visible)
            .map(|(i, _)| i)
            .collect()
    }

    #[test]
    fn test_header_matching() {
        let header = DynamicSetHeader::new("/data", "run_", ".obj");
        assert!(header.matches("run_0001.obj"));
        assert!(header.matches("run_0001.OBJ"));
        assert!(!header.matches("walk_0001.obj"));
        assert!(!header.matches("run_0001.stl"));
    }

    #[test]
    fn test_new_set_is_all_placeholders_with_first_shown() {
        let set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 3);
        assert_eq!(set.end_time, 3);
        assert_eq!(visible_steps(&set), vec![0]);
        assert!(set.groups.iter().all(|g| !g.loaded));
        assert_eq!(set.pending_message().as_deref(), Some("Step 1 of 3 is not loaded..."));
    }

    #[test]
    fn test_placeholders_show_last_loaded_content() {
        let mut set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 5);
        set.incorporate("a.obj".into(), mesh("a"), vec!["a.obj".into()]);
        set.incorporate("b.obj".into(), mesh("b"), vec!["a.obj".into(), "b.obj".into()]);

        assert_eq!(set.next_index_to_load, 2);
        for step in 2..5 {
            assert_eq!(set.groups[step].content.name, "b");
            assert!(!set.groups[step].loaded);
        }
        assert_eq!(set.header.known_files.len(), 2);
    }

    #[test]
    fn test_incorporate_past_the_end_is_refused() {
        let mut set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 1);
        assert!(set.incorporate("a.obj".into(), mesh("a"), vec![]));
        assert!(!set.incorporate("b.obj".into(), mesh("b"), vec![]));
        assert!(set.is_complete());
    }

    #[test]
    fn test_forward_play_shows_one_step_at_a_time() {
        let mut set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 4);
        for _ in 0..9 {
            set.step_forward();
            set.show_current();
            assert_eq!(visible_steps(&set), vec![set.current_time as usize]);
        }
    }

    #[test]
    fn test_out_of_range_time_hides_everything() {
        let mut set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 2);
        set.current_time = 2;
        set.show_current();
        assert!(visible_steps(&set).is_empty());
    }

    #[test]
    fn test_single_step_set() {
        let mut set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 1);
        set.step_forward();
        set.show_current();
        assert_eq!(set.current_time, 0);
        assert_eq!(visible_steps(&set), vec![0]);
    }

    #[test]
    fn test_empty_set_never_panics() {
        let mut set = DynamicSet::new("d", "m", DynamicSetHeader::default(), 0);
        set.step_forward();
        set.follow(7);
        set.show_current();
        assert_eq!(set.current_time, 0);
        assert!(set.pending_message().is_none());
    }
}
