//! The scene presenter
//!
//! One tick does, in order:
//!
//! 1. poll dynamic sources (start a watcher, or consume a finished one)
//! 2. advance the timeline if animating and the animation gate fires
//! 3. advance the sequence if auto-play is on and the camera is idle
//! 4. recompute time-set and dynamic-set visibility if anything moved
//! 5. re-apply every toggle and radio set
//!
//! At most one watcher per dynamic set is ever outstanding; a new one is
//! only started on a poll that finds the slot empty.

use super::{
    CameraPathPlayer, PathInterpolator, SceneBuildable, TextOverlay, TimeVaryingData,
    TimelineNavigator, UpdateListener, ViewSource,
};
use crate::assets::{ModelLoader, ModelNode};
use crate::config::PresenterConfig;
use crate::foundation::time::UpdatePolicy;
use crate::jobs::{DynamicSetWatcher, JobExecutor, WatcherHandle, WatcherOutcome, WatcherReport};
use crate::scene::{GlobalTimeline, SceneData, SetKind};
use std::sync::Arc;

/// Watcher bookkeeping for one dynamic set
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct WatcherStats {
    /// Watchers submitted
    pub started: u64,
    /// Watcher reports consumed
    pub consumed: u64,
}

impl WatcherStats {
    /// Watchers submitted but not yet consumed
    pub fn outstanding(&self) -> u64 {
        self.started - self.consumed
    }
}

/// Owns the scene and drives it over time
pub struct ScenePresenter {
    scene: SceneData,
    timeline: GlobalTimeline,
    config: PresenterConfig,

    loader: Arc<dyn ModelLoader>,
    executor: Arc<dyn JobExecutor>,
    watchers: Vec<Option<WatcherHandle>>,
    watcher_stats: Vec<WatcherStats>,

    animating: bool,
    animation_gate: UpdatePolicy,
    file_check_gate: UpdatePolicy,

    sequence_autoplay: bool,
    camera: Option<Box<dyn CameraPathPlayer + Send>>,
    view: Option<Box<dyn ViewSource + Send>>,
    interpolator: PathInterpolator,

    recompute_pending: bool,
    status_dirty: bool,
    status_text_at: Option<(u32, u32)>,
    not_loaded_text_at: Option<(u32, u32)>,
}

impl ScenePresenter {
    /// Create a presenter over built scene data
    ///
    /// Watchers load new steps through `loader` on `executor`.
    pub fn new(
        scene: SceneData,
        config: PresenterConfig,
        loader: Arc<dyn ModelLoader>,
        executor: Arc<dyn JobExecutor>,
    ) -> Self {
        let dynamic_count = scene.dynamic_sets.len();
        let mut presenter = Self {
            scene,
            timeline: GlobalTimeline::default(),
            animation_gate: UpdatePolicy::every_ticks(config.animation_speed),
            file_check_gate: UpdatePolicy::every_ticks(config.file_check_interval),
            interpolator: PathInterpolator::new(config.arc),
            config,
            loader,
            executor,
            watchers: std::iter::repeat_with(|| None).take(dynamic_count).collect(),
            watcher_stats: vec![WatcherStats::default(); dynamic_count],
            animating: false,
            sequence_autoplay: false,
            camera: None,
            view: None,
            recompute_pending: true,
            status_dirty: true,
            status_text_at: None,
            not_loaded_text_at: None,
        };
        presenter.update_global_end_time();
        presenter
    }

    /// Attach the camera-path player
    pub fn with_camera(mut self, camera: Box<dyn CameraPathPlayer + Send>) -> Self {
        self.camera = Some(camera);
        self
    }

    /// Attach the source of the current view transform
    pub fn with_view(mut self, view: Box<dyn ViewSource + Send>) -> Self {
        self.view = Some(view);
        self
    }

    /// The scene being presented
    pub fn scene(&self) -> &SceneData {
        &self.scene
    }

    /// The global timeline
    pub fn timeline(&self) -> GlobalTimeline {
        self.timeline
    }

    /// Active configuration
    pub fn config(&self) -> &PresenterConfig {
        &self.config
    }

    /// Last step is the longest time set's last tick or the longest dynamic
    /// set's last step
    fn update_global_end_time(&mut self) {
        let time_end = self.scene.time_sets.iter().map(|s| s.end_time).max().unwrap_or(0);
        let dynamic_end = self.scene.dynamic_sets.iter().map(|s| s.last_step()).max().unwrap_or(0);

        self.timeline.end_time = time_end.max(dynamic_end);
        self.timeline.set(self.timeline.current_time);
        log::debug!("Global timeline has {} steps", self.timeline.end_time + 1);
    }

    // Dynamic sources

    fn poll_dynamic_sources(&mut self) {
        for index in 0..self.scene.dynamic_sets.len() {
            if self.scene.dynamic_sets[index].is_complete() {
                continue;
            }

            if self.watchers[index].is_none() {
                self.start_watcher(index);
                continue;
            }

            let report = self.watchers[index].as_mut().and_then(WatcherHandle::poll);
            if let Some(report) = report {
                self.watchers[index] = None;
                self.watcher_stats[index].consumed += 1;
                self.consume_report(index, report);
            }
        }
    }

    fn start_watcher(&mut self, index: usize) {
        let set = &self.scene.dynamic_sets[index];
        let label = format!("watch {}", set.name);
        let watcher = DynamicSetWatcher::new(set.header.clone(), Arc::clone(&self.loader));

        match watcher.spawn(&label, self.executor.as_ref()) {
            Ok(handle) => {
                self.watchers[index] = Some(handle);
                self.watcher_stats[index].started += 1;
                log::trace!("Started watcher for '{}'", set.name);
            }
            Err(e) => log::warn!("Cannot watch '{}': {}", set.name, e),
        }
    }

    fn consume_report(&mut self, index: usize, report: WatcherReport) {
        let set = &mut self.scene.dynamic_sets[index];
        match report.outcome {
            WatcherOutcome::Loaded { file, node, inventory } => {
                log::debug!("Watcher for '{}' loaded {} in {:?}", set.name, file, report.elapsed);
                if set.incorporate(file, Arc::new(node), inventory) {
                    self.recompute_pending = true;
                }
            }
            WatcherOutcome::NoNewData => log::trace!("No new data for '{}'", set.name),
            WatcherOutcome::LoadFailed { file, error } => {
                log::debug!("Will retry {} for '{}': {}", file, set.name, error);
            }
            WatcherOutcome::Cancelled => log::debug!("Watcher for '{}' was cancelled", set.name),
        }
    }

    /// Watcher counts for a dynamic set
    pub fn watcher_stats(&self, index: usize) -> Option<WatcherStats> {
        self.watcher_stats.get(index).copied()
    }

    // Visibility

    /// Time sets and dynamic sets first, then toggle and radio sets
    ///
    /// With `reset_dynamic` every dynamic step is hidden before the current
    /// one is shown; otherwise only the step the timeline just left is.
    fn recompute_visibility(&mut self, reset_dynamic: bool) {
        let models = &mut self.scene.models;
        if !self.scene.time_sets.is_empty() {
            models.hide_all();
            for set in self.scene.time_sets.iter().filter(|s| s.visible) {
                for group in set.active_groups() {
                    models.apply(&group.models);
                }
            }
        }

        for set in &mut self.scene.dynamic_sets {
            if !set.visible {
                set.hide_all();
                continue;
            }
            if reset_dynamic {
                set.hide_all();
            }
            set.show_current();
        }

        self.enforce_static_sets();
        self.recompute_pending = false;
        self.status_dirty = true;
    }

    fn enforce_static_sets(&mut self) {
        for index in 0..self.scene.sets.len() {
            if let Some(group) = self.scene.sets[index].enforced_group() {
                self.apply_group(index, group);
            }
        }
    }

    /// Hide every model any group of the set shows, then apply one group
    fn apply_group(&mut self, set_index: usize, group_index: usize) {
        let set = &self.scene.sets[set_index];
        for group in &set.groups {
            self.scene.models.hide_shown(&group.models);
        }
        self.scene.models.apply(&set.groups[group_index].models);
    }

    /// Show one group of a set
    ///
    /// For a toggle set this also sets the toggle state, so the per-tick
    /// enforcement keeps the chosen group.
    pub fn set_group(&mut self, set_index: usize, group_index: usize) {
        let Some(set) = self.scene.sets.get_mut(set_index) else {
            log::trace!("No set {}", set_index);
            return;
        };
        if group_index >= set.groups.len() {
            log::trace!("Set '{}' has no group {}", set.name, group_index);
            return;
        }

        set.active_group = group_index;
        if set.kind == SetKind::Toggle {
            set.visible = group_index == 0;
        }
        self.apply_group(set_index, group_index);
    }

    /// Active group of a set
    pub fn current_group(&self, set_index: usize) -> Option<usize> {
        self.scene.sets.get(set_index).map(|s| s.active_group)
    }

    /// Toggle state of a set
    pub fn toggle_state(&self, set_index: usize) -> Option<bool> {
        self.scene.sets.get(set_index).map(|s| s.visible)
    }

    /// Set the toggle state of a set; takes effect on the next tick
    pub fn set_toggle_state(&mut self, set_index: usize, visible: bool) {
        match self.scene.sets.get_mut(set_index) {
            Some(set) => set.visible = visible,
            None => log::trace!("No set {}", set_index),
        }
    }

    /// Whether a time set contributes to visibility
    pub fn timeline_state(&self, index: usize) -> Option<bool> {
        self.scene.time_sets.get(index).map(|s| s.visible)
    }

    /// Show or hide a time set
    pub fn set_timeline_state(&mut self, index: usize, visible: bool) {
        match self.scene.time_sets.get_mut(index) {
            Some(set) => {
                set.visible = visible;
                self.recompute_pending = true;
            }
            None => log::trace!("No time set {}", index),
        }
    }

    /// Whether a dynamic set is shown
    pub fn dynamic_state(&self, index: usize) -> Option<bool> {
        self.scene.dynamic_sets.get(index).map(|s| s.visible)
    }

    /// Show or hide a dynamic set
    pub fn set_dynamic_state(&mut self, index: usize, visible: bool) {
        let Some(set) = self.scene.dynamic_sets.get_mut(index) else {
            log::trace!("No dynamic set {}", index);
            return;
        };

        set.visible = visible;
        set.hide_all();
        if visible {
            set.show_current();
        }
        self.status_dirty = true;
    }

    /// Names of visible static models
    pub fn visible_models(&self) -> Vec<&str> {
        self.scene.models.visible_names()
    }

    /// Everything currently drawn: static models, then dynamic steps
    pub fn visible_nodes(&self) -> Vec<Arc<ModelNode>> {
        let static_nodes = self
            .scene
            .models
            .entries()
            .iter()
            .filter(|entry| entry.visible)
            .map(|entry| Arc::clone(&entry.node));

        let dynamic_nodes = self
            .scene
            .dynamic_sets
            .iter()
            .flat_map(|set| set.visible_nodes())
            .map(Arc::clone);

        static_nodes.chain(dynamic_nodes).collect()
    }

    // Timeline

    /// Ticks per timeline step while animating
    pub fn animation_speed(&self) -> u32 {
        self.config.animation_speed
    }

    /// Change the animation pace; restarts the gate's count
    pub fn set_animation_speed(&mut self, ticks: u32) {
        self.config.animation_speed = ticks.max(1);
        self.animation_gate = UpdatePolicy::every_ticks(self.config.animation_speed);
    }

    fn advance(&mut self) {
        self.timeline.next();
        for set in &mut self.scene.time_sets {
            set.step_forward();
        }
        for set in &mut self.scene.dynamic_sets {
            set.step_forward();
        }
    }

    fn jump_to(&mut self, t: u32) {
        self.timeline.set(t);
        let t = self.timeline.current_time;
        for set in &mut self.scene.time_sets {
            set.follow(t);
        }
        for set in &mut self.scene.dynamic_sets {
            set.follow(t);
        }
    }

    // Sequence

    fn apply_sequence_step(&mut self) {
        let Some(step) = self.scene.sequence.current_step().cloned() else {
            return;
        };

        if step.change_location {
            self.set_animation_path(&step.location_name);
        }
        self.scene.models.hide_all();
        self.scene.models.apply(&step.models);
        log::debug!("Sequence step {} ('{}')", self.scene.sequence.current, step.name);
    }

    /// Move to the next sequence step, wrapping
    pub fn next_sequence_step(&mut self) {
        if self.scene.sequence.next().is_some() {
            self.apply_sequence_step();
        }
    }

    /// Move to the previous sequence step, wrapping
    pub fn prev_sequence_step(&mut self) {
        if self.scene.sequence.prev().is_some() {
            self.apply_sequence_step();
        }
    }

    /// Move to the first sequence step
    pub fn first_sequence_step(&mut self) {
        if self.scene.sequence.first().is_some() {
            self.apply_sequence_step();
        }
    }

    /// Current sequence step index
    pub fn current_sequence_step(&self) -> usize {
        self.scene.sequence.current
    }

    /// Advance the sequence whenever the camera finishes a path
    ///
    /// Turning auto-play off rewinds the sequence and stops the camera.
    pub fn set_sequence_autoplay(&mut self, enabled: bool) {
        self.sequence_autoplay = enabled;
        if !enabled {
            self.scene.sequence.current = 0;
            if let Some(camera) = self.camera.as_mut() {
                camera.stop();
            }
        }
    }

    /// Whether the sequence advances automatically
    pub fn is_sequence_autoplay(&self) -> bool {
        self.sequence_autoplay
    }

    /// Animate the camera from the current view to a named location
    ///
    /// Does nothing if the location is unknown or no camera or view is
    /// attached.
    pub fn set_animation_path(&mut self, location: &str) {
        let Some(target) = self.scene.locations.get(location).copied() else {
            log::trace!("No location named '{}'", location);
            return;
        };
        let (Some(camera), Some(view)) = (self.camera.as_mut(), self.view.as_ref()) else {
            log::trace!("No camera attached; ignoring path to '{}'", location);
            return;
        };

        let current = view.view_transform();
        let path = if self.config.interpolate_paths {
            self.interpolator.arc_path(&current, &target)
        } else {
            vec![current, target]
        };
        camera.animate_path(&path);
    }

    // Status text

    fn place_text(
        overlay: &mut dyn TextOverlay,
        slot: &mut Option<(u32, u32)>,
        position: (u32, u32),
        text: Option<&str>,
    ) {
        if let Some((x, y)) = slot.take() {
            overlay.remove_text(x, y);
        }
        if let Some(text) = text {
            overlay.set_text(position.0, position.1, text);
            *slot = Some(position);
        }
    }

    fn write_status(&mut self, overlay: &mut dyn TextOverlay) {
        self.status_dirty = false;
        if self.scene.time_sets.is_empty() && self.scene.dynamic_sets.is_empty() {
            return;
        }

        let (width, height) = overlay.viewport();
        let step = format!("Current Step: {}", self.timeline.current_time + 1);
        Self::place_text(
            overlay,
            &mut self.status_text_at,
            self.config.status_text.resolve(width, height),
            Some(step.as_str()),
        );

        let pending = self
            .scene
            .dynamic_sets
            .iter()
            .filter(|set| set.visible)
            .find_map(|set| set.pending_message());
        Self::place_text(
            overlay,
            &mut self.not_loaded_text_at,
            self.config.not_loaded_text.resolve(width, height),
            pending.as_deref(),
        );
    }
}

impl UpdateListener for ScenePresenter {
    fn on_tick(&mut self, overlay: &mut dyn TextOverlay) {
        if !self.scene.dynamic_sets.is_empty() && self.file_check_gate.fire() {
            self.poll_dynamic_sources();
        }

        if self.animating && self.animation_gate.fire() {
            self.advance();
            self.recompute_pending = true;
        }

        if self.sequence_autoplay {
            let idle = self.camera.as_ref().is_some_and(|camera| !camera.is_playing());
            if idle {
                self.next_sequence_step();
            }
        }

        if self.recompute_pending {
            self.recompute_visibility(false);
        } else {
            self.enforce_static_sets();
        }

        if self.status_dirty {
            self.write_status(overlay);
        }
    }
}

impl TimelineNavigator for ScenePresenter {
    fn next_step(&mut self) {
        self.advance();
        self.recompute_visibility(true);
    }

    fn prev_step(&mut self) {
        self.timeline.prev();
        for set in &mut self.scene.time_sets {
            set.step_back();
        }
        for set in &mut self.scene.dynamic_sets {
            set.step_back();
        }
        self.recompute_visibility(true);
    }

    fn first_step(&mut self) {
        self.jump_to(0);
        self.recompute_visibility(true);
    }

    fn set_step(&mut self, t: u32) {
        self.jump_to(t);
        self.recompute_visibility(true);
    }

    fn start_animation(&mut self) {
        self.animating = true;
    }

    fn stop_animation(&mut self) {
        self.animating = false;
    }

    fn is_animating(&self) -> bool {
        self.animating
    }
}

impl TimeVaryingData for ScenePresenter {
    fn current_time_step(&self) -> u32 {
        self.timeline.current_time
    }

    fn number_of_time_steps(&self) -> u32 {
        if self.timeline.end_time > 0 {
            self.timeline.end_time + 1
        } else {
            0
        }
    }

    fn set_current_time_step(&mut self, t: u32) {
        if t < self.number_of_time_steps() {
            self.set_step(t);
        }
    }
}

impl SceneBuildable for ScenePresenter {
    fn build_scene(&mut self) -> Vec<Arc<ModelNode>> {
        self.first_step();
        for index in 0..self.scene.sets.len() {
            let set = &self.scene.sets[index];
            if set.enforced_group().is_none() && !set.groups.is_empty() {
                self.apply_group(index, 0);
            }
        }
        self.visible_nodes()
    }
}
