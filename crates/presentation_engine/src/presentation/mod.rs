//! Scene presentation
//!
//! [`ScenePresenter`] owns a [`SceneData`](crate::scene::SceneData) and is
//! the only thing that mutates it. The host calls
//! [`UpdateListener::on_tick`] once per frame and the navigation methods
//! from menus or scripts; everything else happens inside.
//!
//! Capabilities are split into small traits so a host can hold the
//! presenter behind whichever one it needs.

mod camera;
mod path;
mod presenter;

pub use camera::{CameraPathPlayer, SteppedPathPlayer, TextOverlay, ViewSource};
pub use path::{ArcProfile, PathInterpolator};
pub use presenter::{ScenePresenter, WatcherStats};

use crate::assets::ModelNode;
use std::sync::Arc;

/// Produces the initial renderable scene
pub trait SceneBuildable {
    /// Reset to the first step, apply every set and return what is visible
    fn build_scene(&mut self) -> Vec<Arc<ModelNode>>;
}

/// Driven once per render-loop tick
pub trait UpdateListener {
    /// Poll background work, advance time and refresh visibility
    fn on_tick(&mut self, overlay: &mut dyn TextOverlay);
}

/// Manual and automatic control of the global timeline
pub trait TimelineNavigator {
    /// Advance one step, wrapping
    fn next_step(&mut self);
    /// Go back one step, wrapping
    fn prev_step(&mut self);
    /// Go to step 0
    fn first_step(&mut self);
    /// Go to step `t`, clamped to the last step
    fn set_step(&mut self, t: u32);
    /// Advance automatically on the animation gate
    fn start_animation(&mut self);
    /// Stop advancing automatically
    fn stop_animation(&mut self);
    /// Whether the timeline advances automatically
    fn is_animating(&self) -> bool;
}

/// Time-step access for generic time controls
pub trait TimeVaryingData {
    /// Current global step
    fn current_time_step(&self) -> u32;
    /// Number of steps, or 0 when the timeline has a single step
    fn number_of_time_steps(&self) -> u32;
    /// Go to step `t` if it exists
    fn set_current_time_step(&mut self, t: u32);
}
