//! Camera and overlay collaborators
//!
//! The presenter drives these through traits so a host application can
//! plug in its own view, path animation and text rendering.

use crate::foundation::math::Transform;
use std::sync::{Arc, Mutex, PoisonError};

/// Animates the camera along a list of transforms
pub trait CameraPathPlayer {
    /// Start animating through `path`, replacing any current animation
    fn animate_path(&mut self, path: &[Transform]);

    /// Whether an animation is in progress
    fn is_playing(&self) -> bool;

    /// Abandon the current animation
    fn stop(&mut self);
}

/// Reports the current camera transform
pub trait ViewSource {
    /// Current view transform
    fn view_transform(&self) -> Transform;
}

/// Screen-space text sink, supplied by the tick caller
pub trait TextOverlay {
    /// Viewport size in pixels
    fn viewport(&self) -> (u32, u32);

    /// Show `text` at a pixel position, replacing text already there
    fn set_text(&mut self, x: u32, y: u32, text: &str);

    /// Remove text at a pixel position
    fn remove_text(&mut self, x: u32, y: u32);
}

impl<T: CameraPathPlayer> CameraPathPlayer for Arc<Mutex<T>> {
    fn animate_path(&mut self, path: &[Transform]) {
        self.lock().unwrap_or_else(PoisonError::into_inner).animate_path(path);
    }

    fn is_playing(&self) -> bool {
        self.lock().unwrap_or_else(PoisonError::into_inner).is_playing()
    }

    fn stop(&mut self) {
        self.lock().unwrap_or_else(PoisonError::into_inner).stop();
    }
}

impl<T: ViewSource> ViewSource for Arc<Mutex<T>> {
    fn view_transform(&self) -> Transform {
        self.lock().unwrap_or_else(PoisonError::into_inner).view_transform()
    }
}

/// Path player that moves one waypoint per fixed number of steps
///
/// Nothing is interpolated; the view jumps to each waypoint in turn. Call
/// [`SteppedPathPlayer::advance`] once per frame.
#[derive(Debug, Clone)]
pub struct SteppedPathPlayer {
    steps_per_segment: u32,
    path: Vec<Transform>,
    waypoint: usize,
    remaining_in_segment: u32,
    view: Transform,
    paths_started: usize,
}

impl SteppedPathPlayer {
    /// Create a player starting at `view`
    pub fn new(view: Transform, steps_per_segment: u32) -> Self {
        Self {
            steps_per_segment: steps_per_segment.max(1),
            path: Vec::new(),
            waypoint: 0,
            remaining_in_segment: 0,
            view,
            paths_started: 0,
        }
    }

    /// Move one step along the path
    pub fn advance(&mut self) {
        if !self.is_playing() {
            return;
        }

        self.remaining_in_segment -= 1;
        if self.remaining_in_segment == 0 {
            self.waypoint += 1;
            if let Some(reached) = self.path.get(self.waypoint) {
                self.view = *reached;
            }
            if self.waypoint + 1 < self.path.len() {
                self.remaining_in_segment = self.steps_per_segment;
            }
        }
    }

    /// The path most recently handed to the player
    pub fn last_path(&self) -> &[Transform] {
        &self.path
    }

    /// How many paths have been started
    pub fn paths_started(&self) -> usize {
        self.paths_started
    }
}

impl CameraPathPlayer for SteppedPathPlayer {
    fn animate_path(&mut self, path: &[Transform]) {
        self.path = path.to_vec();
        self.waypoint = 0;
        self.paths_started += 1;
        if let Some(first) = self.path.first() {
            self.view = *first;
        }
        self.remaining_in_segment = if self.path.len() > 1 { self.steps_per_segment } else { 0 };
        log::debug!("Camera path started with {} waypoints", self.path.len());
    }

    fn is_playing(&self) -> bool {
        self.remaining_in_segment > 0
    }

    fn stop(&mut self) {
        self.remaining_in_segment = 0;
    }
}

impl ViewSource for SteppedPathPlayer {
    fn view_transform(&self) -> Transform {
        self.view
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::foundation::math::Vec3;

    fn at(x: f32) -> Transform {
        Transform::from_position(Vec3::new(x, 0.0, 0.0))
    }

    #[test]
    fn test_plays_each_segment_for_fixed_steps() {
        let mut player = SteppedPathPlayer::new(Transform::identity(), 2);
        player.animate_path(&[at(0.0), at(1.0), at(2.0)]);

        let mut frames = 0;
        while player.is_playing() {
            player.advance();
            frames += 1;
        }

        assert_eq!(frames, 4);
        assert_eq!(player.view_transform(), at(2.0));
        assert_eq!(player.paths_started(), 1);
    }

    #[test]
    fn test_stop_keeps_current_view() {
        let mut player = SteppedPathPlayer::new(Transform::identity(), 1);
        player.animate_path(&[at(0.0), at(1.0), at(2.0)]);
        player.advance();
        player.stop();

        assert!(!player.is_playing());
        assert_eq!(player.view_transform(), at(1.0));
        player.advance();
        assert_eq!(player.view_transform(), at(1.0));
    }

    #[test]
    fn test_single_point_path_does_not_play() {
        let mut player = SteppedPathPlayer::new(Transform::identity(), 3);
        player.animate_path(&[at(5.0)]);
        assert!(!player.is_playing());
        assert_eq!(player.view_transform(), at(5.0));
    }

    #[test]
    fn test_shared_player_forwards_calls() {
        let shared = Arc::new(Mutex::new(SteppedPathPlayer::new(Transform::identity(), 1)));
        let mut handle = Arc::clone(&shared);
        handle.animate_path(&[at(0.0), at(1.0)]);

        assert!(handle.is_playing());
        shared.lock().unwrap().advance();
        assert!(!handle.is_playing());
        assert_eq!(handle.view_transform(), at(1.0));
    }
}
