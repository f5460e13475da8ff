//! # Presenter Configuration
//!
//! Runtime settings for the scene presenter: animation pacing, file-system
//! polling, worker pool size, camera arc shape and overlay placement.

use serde::{Serialize, Deserialize};

use super::{Config, ConfigError};
use crate::presentation::ArcProfile;

/// Where a line of status text sits, as fractions of the viewport size
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StatusAnchor {
    /// Horizontal fraction of the viewport width
    pub x: f64,
    /// Vertical fraction of the viewport height
    pub y: f64,
}

impl StatusAnchor {
    /// Create a new anchor
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Pixel position of this anchor in a viewport
    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
    pub fn resolve(&self, width: u32, height: u32) -> (u32, u32) {
        let x = (f64::from(width) * self.x).floor().max(0.0);
        let y = (f64::from(height) * self.y).floor().max(0.0);
        (x as u32, y as u32)
    }
}

/// # Presenter Configuration
///
/// Loaded once at startup; changing `animation_speed` at runtime goes through
/// [`crate::presentation::ScenePresenter::set_animation_speed`], which rebuilds
/// the timeline gate.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PresenterConfig {
    /// Log level filter handed to `env_logger`
    pub log_level: String,
    /// Ticks per timeline step while animating
    pub animation_speed: u32,
    /// Ticks between dynamic-source polls
    pub file_check_interval: u32,
    /// Worker threads for directory watchers
    pub worker_threads: usize,
    /// Shape of the camera arc between named locations
    pub arc: ArcProfile,
    /// Insert arc points between the current view and the target location
    pub interpolate_paths: bool,
    /// Anchor of the "Current Step" text
    pub status_text: StatusAnchor,
    /// Anchor of the "Step K of N is not loaded" text
    pub not_loaded_text: StatusAnchor,
}

impl PresenterConfig {
    /// Create a configuration with defaults
    pub fn new() -> Self {
        Self {
            log_level: "info".to_string(),
            animation_speed: 10,
            file_check_interval: 1,
            worker_threads: 2,
            arc: ArcProfile::default(),
            interpolate_paths: true,
            status_text: StatusAnchor::new(0.80, 0.05),
            not_loaded_text: StatusAnchor::new(0.5, 0.5),
        }
    }

    /// Set log level
    pub fn with_log_level(mut self, level: impl Into<String>) -> Self {
        self.log_level = level.into();
        self
    }

    /// Set ticks per timeline step
    pub fn with_animation_speed(mut self, ticks: u32) -> Self {
        self.animation_speed = ticks;
        self
    }

    /// Set ticks between dynamic-source polls
    pub fn with_file_check_interval(mut self, ticks: u32) -> Self {
        self.file_check_interval = ticks;
        self
    }

    /// Set the watcher pool size
    pub fn with_worker_threads(mut self, threads: usize) -> Self {
        self.worker_threads = threads;
        self
    }

    /// Set the camera arc shape
    pub fn with_arc(mut self, arc: ArcProfile) -> Self {
        self.arc = arc;
        self
    }

    /// Enable or disable arc interpolation for location changes
    pub fn with_interpolated_paths(mut self, enabled: bool) -> Self {
        self.interpolate_paths = enabled;
        self
    }

    /// Validate the configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.animation_speed == 0 {
            return Err(ConfigError::Invalid("animation_speed must be at least 1".to_string()));
        }
        if self.file_check_interval == 0 {
            return Err(ConfigError::Invalid("file_check_interval must be at least 1".to_string()));
        }
        if self.worker_threads == 0 {
            return Err(ConfigError::Invalid("worker_threads must be at least 1".to_string()));
        }
        self.arc.validate().map_err(ConfigError::Invalid)
    }
}

impl Default for PresenterConfig {
    fn default() -> Self {
        Self::new()
    }
}

impl Config for PresenterConfig {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigFormat;

    #[test]
    fn test_defaults_are_valid() {
        let config = PresenterConfig::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.animation_speed, 10);
        assert_eq!(config.file_check_interval, 1);
    }

    #[test]
    fn test_partial_toml_fills_defaults() {
        let config = PresenterConfig::from_str_with_format(
            "animation_speed = 4\ninterpolate_paths = false\n",
            ConfigFormat::Toml,
        )
        .unwrap();

        assert_eq!(config.animation_speed, 4);
        assert!(!config.interpolate_paths);
        assert_eq!(config.worker_threads, 2);
        assert_eq!(config.arc, ArcProfile::default());
    }

    #[test]
    fn test_zero_speed_is_rejected() {
        let config = PresenterConfig::new().with_animation_speed(0);
        assert!(matches!(config.validate(), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_save_and_load_ron() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("presenter.ron");
        let config = PresenterConfig::new().with_worker_threads(5);

        config.save_to_file(&path).unwrap();
        let loaded = PresenterConfig::load_from_file(&path).unwrap();

        assert_eq!(loaded.worker_threads, 5);
        assert_eq!(loaded.status_text, StatusAnchor::new(0.80, 0.05));
    }

    #[test]
    fn test_unknown_extension_is_unsupported() {
        let result = PresenterConfig::load_from_file("settings.yaml");
        assert!(matches!(result, Err(ConfigError::UnsupportedFormat(_))));
    }

    #[test]
    fn test_anchor_resolves_to_pixels() {
        assert_eq!(StatusAnchor::new(0.80, 0.05).resolve(1000, 800), (800, 40));
    }
}
