//! # Presentation Engine
//!
//! Drives a time-varying 3D scene assembled from many model files.
//!
//! ## Features
//!
//! - **Visibility sets**: toggle, radio, time-indexed and streamed sets
//! - **Global timeline**: one counter, each set wrapping on its own length
//! - **Dynamic sources**: background directory watchers, one per set
//! - **Camera sequences**: scripted stops with arcing camera paths
//! - **Declarative scenes**: TOML or RON definitions with sensible defaults
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use presentation_engine::prelude::*;
//! use std::sync::Arc;
//!
//! struct Silent;
//!
//! impl TextOverlay for Silent {
//!     fn viewport(&self) -> (u32, u32) { (1280, 720) }
//!     fn set_text(&mut self, _x: u32, _y: u32, _text: &str) {}
//!     fn remove_text(&mut self, _x: u32, _y: u32) {}
//! }
//!
//! fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let loader: Arc<dyn ModelLoader> = Arc::new(ObjModelLoader::new());
//!     let scene = SceneDefinition::build_from_file("scene.toml", loader.as_ref())?;
//!     let jobs = Arc::new(JobManager::new(2));
//!
//!     let mut presenter = ScenePresenter::new(scene, PresenterConfig::default(), loader, jobs);
//!     presenter.build_scene();
//!     presenter.start_animation();
//!
//!     let mut overlay = Silent;
//!     loop {
//!         presenter.on_tick(&mut overlay);
//!     }
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions, clippy::similar_names, clippy::too_many_arguments)]

pub mod foundation;
pub mod config;
pub mod assets;
pub mod scene;
pub mod jobs;
pub mod presentation;

/// Common imports for presenter users
pub mod prelude {
    pub use crate::{
        foundation::{
            math::{Vec3, Mat4, Quat, Transform},
            time::{UpdatePolicy, Stopwatch},
        },
        config::{Config, ConfigError, PresenterConfig},
        assets::{ModelLoader, ModelNode, ObjModelLoader, LoaderRegistry, AssetError},
        scene::{SceneData, SceneDefinition, DefinitionError},
        jobs::{JobExecutor, JobManager},
        presentation::{
            ScenePresenter, ArcProfile, PathInterpolator,
            CameraPathPlayer, ViewSource, TextOverlay, SteppedPathPlayer,
            SceneBuildable, UpdateListener, TimelineNavigator, TimeVaryingData,
        },
    };
}
