//! Headless presentation driver
//!
//! Loads a scene definition, starts the timeline and runs the tick loop for
//! a fixed number of frames, logging status text as it changes.
//!
//! ```text
//! presenter <scene.toml|scene.ron> [presenter.toml|presenter.ron] [frames]
//! ```

mod overlay;

use overlay::ConsoleOverlay;
use presentation_engine::foundation::logging;
use presentation_engine::prelude::*;
use std::path::PathBuf;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_FRAMES: u64 = 600;
const FRAME_TIME: Duration = Duration::from_millis(16);
const CAMERA_STEPS_PER_SEGMENT: u32 = 30;

#[derive(Error, Debug)]
enum AppError {
    #[error("usage: presenter <scene> [config] [frames]")]
    Usage,

    #[error("invalid frame count '{0}'")]
    Frames(String),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Definition(#[from] DefinitionError),
}

struct Args {
    scene: PathBuf,
    config: Option<PathBuf>,
    frames: u64,
}

impl Args {
    fn parse() -> Result<Self, AppError> {
        let mut args = std::env::args().skip(1);
        let scene = args.next().map(PathBuf::from).ok_or(AppError::Usage)?;
        let config = args.next().map(PathBuf::from);
        let frames = match args.next() {
            Some(text) => text.parse().map_err(|_| AppError::Frames(text))?,
            None => DEFAULT_FRAMES,
        };
        Ok(Self { scene, config, frames })
    }
}

fn run(args: Args) -> Result<(), AppError> {
    let config = match &args.config {
        Some(path) => PresenterConfig::load_from_file(path)?,
        None => PresenterConfig::default(),
    };
    config.validate()?;
    logging::init_with_level(&config.log_level);

    log::info!("Loading scene {}", args.scene.display());
    let loader: Arc<dyn ModelLoader> = Arc::new(
        LoaderRegistry::new().with_loader("obj", Arc::new(ObjModelLoader::new())),
    );
    let scene = SceneDefinition::build_from_file(&args.scene, loader.as_ref())?;
    let has_sequence = !scene.sequence.is_empty();

    let jobs = Arc::new(JobManager::new(config.worker_threads));
    let camera = Arc::new(Mutex::new(SteppedPathPlayer::new(
        Transform::identity(),
        CAMERA_STEPS_PER_SEGMENT,
    )));

    let mut presenter = ScenePresenter::new(scene, config, loader, jobs)
        .with_camera(Box::new(Arc::clone(&camera)))
        .with_view(Box::new(Arc::clone(&camera)));

    let nodes = presenter.build_scene();
    log::info!(
        "Scene ready: {} visible nodes, {} time steps",
        nodes.len(),
        presenter.number_of_time_steps()
    );

    presenter.start_animation();
    if has_sequence {
        presenter.first_sequence_step();
        presenter.set_sequence_autoplay(true);
    }

    let mut overlay = ConsoleOverlay::new(1280, 720);
    for frame in 0..args.frames {
        camera
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .advance();
        presenter.on_tick(&mut overlay);

        if frame % 60 == 0 {
            log::debug!(
                "Frame {}: step {}, visible {:?}",
                frame,
                presenter.current_time_step(),
                presenter.visible_models()
            );
        }
        std::thread::sleep(FRAME_TIME);
    }

    for line in overlay.lines() {
        log::info!("Final status: {}", line);
    }
    Ok(())
}

fn main() {
    if let Err(e) = Args::parse().and_then(run) {
        log::error!("{}", e);
        eprintln!("{e}");
        std::process::exit(1);
    }
}
