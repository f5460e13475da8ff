//! End-to-end playback of a scene definition on disk

use presentation_engine::prelude::*;
use std::fs;
use std::path::Path;
use std::sync::{Arc, Mutex};
use std::time::{Duration, Instant};

const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

const SCENE: &str = r#"
[[models]]
name = "terrain"
file = "models/terrain.obj"

[[models]]
name = "buildings"
directory = "models/buildings"

[[models]]
name = "early"
file = "models/early.obj"

[[models]]
name = "late"
file = "models/late.obj"

[[sets]]
name = "Buildings"
groups = [{ show = ["buildings"] }]

[[time_sets]]
groups = [
    { start_time = 0, end_time = 2, show = ["early"] },
    { start_time = 2, end_time = 4, show = ["late"] },
]

[[dynamic_sets]]
name = "plume"
directory = "output"
prefix = "plume_"
extension = "obj"
max = 3

[sequence]
steps = [
    { show = ["terrain"] },
    { location = "overview", change_location = true, show = ["terrain", "buildings"] },
]

[[locations]]
name = "overview"
value = "0 0 100 -90 0 0"
"#;

#[derive(Default)]
struct Overlay {
    texts: Vec<((u32, u32), String)>,
}

impl TextOverlay for Overlay {
    fn viewport(&self) -> (u32, u32) {
        (640, 480)
    }

    fn set_text(&mut self, x: u32, y: u32, text: &str) {
        self.remove_text(x, y);
        self.texts.push(((x, y), text.to_string()));
    }

    fn remove_text(&mut self, x: u32, y: u32) {
        self.texts.retain(|(p, _)| *p != (x, y));
    }
}

fn write_scene(root: &Path) {
    let models = root.join("models");
    fs::create_dir_all(models.join("buildings")).unwrap();
    fs::create_dir_all(root.join("output")).unwrap();

    for file in ["terrain.obj", "early.obj", "late.obj", "buildings/a.obj", "buildings/b.obj"] {
        fs::write(models.join(file), TRIANGLE).unwrap();
    }
    fs::write(root.join("scene.toml"), SCENE).unwrap();
}

fn tick_until(
    presenter: &mut ScenePresenter,
    overlay: &mut Overlay,
    done: impl Fn(&ScenePresenter) -> bool,
) {
    let deadline = Instant::now() + Duration::from_secs(10);
    while !done(presenter) {
        assert!(Instant::now() < deadline, "condition not reached in time");
        presenter.on_tick(overlay);
        std::thread::sleep(Duration::from_millis(1));
    }
}

#[test]
fn test_scene_plays_back_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());

    let loader: Arc<dyn ModelLoader> = Arc::new(ObjModelLoader::new());
    let scene = SceneDefinition::build_from_file(dir.path().join("scene.toml"), loader.as_ref()).unwrap();
    assert_eq!(scene.models.len(), 5);
    let buildings = &scene.models.entries()[2];
    assert_eq!(buildings.node.triangle_count(), 2);

    let camera = Arc::new(Mutex::new(SteppedPathPlayer::new(Transform::identity(), 2)));
    let jobs = Arc::new(JobManager::new(2));
    let mut presenter = ScenePresenter::new(scene, PresenterConfig::default(), loader, jobs)
        .with_camera(Box::new(Arc::clone(&camera)))
        .with_view(Box::new(Arc::clone(&camera)));
    let mut overlay = Overlay::default();

    presenter.build_scene();
    assert_eq!(presenter.number_of_time_steps(), 4);

    presenter.set_step(1);
    let mut visible = presenter.visible_models();
    visible.sort_unstable();
    assert_eq!(visible, vec!["buildings", "early"]);

    presenter.set_step(3);
    assert!(presenter.visible_models().contains(&"late"));
    assert!(!presenter.visible_models().contains(&"early"));

    // Steps appear on disk while the presenter is running
    presenter.set_step(0);
    presenter.on_tick(&mut overlay);
    assert!(overlay.texts.iter().any(|(_, t)| t == "Step 1 of 3 is not loaded..."));

    for step in 0..3 {
        fs::write(dir.path().join("output").join(format!("plume_{step}.obj")), TRIANGLE).unwrap();
    }
    tick_until(&mut presenter, &mut overlay, |p| p.scene().dynamic_sets[0].is_complete());

    let plume = &presenter.scene().dynamic_sets[0];
    let files: Vec<&str> = plume.groups.iter().map(|g| g.filename.as_str()).collect();
    assert_eq!(files, vec!["plume_0.obj", "plume_1.obj", "plume_2.obj"]);
    assert!(plume.groups.iter().all(|g| g.valid));

    presenter.on_tick(&mut overlay);
    assert!(!overlay.texts.iter().any(|(_, t)| t.ends_with("is not loaded...")));
    assert!(overlay.texts.iter().any(|(_, t)| t == "Current Step: 1"));

    // The sequence moves the camera to the overview
    presenter.first_sequence_step();
    assert_eq!(presenter.visible_models(), vec!["terrain"]);
    presenter.next_sequence_step();
    assert!(camera.lock().unwrap().is_playing());
    while camera.lock().unwrap().is_playing() {
        camera.lock().unwrap().advance();
    }
    let view = camera.lock().unwrap().view_transform();
    assert!((view.position.z - 100.0).abs() < 1e-3);
}

#[test]
fn test_animation_cycles_through_every_step() {
    let dir = tempfile::tempdir().unwrap();
    write_scene(dir.path());

    let loader: Arc<dyn ModelLoader> = Arc::new(ObjModelLoader::new());
    let scene = SceneDefinition::build_from_file(dir.path().join("scene.toml"), loader.as_ref()).unwrap();
    let config = PresenterConfig::default().with_animation_speed(1);
    let mut presenter = ScenePresenter::new(scene, config, loader, Arc::new(JobManager::new(1)));
    let mut overlay = Overlay::default();

    presenter.build_scene();
    presenter.start_animation();

    let mut seen = Vec::new();
    for _ in 0..8 {
        presenter.on_tick(&mut overlay);
        seen.push(presenter.current_time_step());
    }
    assert_eq!(seen, vec![1, 2, 3, 0, 1, 2, 3, 0]);
}
