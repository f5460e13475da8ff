//! Dynamic-set directory watcher
//!
//! A watcher scans one directory once, diffs what it finds against the
//! files the set already has, and loads at most the first new file. The
//! result is published once over a single-slot channel, so the presenter
//! either sees a complete [`WatcherReport`] or nothing.

use super::{JobError, JobExecutor};
use crate::assets::{AssetError, ModelLoader, ModelNode};
use crate::foundation::time::Stopwatch;
use crate::scene::DynamicSetHeader;
use crossbeam::channel::{bounded, Receiver, TryRecvError};
use std::collections::BTreeSet;
use std::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use std::sync::Arc;
use std::time::Duration;

/// Watcher lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WatcherState {
    /// Created, not yet picked up by a worker
    Idle,
    /// Scanning or loading
    Running,
    /// Report published
    Done,
}

impl WatcherState {
    fn from_u8(value: u8) -> Self {
        match value {
            0 => Self::Idle,
            1 => Self::Running,
            _ => Self::Done,
        }
    }
}

/// What a watcher run produced
#[derive(Debug, Clone)]
pub enum WatcherOutcome {
    /// Nothing new in the directory
    NoNewData,
    /// The first new file was loaded
    Loaded {
        /// Loaded file name
        file: String,
        /// Loaded content
        node: ModelNode,
        /// Known files plus `file`
        inventory: Vec<String>,
    },
    /// A new file was found but could not be loaded
    LoadFailed {
        /// File that failed
        file: String,
        /// Loader error text
        error: String,
    },
    /// The cancel flag was seen before any work was done
    Cancelled,
}

/// Result of one watcher run
#[derive(Debug, Clone)]
pub struct WatcherReport {
    /// What happened
    pub outcome: WatcherOutcome,
    /// Time spent scanning and loading
    pub elapsed: Duration,
}

impl WatcherReport {
    fn new(outcome: WatcherOutcome, elapsed: Duration) -> Self {
        Self { outcome, elapsed }
    }

    /// Whether a new step was loaded
    pub fn found_new_data(&self) -> bool {
        matches!(self.outcome, WatcherOutcome::Loaded { .. })
    }
}

/// One scan-diff-load pass over a dynamic set's directory
pub struct DynamicSetWatcher {
    header: DynamicSetHeader,
    loader: Arc<dyn ModelLoader>,
    cancel: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
}

impl DynamicSetWatcher {
    /// Create a watcher over a snapshot of `header`
    pub fn new(header: DynamicSetHeader, loader: Arc<dyn ModelLoader>) -> Self {
        Self {
            header,
            loader,
            cancel: Arc::new(AtomicBool::new(false)),
            state: Arc::new(AtomicU8::new(WatcherState::Idle as u8)),
        }
    }

    /// Matching file names in the directory, sorted
    pub fn scan(&self) -> Result<Vec<String>, AssetError> {
        let mut files: Vec<String> = std::fs::read_dir(&self.header.directory)?
            .filter_map(Result::ok)
            .filter(|entry| entry.file_type().is_ok_and(|kind| kind.is_file()))
            .filter_map(|entry| entry.file_name().into_string().ok())
            .filter(|name| self.header.matches(name))
            .collect();
        files.sort();
        Ok(files)
    }

    /// First scanned file not already known
    pub fn first_new_file(&self, scanned: &[String]) -> Option<String> {
        let known: BTreeSet<&str> = self.header.known_files.iter().map(String::as_str).collect();
        scanned
            .iter()
            .find(|name| !known.contains(name.as_str()))
            .cloned()
    }

    fn cancelled(&self) -> bool {
        self.cancel.load(Ordering::Acquire)
    }

    /// Run the pass on the current thread
    pub fn run(&self) -> WatcherReport {
        let stopwatch = Stopwatch::start_new();
        self.state.store(WatcherState::Running as u8, Ordering::Release);

        let outcome = self.run_inner();
        log::trace!(
            "Watcher over {} finished in {:.2} ms",
            self.header.directory.display(),
            stopwatch.elapsed_millis()
        );
        WatcherReport::new(outcome, stopwatch.elapsed())
    }

    fn run_inner(&self) -> WatcherOutcome {
        if self.cancelled() {
            return WatcherOutcome::Cancelled;
        }

        let scanned = match self.scan() {
            Ok(files) => files,
            Err(e) => {
                log::debug!("Cannot scan {}: {}", self.header.directory.display(), e);
                return WatcherOutcome::NoNewData;
            }
        };

        let Some(file) = self.first_new_file(&scanned) else {
            return WatcherOutcome::NoNewData;
        };

        if self.cancelled() {
            return WatcherOutcome::Cancelled;
        }

        let path = self.header.directory.join(&file);
        match self.loader.load(&path) {
            Ok(node) => {
                let mut inventory = self.header.known_files.clone();
                inventory.push(file.clone());
                WatcherOutcome::Loaded { file, node, inventory }
            }
            Err(e) => {
                log::warn!("Failed to load {}: {}", path.display(), e);
                WatcherOutcome::LoadFailed {
                    file,
                    error: e.to_string(),
                }
            }
        }
    }

    /// Submit the pass to an executor and keep the receiving end
    pub fn spawn(self, label: &str, executor: &dyn JobExecutor) -> Result<WatcherHandle, JobError> {
        let (sender, receiver) = bounded(1);
        let cancel = Arc::clone(&self.cancel);
        let state = Arc::clone(&self.state);

        executor.spawn(
            label,
            Box::new(move || {
                let report = self.run();
                // The presenter may have dropped the handle already
                let _ = sender.try_send(report);
                self.state.store(WatcherState::Done as u8, Ordering::Release);
            }),
        )?;

        Ok(WatcherHandle {
            receiver,
            cancel,
            state,
            finished: false,
        })
    }
}

/// Presenter-side end of a submitted watcher
pub struct WatcherHandle {
    receiver: Receiver<WatcherReport>,
    cancel: Arc<AtomicBool>,
    state: Arc<AtomicU8>,
    finished: bool,
}

impl WatcherHandle {
    /// Current lifecycle state
    pub fn state(&self) -> WatcherState {
        WatcherState::from_u8(self.state.load(Ordering::Acquire))
    }

    /// Ask the watcher to skip work it has not started
    pub fn cancel(&self) {
        self.cancel.store(true, Ordering::Release);
    }

    /// Take the report if the watcher has finished
    ///
    /// Yields a report at most once. A job dropped without reporting counts
    /// as having found nothing.
    pub fn poll(&mut self) -> Option<WatcherReport> {
        if self.finished {
            return None;
        }

        let report = match self.receiver.try_recv() {
            Ok(report) => report,
            Err(TryRecvError::Empty) => return None,
            Err(TryRecvError::Disconnected) => {
                WatcherReport::new(WatcherOutcome::NoNewData, Duration::ZERO)
            }
        };
        self.finished = true;
        Some(report)
    }
}

impl Drop for WatcherHandle {
    fn drop(&mut self) {
        if !self.finished {
            self.cancel();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::{MeshData, ObjModelLoader};
    use crate::jobs::JobManager;
    use std::fs;
    use std::path::Path;
    use std::time::Instant;

    const TRIANGLE: &str = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";

    fn write_steps(dir: &Path, names: &[&str]) {
        for name in names {
            fs::write(dir.join(name), TRIANGLE).unwrap();
        }
    }

    fn header(dir: &Path, known: &[&str]) -> DynamicSetHeader {
        let mut header = DynamicSetHeader::new(dir, "", "obj");
        header.known_files = known.iter().map(|s| s.to_string()).collect();
        header
    }

    fn loaded_file(report: &WatcherReport) -> Option<&str> {
        match &report.outcome {
            WatcherOutcome::Loaded { file, .. } => Some(file),
            _ => None,
        }
    }

    #[test]
    fn test_loads_first_new_file_only() {
        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["d.obj", "b.obj", "c.obj", "a.obj"]);
        let loader: Arc<dyn ModelLoader> = Arc::new(ObjModelLoader::new());

        let report = DynamicSetWatcher::new(header(dir.path(), &["a.obj", "b.obj"]), Arc::clone(&loader)).run();
        assert!(report.found_new_data());
        assert_eq!(loaded_file(&report), Some("c.obj"));

        let WatcherOutcome::Loaded { inventory, node, .. } = &report.outcome else {
            panic!("expected a loaded step");
        };
        assert_eq!(inventory, &["a.obj", "b.obj", "c.obj"]);
        assert_eq!(node.triangle_count(), 1);

        let report = DynamicSetWatcher::new(header(dir.path(), &["a.obj", "b.obj", "c.obj"]), loader).run();
        assert_eq!(loaded_file(&report), Some("d.obj"));
    }

    #[test]
    fn test_known_files_need_not_be_a_prefix() {
        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["a.obj", "b.obj", "c.obj"]);
        let watcher = DynamicSetWatcher::new(header(dir.path(), &["c.obj", "a.obj"]), Arc::new(ObjModelLoader::new()));
        assert_eq!(loaded_file(&watcher.run()), Some("b.obj"));
    }

    #[test]
    fn test_no_new_files_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["a.obj", "b.obj"]);
        let report = DynamicSetWatcher::new(header(dir.path(), &["a.obj", "b.obj"]), Arc::new(ObjModelLoader::new())).run();
        assert!(!report.found_new_data());
        assert!(matches!(report.outcome, WatcherOutcome::NoNewData));
    }

    #[test]
    fn test_missing_directory_reports_no_data() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("not-there");
        let report = DynamicSetWatcher::new(header(&missing, &[]), Arc::new(ObjModelLoader::new())).run();
        assert!(matches!(report.outcome, WatcherOutcome::NoNewData));
    }

    #[test]
    fn test_prefix_and_extension_filter() {
        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["run_1.obj", "walk_1.obj", "run_2.txt"]);
        fs::create_dir(dir.path().join("run_dir.obj")).unwrap();

        let mut filtered = header(dir.path(), &[]);
        filtered.prefix = "run_".into();
        let watcher = DynamicSetWatcher::new(filtered, Arc::new(ObjModelLoader::new()));
        assert_eq!(watcher.scan().unwrap(), vec!["run_1.obj".to_string()]);
    }

    #[test]
    fn test_unparseable_file_reports_failure() {
        let dir = tempfile::tempdir().unwrap();
        fs::write(dir.path().join("a.obj"), "f 1 2 3\n").unwrap();
        let report = DynamicSetWatcher::new(header(dir.path(), &[]), Arc::new(ObjModelLoader::new())).run();
        assert!(matches!(report.outcome, WatcherOutcome::LoadFailed { ref file, .. } if file == "a.obj"));
    }

    #[test]
    fn test_cancelled_before_start_does_nothing() {
        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["a.obj"]);
        let watcher = DynamicSetWatcher::new(header(dir.path(), &[]), Arc::new(ObjModelLoader::new()));
        watcher.cancel.store(true, Ordering::Release);
        assert!(matches!(watcher.run().outcome, WatcherOutcome::Cancelled));
    }

    #[test]
    fn test_handle_yields_report_once() {
        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["a.obj"]);
        let manager = JobManager::new(1);
        let watcher = DynamicSetWatcher::new(header(dir.path(), &[]), Arc::new(ObjModelLoader::new()));
        let mut handle = watcher.spawn("watch", &manager).unwrap();

        let deadline = Instant::now() + Duration::from_secs(5);
        let report = loop {
            if let Some(report) = handle.poll() {
                break report;
            }
            assert!(Instant::now() < deadline, "watcher never finished");
            std::thread::sleep(Duration::from_millis(1));
        };

        assert_eq!(loaded_file(&report), Some("a.obj"));
        assert!(handle.poll().is_none());
    }

    #[test]
    fn test_dropped_job_counts_as_no_data() {
        struct DroppingExecutor;
        impl JobExecutor for DroppingExecutor {
            fn spawn(&self, _label: &str, job: crate::jobs::Job) -> Result<(), JobError> {
                drop(job);
                Ok(())
            }
        }

        let watcher = DynamicSetWatcher::new(DynamicSetHeader::default(), Arc::new(ObjModelLoader::new()));
        let mut handle = watcher.spawn("drop", &DroppingExecutor).unwrap();
        assert_eq!(handle.state(), WatcherState::Idle);
        let report = handle.poll().unwrap();
        assert!(!report.found_new_data());
    }

    #[test]
    fn test_empty_mesh_still_counts_as_loaded() {
        struct EmptyLoader;
        impl ModelLoader for EmptyLoader {
            fn can_load(&self, _path: &Path) -> bool {
                true
            }
            fn load(&self, path: &Path) -> Result<ModelNode, AssetError> {
                Ok(ModelNode::mesh("empty", path, MeshData::default()))
            }
        }

        let dir = tempfile::tempdir().unwrap();
        write_steps(dir.path(), &["a.obj"]);
        let report = DynamicSetWatcher::new(header(dir.path(), &[]), Arc::new(EmptyLoader)).run();
        assert!(report.found_new_data());
    }
}
