//! Background work
//!
//! Dynamic-set polling runs off the tick thread. A [`JobExecutor`] runs
//! boxed closures; [`DynamicSetWatcher`] is the only job the presenter
//! submits, and its result comes back once through a [`WatcherHandle`].

mod manager;
mod watcher;

pub use manager::JobManager;
pub use watcher::{DynamicSetWatcher, WatcherHandle, WatcherOutcome, WatcherReport, WatcherState};

use thiserror::Error;

/// A unit of background work
pub type Job = Box<dyn FnOnce() + Send + 'static>;

/// Something that runs jobs, usually on other threads
pub trait JobExecutor: Send + Sync {
    /// Queue a job; `label` is only used for logging
    fn spawn(&self, label: &str, job: Job) -> Result<(), JobError>;
}

/// Job submission errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JobError {
    /// The executor no longer accepts work
    #[error("Job manager has shut down")]
    ManagerShutdown,
}
