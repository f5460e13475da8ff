//! Fixed-size worker pool

use super::{Job, JobError, JobExecutor};
use crossbeam::channel::{unbounded, Receiver, Sender};
use std::thread;

/// Worker pool fed through a crossbeam channel
///
/// Dropping the manager closes the queue, lets workers finish what was
/// already queued and joins them.
pub struct JobManager {
    workers: Vec<Worker>,
    sender: Option<Sender<Job>>,
}

impl JobManager {
    /// Start `size` workers (at least one)
    pub fn new(size: usize) -> Self {
        let (sender, receiver) = unbounded();
        let size = size.max(1);

        let workers = (0..size)
            .filter_map(|id| Worker::spawn(id, receiver.clone()))
            .collect::<Vec<_>>();

        log::debug!("Job manager started with {} workers", workers.len());
        Self {
            workers,
            sender: Some(sender),
        }
    }

    /// Number of running workers
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Stop accepting work and join the workers
    pub fn shutdown(&mut self) {
        if self.sender.take().is_none() {
            return;
        }

        for worker in self.workers.drain(..) {
            if worker.thread.join().is_err() {
                log::error!("Job worker {} panicked", worker.id);
            }
        }
        log::debug!("Job manager shut down");
    }
}

impl JobExecutor for JobManager {
    fn spawn(&self, label: &str, job: Job) -> Result<(), JobError> {
        let sender = self.sender.as_ref().ok_or(JobError::ManagerShutdown)?;
        if self.workers.is_empty() {
            return Err(JobError::ManagerShutdown);
        }
        sender.send(job).map_err(|_| JobError::ManagerShutdown)?;
        log::trace!("Queued job '{}'", label);
        Ok(())
    }
}

impl Drop for JobManager {
    fn drop(&mut self) {
        self.shutdown();
    }
}

struct Worker {
    id: usize,
    thread: thread::JoinHandle<()>,
}

impl Worker {
    fn spawn(id: usize, receiver: Receiver<Job>) -> Option<Worker> {
        let spawned = thread::Builder::new()
            .name(format!("presentation-job-{id}"))
            .spawn(move || {
                while let Ok(job) = receiver.recv() {
                    job();
                }
            });

        match spawned {
            Ok(thread) => Some(Worker { id, thread }),
            Err(e) => {
                log::error!("Failed to start job worker {}: {}", id, e);
                None
            }
        }
    }
}
