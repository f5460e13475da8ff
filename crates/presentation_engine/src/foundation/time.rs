//! Time management utilities
//!
//! [`UpdatePolicy`] is the gate the presenter uses to throttle timeline
//! advancement and file-system polling independently of frame rate.

use std::time::{Duration, Instant};

/// Gate that fires at most once per period
///
/// A policy is rebuilt rather than mutated when its period changes, so every
/// holder owns its own counter.
#[derive(Debug, Clone)]
pub enum UpdatePolicy {
    /// Fires on every `every`-th call to [`UpdatePolicy::fire`]
    FrameCount {
        /// Period in calls (at least 1)
        every: u32,
        /// Calls seen since the last firing
        count: u32,
    },
    /// Fires when at least `period` has elapsed since the last firing
    Interval {
        /// Minimum time between firings
        period: Duration,
        /// Time of the last firing
        last: Option<Instant>,
    },
}

impl UpdatePolicy {
    /// Create a frame-count gate; a period of zero is treated as one
    pub fn every_ticks(every: u32) -> Self {
        Self::FrameCount {
            every: every.max(1),
            count: 0,
        }
    }

    /// Create a wall-clock interval gate
    ///
    /// The first call fires immediately.
    pub fn every_duration(period: Duration) -> Self {
        Self::Interval { period, last: None }
    }

    /// Advance the gate by one call and report whether it fires
    pub fn fire(&mut self) -> bool {
        match self {
            Self::FrameCount { every, count } => {
                *count += 1;
                if *count >= *every {
                    *count = 0;
                    true
                } else {
                    false
                }
            }
            Self::Interval { period, last } => {
                let now = Instant::now();
                match last {
                    Some(previous) if now.duration_since(*previous) < *period => false,
                    _ => {
                        *last = Some(now);
                        true
                    }
                }
            }
        }
    }

    /// Forget progress toward the next firing
    pub fn reset(&mut self) {
        match self {
            Self::FrameCount { count, .. } => *count = 0,
            Self::Interval { last, .. } => *last = None,
        }
    }

    /// Frame-count period, if this is a frame-count gate
    pub fn tick_period(&self) -> Option<u32> {
        match self {
            Self::FrameCount { every, .. } => Some(*every),
            Self::Interval { .. } => None,
        }
    }
}

impl Default for UpdatePolicy {
    fn default() -> Self {
        Self::every_ticks(1)
    }
}

/// Simple stopwatch for measuring elapsed time
pub struct Stopwatch {
    start_time: Option<Instant>,
    elapsed: Duration,
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

impl Stopwatch {
    /// Create a new stopped stopwatch
    pub fn new() -> Self {
        Self {
            start_time: None,
            elapsed: Duration::ZERO,
        }
    }

    /// Create a new stopwatch and start it immediately
    pub fn start_new() -> Self {
        let mut stopwatch = Self::new();
        stopwatch.start();
        stopwatch
    }

    /// Start the stopwatch
    pub fn start(&mut self) {
        self.start_time = Some(Instant::now());
    }

    /// Stop the stopwatch and accumulate elapsed time
    pub fn stop(&mut self) {
        if let Some(start) = self.start_time {
            self.elapsed += start.elapsed();
            self.start_time = None;
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        let current_elapsed = self.start_time.map_or(Duration::ZERO, |start| start.elapsed());
        self.elapsed + current_elapsed
    }

    /// Get the elapsed time in milliseconds
    pub fn elapsed_millis(&self) -> f32 {
        self.elapsed().as_secs_f32() * 1000.0
    }
}
