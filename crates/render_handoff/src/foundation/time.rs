//! Time measurement utilities

use std::time::{Duration, Instant};

/// Simple stopwatch for measuring elapsed time
#[derive(Debug, Clone, Copy)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Create a stopwatch that starts counting immediately
    pub fn start_new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Get the elapsed time
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }
}

/// Averages durations over fixed-size windows of samples
///
/// Every `window`-th call to [`record`](Self::record) yields the mean of the
/// samples recorded since the previous report and starts a new window. A
/// window of zero never reports.
#[derive(Debug, Clone)]
pub struct IntervalAverage {
    window: u32,
    accumulated: Duration,
    samples: u32,
    total_samples: u64,
}

impl IntervalAverage {
    /// Create an averager reporting every `window` samples
    pub fn new(window: u32) -> Self {
        Self {
            window,
            accumulated: Duration::ZERO,
            samples: 0,
            total_samples: 0,
        }
    }

    /// Add a sample, returning the window mean when the window fills up
    pub fn record(&mut self, sample: Duration) -> Option<Duration> {
        self.total_samples += 1;
        if self.window == 0 {
            return None;
        }

        self.accumulated += sample;
        self.samples += 1;
        if self.samples < self.window {
            return None;
        }

        let average = self.accumulated / self.samples;
        self.accumulated = Duration::ZERO;
        self.samples = 0;
        Some(average)
    }

    /// Samples recorded since creation
    pub fn total_samples(&self) -> u64 {
        self.total_samples
    }

    /// Reporting window size
    pub fn window(&self) -> u32 {
        self.window
    }
}
