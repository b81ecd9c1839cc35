//! Resize notifications delivered from inside event polling
//!
//! The windowing backend calls [`ResizeNotifier::notify`] on the control
//! thread, synchronously, while `poll_events()` is running. The notifier takes
//! its own turn on the rendezvous, records the new size, and does not return
//! until the render thread has produced a frame at that size.
//!
//! The control loop releases the turn token before it polls, so the nested
//! acquire here never re-enters a token the same thread already holds.

use std::sync::Arc;

use crate::foundation::time::{IntervalAverage, Stopwatch};
use crate::sync::{Handoff, Rendezvous};

/// Notifications between resize timing reports
pub const RESIZE_REPORT_INTERVAL: u32 = 20;

/// Writes framebuffer size changes into the shared frame state
#[derive(Debug)]
pub struct ResizeNotifier {
    rendezvous: Arc<Rendezvous>,
    wait_times: IntervalAverage,
}

impl ResizeNotifier {
    /// Create a notifier for the given rendezvous
    pub fn new(rendezvous: Arc<Rendezvous>) -> Self {
        Self {
            rendezvous,
            wait_times: IntervalAverage::new(RESIZE_REPORT_INTERVAL),
        }
    }

    /// Publish a new framebuffer size and wait for a frame rendered at it
    ///
    /// Returns `None` without touching the rendezvous when either dimension is
    /// zero (the window was minimized). Otherwise returns how the wait ended;
    /// [`Handoff::Closed`] means the render thread had already stopped.
    pub fn notify(&mut self, width: u32, height: u32) -> Option<Handoff> {
        if width == 0 || height == 0 {
            log::debug!("Ignoring {width}x{height} framebuffer size");
            return None;
        }

        let stopwatch = Stopwatch::start_new();

        let mut access = self.rendezvous.acquire_exclusive();
        access.set_size(width, height);
        let handoff = access.release_and_wait_for_handoff();

        log::trace!("Resize to {width}x{height} acknowledged ({handoff:?})");
        if let Some(average) = self.wait_times.record(stopwatch.elapsed()) {
            log::debug!(
                "{:.3}ms average resize handoff over {} notifications",
                average.as_secs_f64() * 1000.0,
                self.wait_times.window()
            );
        }

        Some(handoff)
    }

    /// Notifications processed so far, ignored ones excluded
    pub fn notifications(&self) -> u64 {
        self.wait_times.total_samples()
    }
}
