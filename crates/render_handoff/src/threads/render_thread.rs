//! The render thread loop
//!
//! Each iteration takes the turn token, draws and presents one frame at the
//! size currently in [`SharedFrameState`](crate::sync::SharedFrameState), then
//! releases the token and wakes whoever is waiting for the frame.
//!
//! ```text
//!  Idle ──► Rendering ──► Presented ──► Idle ──► ...
//!    │
//!    └──► Stopped   (shutdown_requested observed)
//! ```

use std::io;
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::Duration;

use crate::backend::FrameRenderer;
use crate::foundation::time::{IntervalAverage, Stopwatch};
use crate::sync::Rendezvous;

/// Name given to the spawned render thread
pub const RENDER_THREAD_NAME: &str = "render";

/// Where the render loop currently is
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RenderPhase {
    /// Between frames, not holding exclusive access
    Idle,
    /// Drawing, exclusive access held
    Rendering,
    /// Frame presented, exclusive access still held
    Presented,
    /// Shutdown observed, loop exited
    Stopped,
}

impl RenderPhase {
    fn can_advance_to(self, next: Self) -> bool {
        matches!(
            (self, next),
            (Self::Idle, Self::Rendering | Self::Stopped)
                | (Self::Rendering, Self::Presented)
                | (Self::Presented, Self::Idle)
        )
    }
}

/// Rolling frame timing handed to the observability hook
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FrameStats {
    /// Frames presented since the render thread started
    pub frames: u64,
    /// Number of frames the average covers
    pub window: u32,
    /// Mean wall time per frame over the window, lock wait included
    pub average_frame_time: Duration,
}

/// Callback receiving [`FrameStats`] on the render thread
pub type FrameStatsHook = Box<dyn FnMut(&FrameStats) + Send>;

/// Default hook: log the average frame time
pub fn log_frame_stats(stats: &FrameStats) {
    log::info!(
        "{:.3}ms average frame time ({} frames)",
        stats.average_frame_time.as_secs_f64() * 1000.0,
        stats.frames
    );
}

/// What the render thread did before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RenderReport {
    /// Frames presented
    pub frames_presented: u64,
}

/// Render loop bound to a renderer and a rendezvous
pub struct RenderThread<R> {
    renderer: R,
    rendezvous: Arc<Rendezvous>,
    phase: RenderPhase,
    frame_times: IntervalAverage,
    stats_hook: Option<FrameStatsHook>,
}

impl<R: FrameRenderer> RenderThread<R> {
    /// Create a render loop without frame reporting
    pub fn new(renderer: R, rendezvous: Arc<Rendezvous>) -> Self {
        Self {
            renderer,
            rendezvous,
            phase: RenderPhase::Idle,
            frame_times: IntervalAverage::new(0),
            stats_hook: None,
        }
    }

    /// Report frame timing to `hook` every `interval` frames
    ///
    /// An interval of zero disables reporting.
    #[must_use]
    pub fn with_stats_hook(mut self, interval: u32, hook: FrameStatsHook) -> Self {
        self.frame_times = IntervalAverage::new(interval);
        self.stats_hook = (interval > 0).then_some(hook);
        self
    }

    /// Run the loop on a new thread named `render`
    pub fn spawn(self) -> io::Result<JoinHandle<RenderReport>>
    where
        R: Send + 'static,
    {
        thread::Builder::new()
            .name(RENDER_THREAD_NAME.to_string())
            .spawn(move || self.run())
    }

    /// Run the loop on the calling thread until shutdown is observed
    pub fn run(mut self) -> RenderReport {
        let rendezvous = Arc::clone(&self.rendezvous);
        let _close_on_exit = CloseOnExit(&rendezvous);

        self.renderer.attach();
        log::debug!("Render thread attached to graphics context");

        let started = Stopwatch::start_new();
        let mut frames_presented = 0u64;

        loop {
            let frame_timer = Stopwatch::start_new();
            let access = rendezvous.acquire_exclusive();

            if access.shutdown_requested() {
                self.advance(RenderPhase::Stopped);
                access.release_and_close();
                break;
            }

            self.advance(RenderPhase::Rendering);
            let (width, height) = access.size();
            self.renderer.render_frame(width, height, started.elapsed());
            self.renderer.present();
            self.advance(RenderPhase::Presented);

            access.release_and_signal();
            self.advance(RenderPhase::Idle);
            frames_presented += 1;

            if let Some(average_frame_time) = self.frame_times.record(frame_timer.elapsed()) {
                if let Some(hook) = self.stats_hook.as_mut() {
                    hook(&FrameStats {
                        frames: frames_presented,
                        window: self.frame_times.window(),
                        average_frame_time,
                    });
                }
            }
        }

        self.renderer.detach();
        log::info!("Render thread stopped after {frames_presented} frames");

        RenderReport { frames_presented }
    }

    fn advance(&mut self, next: RenderPhase) {
        debug_assert!(
            self.phase.can_advance_to(next),
            "illegal render phase transition {:?} -> {:?}",
            self.phase,
            next
        );
        log::trace!("Render phase {:?} -> {:?}", self.phase, next);
        self.phase = next;
    }
}

/// Releases waiters if the render loop exits, including by unwinding
struct CloseOnExit<'a>(&'a Rendezvous);

impl Drop for CloseOnExit<'_> {
    fn drop(&mut self) {
        self.0.close();
    }
}
