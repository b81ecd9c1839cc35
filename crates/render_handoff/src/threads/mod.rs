//! The two long-lived threads and the resize entry point
//!
//! - **`control_thread`**: window owner, input, event polling
//! - **`render_thread`**: graphics context owner, draws and presents
//! - **`resize`**: resize notifications nested inside event polling
//!
//! [`run_handoff`] wires them together on top of one [`Rendezvous`].

pub mod control_thread;
pub mod render_thread;
pub mod resize;

#[cfg(test)]
mod tests;

pub use control_thread::{ControlReport, ControlThread};
pub use render_thread::{
    log_frame_stats, FrameStats, FrameStatsHook, RenderPhase, RenderReport, RenderThread,
};
pub use resize::ResizeNotifier;

use std::sync::Arc;
use thiserror::Error;

use crate::backend::{ControlSurface, FrameRenderer};
use crate::sync::Rendezvous;

/// Failures once the threads are involved
#[derive(Error, Debug)]
pub enum ThreadError {
    /// The OS refused to start the render thread
    #[error("failed to spawn render thread: {0}")]
    Spawn(#[from] std::io::Error),

    /// The render thread unwound instead of returning
    #[error("render thread panicked")]
    RenderThreadPanicked,
}

/// Outcome of a complete handoff session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HandoffReport {
    /// Control loop summary
    pub control: ControlReport,
    /// Render loop summary
    pub render: RenderReport,
}

/// Run the control loop on the calling thread against a freshly spawned
/// render thread, then join it
///
/// Exclusive access is taken before the render thread starts, so the first
/// control iteration runs before any frame is drawn.
pub fn run_handoff<S, R>(
    rendezvous: &Arc<Rendezvous>,
    control: &mut ControlThread<S>,
    render: RenderThread<R>,
) -> Result<HandoffReport, ThreadError>
where
    S: ControlSurface,
    R: FrameRenderer + Send + 'static,
{
    let first_access = rendezvous.acquire_exclusive();
    let render_handle = render.spawn()?;
    log::debug!("Render thread spawned");

    let control_report = control.run(rendezvous, first_access);

    let render_report = render_handle
        .join()
        .map_err(|_| ThreadError::RenderThreadPanicked)?;

    Ok(HandoffReport {
        control: control_report,
        render: render_report,
    })
}
