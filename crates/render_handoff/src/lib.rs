//! # Render Handoff
//!
//! A windowed rendering harness whose render thread and control (event)
//! thread take strict turns owning the shared frame state.
//!
//! ## Features
//!
//! - **Rendezvous**: one turn token, a frame-completion signal and a close
//!   broadcast so no waiter is ever stranded
//! - **Resize handoff**: a resize notification does not return until a frame
//!   at the new size has been rendered
//! - **First-cycle bypass**: the control loop starts with exclusive access
//!   taken before the render thread exists
//! - **GLFW + OpenGL backend**: context set up on the control thread, then
//!   moved to the render thread
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use render_handoff::prelude::*;
//!
//! fn main() -> Result<(), HarnessError> {
//!     logging::init();
//!     let config = HarnessConfig::load_or_default()?;
//!     Harness::new(config)?.run()?;
//!     Ok(())
//! }
//! ```

pub mod backend;
pub mod config;
pub mod foundation;
pub mod sync;
pub mod threads;

mod harness;

pub use harness::{Harness, HarnessError};

/// Common imports for harness users
pub mod prelude {
    pub use crate::{
        backend::{ControlSurface, FrameRenderer, Key},
        config::{Config, ConfigError, HarnessConfig},
        foundation::logging,
        sync::{ExclusiveAccess, Handoff, Rendezvous, SharedFrameState},
        threads::{run_handoff, ControlThread, HandoffReport, RenderThread, ResizeNotifier},
        Harness, HarnessError,
    };
}
