//! Backend seams between the handoff core and the platform
//!
//! The threads in [`crate::threads`] only ever talk to the platform through
//! the two traits below, which keeps the synchronization logic testable with
//! scripted doubles.
//!
//! ```text
//!  ControlThread ──► ControlSurface  (glfw_window::GlfwSurface)
//!  RenderThread  ──► FrameRenderer   (gl_renderer::GlRenderer)
//! ```
//!
//! # Module Organization
//!
//! - **`glfw_window`**: window creation, event polling, context handoff
//! - **`gl_renderer`**: OpenGL renderer for the spinning quad
//! - **`shaders`**: GLSL sources and program compilation
//! - **`transform`**: camera and model matrices

pub mod gl_renderer;
pub mod glfw_window;
pub mod shaders;
pub mod transform;

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Keys the control thread can query
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Key {
    /// Escape key
    Escape,
    /// Letter Q
    Q,
}

/// Render-side collaborator: draws and presents frames
///
/// Every method is called on the render thread. `render_frame` and `present`
/// are only called while the render thread holds exclusive access.
pub trait FrameRenderer {
    /// Make the graphics context current on the calling thread
    ///
    /// Called exactly once, before the first frame.
    fn attach(&mut self) {}

    /// Draw the current state for a framebuffer of `width` x `height`
    fn render_frame(&mut self, width: u32, height: u32, elapsed: Duration);

    /// Make the drawn frame visible
    fn present(&mut self);

    /// Release graphics resources while the context is still current
    ///
    /// Called exactly once, after the last frame.
    fn detach(&mut self) {}
}

/// Control-side collaborator: the window and its input
///
/// Every method is called on the control thread.
pub trait ControlSurface {
    /// Whether the platform has asked the window to close
    fn should_close(&self) -> bool;

    /// Flag the window to close
    fn request_close(&mut self);

    /// Whether `key` is currently held down
    fn is_key_pressed(&self, key: Key) -> bool;

    /// Pump the platform event queue
    ///
    /// May synchronously invoke a resize notification zero or more times
    /// before returning. Must not be called while holding exclusive access.
    fn poll_events(&mut self);
}
