//! State shared between the control thread and the render thread
//!
//! [`SharedFrameState`] is plain data. It never lives outside a
//! [`Rendezvous`](super::Rendezvous): the rendezvous owns it behind the turn
//! token, so the only way to read or write it is through an
//! [`ExclusiveAccess`](super::ExclusiveAccess) guard.

/// Mutable frame state visible to both threads
///
/// # Invariants
/// - `width` and `height` are always non-zero
/// - `shutdown_requested` is set at most once and never cleared
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SharedFrameState {
    width: u32,
    height: u32,
    shutdown_requested: bool,
}

impl SharedFrameState {
    /// Create state for a framebuffer of the given size
    ///
    /// Zero dimensions are clamped to 1 so the positive-size invariant holds
    /// from the start.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            width: width.max(1),
            height: height.max(1),
            shutdown_requested: false,
        }
    }

    /// Current framebuffer width in pixels
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Current framebuffer height in pixels
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Current framebuffer size as `(width, height)`
    pub fn size(&self) -> (u32, u32) {
        (self.width, self.height)
    }

    /// Record a new framebuffer size
    ///
    /// Returns `false` and leaves the state untouched if either dimension is
    /// zero (a minimized window reports 0x0).
    pub fn set_size(&mut self, width: u32, height: u32) -> bool {
        if width == 0 || height == 0 {
            return false;
        }
        self.width = width;
        self.height = height;
        true
    }

    /// Whether shutdown has been requested
    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }

    /// Request shutdown. Idempotent.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }
}
