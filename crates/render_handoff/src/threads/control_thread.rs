//! The control thread loop
//!
//! Owns the window. Each iteration takes the turn token, turns window-close
//! requests and quit keys into `shutdown_requested`, gives the token back, waits
//! for the render thread to finish a frame and then pumps the event queue.
//! Resize callbacks fired by the event pump run their own handoff through
//! [`ResizeNotifier`](super::ResizeNotifier).
//!
//! The very first iteration reuses the exclusive access taken before the
//! render thread was spawned, since no frame exists yet to wait for.

use crate::backend::{ControlSurface, Key};
use crate::sync::{ExclusiveAccess, Handoff, Rendezvous};

/// What the control loop did before it stopped
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ControlReport {
    /// Loop iterations completed
    pub iterations: u64,
    /// Whether the render thread stopped although nobody requested shutdown
    pub render_stopped_early: bool,
}

/// Control loop bound to a window surface
pub struct ControlThread<S> {
    surface: S,
    quit_keys: Vec<Key>,
}

impl<S: ControlSurface> ControlThread<S> {
    /// Create a control loop that requests shutdown when any of `quit_keys`
    /// is pressed
    pub fn new(surface: S, quit_keys: Vec<Key>) -> Self {
        Self { surface, quit_keys }
    }

    /// Access the window surface
    pub fn surface(&self) -> &S {
        &self.surface
    }

    /// Run until shutdown has been handed to the render thread
    ///
    /// `first_access` is the exclusive access the caller took before spawning
    /// the render thread; the first iteration uses it instead of acquiring.
    pub fn run<'r>(
        &mut self,
        rendezvous: &'r Rendezvous,
        first_access: ExclusiveAccess<'r>,
    ) -> ControlReport {
        let mut first_cycle = Some(first_access);
        let mut iterations = 0u64;

        loop {
            let mut access = match first_cycle.take() {
                Some(access) => access,
                None => rendezvous.acquire_exclusive(),
            };

            if self.surface.should_close() {
                access.request_shutdown();
            }
            self.process_input(&mut access);
            let stopping = access.shutdown_requested();

            let handoff = access.release_and_wait_for_handoff();
            self.surface.poll_events();
            iterations += 1;

            if stopping {
                log::info!("Shutdown handed to render thread after {iterations} iterations");
                return ControlReport {
                    iterations,
                    render_stopped_early: false,
                };
            }

            if handoff == Handoff::Closed {
                // Someone other than this loop may have requested shutdown.
                let requested = rendezvous.acquire_exclusive().shutdown_requested();
                if !requested {
                    log::warn!("Render thread stopped without a shutdown request");
                }
                return ControlReport {
                    iterations,
                    render_stopped_early: !requested,
                };
            }
        }
    }

    fn process_input(&mut self, access: &mut ExclusiveAccess<'_>) {
        let quit_pressed = self
            .quit_keys
            .iter()
            .any(|&key| self.surface.is_key_pressed(key));

        if quit_pressed && !access.shutdown_requested() {
            log::info!("Quit key pressed, requesting shutdown");
            access.request_shutdown();
            self.surface.request_close();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sync::SharedFrameState;
    use std::collections::HashSet;

    #[derive(Default)]
    struct StaticSurface {
        close_requested: bool,
        pressed: HashSet<Key>,
        polls: u32,
    }

    impl ControlSurface for StaticSurface {
        fn should_close(&self) -> bool {
            self.close_requested
        }

        fn request_close(&mut self) {
            self.close_requested = true;
        }

        fn is_key_pressed(&self, key: Key) -> bool {
            self.pressed.contains(&key)
        }

        fn poll_events(&mut self) {
            self.polls += 1;
        }
    }

    #[test]
    fn test_quit_key_requests_shutdown_and_close() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        // No render thread: close up front so the wait returns at once.
        rendezvous.acquire_exclusive().release_and_close();

        let surface = StaticSurface {
            pressed: [Key::Q].into_iter().collect(),
            ..StaticSurface::default()
        };
        let mut control = ControlThread::new(surface, vec![Key::Escape, Key::Q]);
        let report = control.run(&rendezvous, rendezvous.acquire_exclusive());

        assert_eq!(report.iterations, 1);
        assert!(!report.render_stopped_early);
        assert!(control.surface().close_requested);
        assert_eq!(control.surface().polls, 1);
        assert!(rendezvous.acquire_exclusive().shutdown_requested());
    }

    #[test]
    fn test_unbound_key_is_ignored() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        rendezvous.acquire_exclusive().release_and_close();

        let surface = StaticSurface {
            pressed: [Key::Q].into_iter().collect(),
            ..StaticSurface::default()
        };
        let mut control = ControlThread::new(surface, vec![Key::Escape]);
        let report = control.run(&rendezvous, rendezvous.acquire_exclusive());

        assert!(report.render_stopped_early);
        assert!(!control.surface().close_requested);
        assert!(!rendezvous.acquire_exclusive().shutdown_requested());
    }

    #[test]
    fn test_window_close_requests_shutdown() {
        let rendezvous = Rendezvous::new(SharedFrameState::new(800, 600));
        rendezvous.acquire_exclusive().release_and_close();

        let surface = StaticSurface {
            close_requested: true,
            ..StaticSurface::default()
        };
        let mut control = ControlThread::new(surface, vec![Key::Escape]);
        let report = control.run(&rendezvous, rendezvous.acquire_exclusive());

        assert!(!report.render_stopped_early);
        assert!(rendezvous.acquire_exclusive().shutdown_requested());
    }
}
