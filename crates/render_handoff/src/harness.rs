//! Top-level orchestration
//!
//! Everything that can fail happens here on the control thread before the
//! render thread exists: window and context creation, GL loading, shader and
//! buffer setup. Once the context has been released the two loops take over.

use std::sync::Arc;
use thiserror::Error;

use crate::backend::gl_renderer::{GlRenderer, GraphicsError};
use crate::backend::glfw_window::{GlfwSurface, WindowError};
use crate::config::{ConfigError, HarnessConfig};
use crate::foundation::time::Stopwatch;
use crate::sync::{Rendezvous, SharedFrameState};
use crate::threads::{
    log_frame_stats, run_handoff, ControlThread, HandoffReport, RenderThread, ResizeNotifier,
    ThreadError,
};

/// Any failure that ends a harness run
#[derive(Error, Debug)]
pub enum HarnessError {
    /// Window or GLFW setup failed
    #[error(transparent)]
    Window(#[from] WindowError),

    /// Context, shader or buffer setup failed
    #[error(transparent)]
    Graphics(#[from] GraphicsError),

    /// The configuration could not be loaded or is invalid
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The render thread could not start or did not finish cleanly
    #[error(transparent)]
    Thread(#[from] ThreadError),
}

/// The windowed render/control harness
pub struct Harness {
    config: HarnessConfig,
}

impl Harness {
    /// Create a harness after validating `config`
    pub fn new(config: HarnessConfig) -> Result<Self, HarnessError> {
        config.validate()?;
        Ok(Self { config })
    }

    /// Configuration in use
    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Open the window and run both threads until shutdown
    pub fn run(self) -> Result<HandoffReport, HarnessError> {
        let HarnessConfig {
            window,
            context,
            render,
            input,
        } = self.config;

        let setup_time = Stopwatch::start_new();

        let mut surface = GlfwSurface::create(&window, &context)?;
        let gl = surface.load_gl();
        let render_context = surface.render_context();
        let multisample = window.samples > 0;
        let renderer = GlRenderer::new(gl, render_context, render, multisample, context.vsync)?;

        let (width, height) = surface.framebuffer_size();
        let rendezvous = Arc::new(Rendezvous::new(SharedFrameState::new(width, height)));
        surface.install_resize_notifier(ResizeNotifier::new(Arc::clone(&rendezvous)));

        surface.release_context();
        log::info!(
            "Setup finished in {}us, framebuffer {width}x{height}",
            setup_time.elapsed().as_micros()
        );

        let mut control = ControlThread::new(surface, input.quit_keys);
        let render_loop = RenderThread::new(renderer, Arc::clone(&rendezvous))
            .with_stats_hook(render.frame_report_interval, Box::new(log_frame_stats));

        let report = run_handoff(&rendezvous, &mut control, render_loop)?;
        log::info!(
            "Harness stopped: {} control iterations, {} frames presented",
            report.control.iterations,
            report.render.frames_presented
        );

        Ok(report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_invalid_config_is_rejected_before_setup() {
        let mut config = HarnessConfig::default();
        config.window.width = 0;

        let result = Harness::new(config);
        assert!(matches!(result, Err(HarnessError::Config(ConfigError::Invalid(_)))));
    }

    #[test]
    fn test_default_config_is_accepted() {
        let harness = Harness::new(HarnessConfig::default()).unwrap();
        assert_eq!(harness.config().window.title, "Render Thread Test");
    }

    #[test]
    fn test_errors_keep_their_source_message() {
        let error = HarnessError::from(ThreadError::RenderThreadPanicked);
        assert_eq!(error.to_string(), "render thread panicked");

        let error = HarnessError::from(WindowError::CreationFailed);
        assert_eq!(error.to_string(), "Window creation failed");
    }
}
