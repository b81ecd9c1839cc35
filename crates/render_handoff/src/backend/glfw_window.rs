//! Window management using GLFW
//!
//! Creates the window with an OpenGL context, pumps its events on the control
//! thread and hands the context over to the render thread.

#![allow(unsafe_code)]

use glfw::Context;
use thiserror::Error;

use super::{ControlSurface, Key};
use crate::config::{ContextConfig, WindowConfig};
use crate::threads::ResizeNotifier;

/// Window management errors
#[derive(Error, Debug)]
pub enum WindowError {
    /// The GLFW library could not start
    #[error("GLFW initialization failed: {0}")]
    InitializationFailed(String),

    /// No window or context matching the hints could be created
    #[error("Window creation failed")]
    CreationFailed,
}

/// Result type for window operations
pub type WindowResult<T> = Result<T, WindowError>;

/// GLFW window and its OpenGL context
///
/// The window is declared before `glfw` so it is destroyed first.
pub struct GlfwSurface {
    window: glfw::PWindow,
    events: glfw::GlfwReceiver<(f64, glfw::WindowEvent)>,
    glfw: glfw::Glfw,
}

impl GlfwSurface {
    /// Create the window and make its context current on this thread
    pub fn create(window: &WindowConfig, context: &ContextConfig) -> WindowResult<Self> {
        let mut glfw = glfw::init(glfw::log_errors)
            .map_err(|error| WindowError::InitializationFailed(format!("{error:?}")))?;

        glfw.window_hint(glfw::WindowHint::ContextVersion(context.gl_major, context.gl_minor));
        glfw.window_hint(glfw::WindowHint::OpenGlProfile(glfw::OpenGlProfileHint::Core));
        #[cfg(target_os = "macos")]
        glfw.window_hint(glfw::WindowHint::OpenGlForwardCompat(true));
        glfw.window_hint(glfw::WindowHint::Samples((window.samples > 0).then_some(window.samples)));
        glfw.window_hint(glfw::WindowHint::Resizable(window.resizable));

        let (mut handle, events) = glfw
            .create_window(window.width, window.height, &window.title, glfw::WindowMode::Windowed)
            .ok_or(WindowError::CreationFailed)?;

        handle.set_key_polling(true);
        handle.set_close_polling(true);
        handle.make_current();

        glfw.set_swap_interval(if context.vsync {
            glfw::SwapInterval::Sync(1)
        } else {
            glfw::SwapInterval::None
        });

        log::info!(
            "Created {}x{} window \"{}\" (GL {}.{} core, {}x MSAA)",
            window.width,
            window.height,
            window.title,
            context.gl_major,
            context.gl_minor,
            window.samples
        );

        Ok(Self {
            window: handle,
            events,
            glfw,
        })
    }

    /// Current framebuffer size in pixels
    #[allow(clippy::cast_sign_loss)]
    pub fn framebuffer_size(&self) -> (u32, u32) {
        let (width, height) = self.window.get_framebuffer_size();
        (width.max(0) as u32, height.max(0) as u32)
    }

    /// Load OpenGL function pointers for the current context
    pub fn load_gl(&mut self) -> glow::Context {
        let window = &mut self.window;
        // SAFETY: this window's context is current on the calling thread.
        unsafe {
            glow::Context::from_loader_function(|name| window.get_proc_address(name) as *const _)
        }
    }

    /// Route framebuffer size changes to `notifier`
    ///
    /// GLFW invokes the callback from inside [`poll_events`](ControlSurface::poll_events).
    #[allow(clippy::cast_sign_loss)]
    pub fn install_resize_notifier(&mut self, mut notifier: ResizeNotifier) {
        self.window
            .set_framebuffer_size_callback(move |_window, width: i32, height: i32| {
                notifier.notify(width.max(0) as u32, height.max(0) as u32);
            });
    }

    /// Handle to this window's context that can move to another thread
    pub fn render_context(&mut self) -> glfw::PRenderContext {
        self.window.render_context()
    }

    /// Detach the context from this thread so the render thread can take it
    pub fn release_context(&mut self) {
        glfw::make_context_current(None);
        log::debug!("GL context released by control thread");
    }
}

fn glfw_key(key: Key) -> glfw::Key {
    match key {
        Key::Escape => glfw::Key::Escape,
        Key::Q => glfw::Key::Q,
    }
}

impl ControlSurface for GlfwSurface {
    fn should_close(&self) -> bool {
        self.window.should_close()
    }

    fn request_close(&mut self) {
        self.window.set_should_close(true);
    }

    fn is_key_pressed(&self, key: Key) -> bool {
        self.window.get_key(glfw_key(key)) == glfw::Action::Press
    }

    fn poll_events(&mut self) {
        self.glfw.poll_events();
        for (_, event) in glfw::flush_messages(&self.events) {
            match event {
                glfw::WindowEvent::Close => log::debug!("Window close requested"),
                glfw::WindowEvent::Key(key, _, glfw::Action::Press, _) => {
                    log::trace!("Key pressed: {key:?}");
                }
                _ => {}
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_mapping() {
        assert_eq!(glfw_key(Key::Escape), glfw::Key::Escape);
        assert_eq!(glfw_key(Key::Q), glfw::Key::Q);
    }
}
