//! OpenGL renderer for the spinning quad
//!
//! GL objects are created on the control thread while it still has the
//! context current. The renderer then moves to the render thread together
//! with a [`glfw::PRenderContext`]; [`attach`](FrameRenderer::attach) makes
//! the context current there and every later GL call happens on that thread.

#![allow(unsafe_code)]

use glfw::Context;
use glow::HasContext;
use std::time::Duration;
use thiserror::Error;

use super::shaders::{compile_program, QUAD_FRAGMENT_SRC, QUAD_VERTEX_SRC};
use super::transform::{camera_projection, spinner_transform};
use super::FrameRenderer;
use crate::config::RenderConfig;

/// Graphics setup errors
#[derive(Error, Debug)]
pub enum GraphicsError {
    /// The GL function loader produced an unusable context
    #[error("Graphics context initialization failed: {0}")]
    ContextInitFailed(String),

    /// A shader stage did not compile
    #[error("{stage} shader compilation failed: {log}")]
    ShaderCompileFailed {
        /// Shader stage name
        stage: &'static str,
        /// Driver info log
        log: String,
    },

    /// The program did not link
    #[error("Shader program link failed: {0}")]
    ShaderLinkFailed(String),

    /// A GL object could not be created
    #[error("GL object creation failed: {0}")]
    ResourceCreation(String),
}

/// Unit quad in the xy plane, one corner at the origin
const QUAD_VERTICES: [f32; 12] = [
    1.0, 0.0, 0.0, // top right
    1.0, 1.0, 0.0, // bottom right
    0.0, 1.0, 0.0, // bottom left
    0.0, 0.0, 0.0, // top left
];

const QUAD_INDICES: [u32; 6] = [0, 1, 3, 1, 2, 3];

/// Renders the spinning quad and presents through a GLFW render context
pub struct GlRenderer {
    context: glfw::PRenderContext,
    gl: glow::Context,
    program: glow::Program,
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    transform_location: Option<glow::UniformLocation>,
    camera_location: Option<glow::UniformLocation>,
    viewport: Option<(u32, u32)>,
    swap_interval: Option<i32>,
    vsync: bool,
    settings: RenderConfig,
}

// SAFETY: the glow function table is only used by whichever thread has
// `context` current. The renderer is built on the control thread, which
// releases the context before the move, and afterwards only the render thread
// touches it.
unsafe impl Send for GlRenderer {}

impl GlRenderer {
    /// Create the shader program and quad buffers
    ///
    /// The GL context behind `gl` must be current on the calling thread.
    /// `context` is the handle the render thread will make current later.
    /// `vsync` is the swap interval restored once the framebuffer size settles.
    pub fn new(
        gl: glow::Context,
        context: glfw::PRenderContext,
        settings: RenderConfig,
        multisample: bool,
        vsync: bool,
    ) -> Result<Self, GraphicsError> {
        let version = gl.version();
        if version.major < 3 {
            return Err(GraphicsError::ContextInitFailed(format!(
                "OpenGL {}.{} is too old or the loader failed",
                version.major, version.minor
            )));
        }
        log::info!(
            "OpenGL {}.{} ({})",
            version.major,
            version.minor,
            version.vendor_info
        );

        let program = unsafe { compile_program(&gl, QUAD_VERTEX_SRC, QUAD_FRAGMENT_SRC) }?;

        let (transform_location, camera_location) = unsafe {
            (
                gl.get_uniform_location(program, "transform"),
                gl.get_uniform_location(program, "camera"),
            )
        };
        if transform_location.is_none() || camera_location.is_none() {
            log::warn!("Quad shader is missing a transform or camera uniform");
        }

        let (vao, vbo, ebo) = unsafe {
            let vao = gl.create_vertex_array().map_err(GraphicsError::ResourceCreation)?;
            let vbo = gl.create_buffer().map_err(GraphicsError::ResourceCreation)?;
            let ebo = gl.create_buffer().map_err(GraphicsError::ResourceCreation)?;

            gl.bind_vertex_array(Some(vao));

            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(&QUAD_VERTICES),
                glow::STATIC_DRAW,
            );

            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(&QUAD_INDICES),
                glow::STATIC_DRAW,
            );

            #[allow(clippy::cast_possible_truncation, clippy::cast_possible_wrap)]
            let stride = (3 * std::mem::size_of::<f32>()) as i32;
            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);

            gl.bind_buffer(glow::ARRAY_BUFFER, None);
            gl.bind_vertex_array(None);

            if multisample {
                gl.enable(glow::MULTISAMPLE);
            }

            (vao, vbo, ebo)
        };

        Ok(Self {
            context,
            gl,
            program,
            vao,
            vbo,
            ebo,
            transform_location,
            camera_location,
            viewport: None,
            swap_interval: None,
            vsync,
            settings,
        })
    }

    fn apply_swap_interval(&mut self, interval: i32) {
        if self.swap_interval == Some(interval) {
            return;
        }
        log::trace!("Swap interval {interval}");
        // SAFETY: only called on the render thread with `context` current.
        unsafe { glfw::ffi::glfwSwapInterval(interval) };
        self.swap_interval = Some(interval);
    }
}

/// Swap interval for a frame
///
/// A frame at a new size skips the vertical blank so the resize handoff does
/// not stall on it; steady frames use the configured interval.
fn swap_interval_for(resized: bool, vsync: bool) -> i32 {
    i32::from(!resized && vsync)
}

impl FrameRenderer for GlRenderer {
    fn attach(&mut self) {
        self.context.make_current();
    }

    #[allow(clippy::cast_possible_wrap)]
    fn render_frame(&mut self, width: u32, height: u32, elapsed: Duration) {
        let resized = self.viewport != Some((width, height));
        self.apply_swap_interval(swap_interval_for(resized, self.vsync));

        let gl = &self.gl;
        let elapsed_secs = elapsed.as_secs_f32();
        let model = spinner_transform(width, height, elapsed_secs, self.settings.quad_size);
        let camera = camera_projection(width, height);
        let [r, g, b, a] = self.settings.clear_color;

        unsafe {
            if resized {
                log::trace!("Viewport {width}x{height}");
                gl.viewport(0, 0, width as i32, height as i32);
                self.viewport = Some((width, height));
            }

            gl.clear_color(r, g, b, a);
            gl.clear(glow::COLOR_BUFFER_BIT);

            gl.use_program(Some(self.program));
            gl.uniform_matrix_4_f32_slice(
                self.transform_location.as_ref(),
                false,
                model.as_slice(),
            );
            gl.uniform_matrix_4_f32_slice(
                self.camera_location.as_ref(),
                false,
                camera.as_slice(),
            );

            gl.bind_vertex_array(Some(self.vao));
            #[allow(clippy::cast_possible_truncation)]
            gl.draw_elements(glow::TRIANGLES, QUAD_INDICES.len() as i32, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
    }

    fn present(&mut self) {
        self.context.swap_buffers();
    }

    fn detach(&mut self) {
        let gl = &self.gl;
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
            gl.delete_program(self.program);
        }
        glfw::make_context_current(None);
        log::debug!("GL resources released");
    }
}
