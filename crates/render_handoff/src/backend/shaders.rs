//! GLSL sources and program compilation
//!
//! Shaders target GLSL 3.30 core so they run on any context the configuration
//! accepts.

#![allow(unsafe_code)]

use glow::HasContext;

use super::gl_renderer::GraphicsError;

/// Vertex shader for the quad
///
/// # Uniforms
///
/// | Name        | Type   | Description                         |
/// |-------------|--------|-------------------------------------|
/// | `transform` | `mat4` | Model matrix, unit quad to pixels   |
/// | `camera`    | `mat4` | Projection, pixels to clip space    |
pub const QUAD_VERTEX_SRC: &str = r"#version 330 core

layout (location = 0) in vec3 a_position;

uniform mat4 transform;
uniform mat4 camera;

void main() {
    gl_Position = camera * transform * vec4(a_position, 1.0);
}
";

/// Fragment shader for the quad: flat fill
pub const QUAD_FRAGMENT_SRC: &str = r"#version 330 core

out vec4 frag_color;

void main() {
    frag_color = vec4(1.0, 0.5, 0.2, 1.0);
}
";

/// Compile and link a program from vertex and fragment sources
///
/// Shader objects are detached and deleted once the program links, so only
/// the program handle needs cleanup.
///
/// # Safety
///
/// Requires a valid OpenGL context current on the calling thread.
///
/// # Errors
///
/// [`GraphicsError::ShaderCompileFailed`] or
/// [`GraphicsError::ShaderLinkFailed`] with the driver's info log.
pub unsafe fn compile_program(
    gl: &glow::Context,
    vertex_src: &str,
    fragment_src: &str,
) -> Result<glow::Program, GraphicsError> {
    let vs = unsafe { compile_shader(gl, glow::VERTEX_SHADER, vertex_src) }?;
    let fs = match unsafe { compile_shader(gl, glow::FRAGMENT_SHADER, fragment_src) } {
        Ok(fs) => fs,
        Err(error) => {
            unsafe { gl.delete_shader(vs) };
            return Err(error);
        }
    };

    unsafe {
        let program = match gl.create_program() {
            Ok(program) => program,
            Err(reason) => {
                gl.delete_shader(vs);
                gl.delete_shader(fs);
                return Err(GraphicsError::ResourceCreation(reason));
            }
        };

        gl.attach_shader(program, vs);
        gl.attach_shader(program, fs);
        gl.link_program(program);

        let linked = gl.get_program_link_status(program);
        let log = if linked {
            String::new()
        } else {
            gl.get_program_info_log(program)
        };

        gl.detach_shader(program, vs);
        gl.detach_shader(program, fs);
        gl.delete_shader(vs);
        gl.delete_shader(fs);

        if !linked {
            gl.delete_program(program);
            return Err(GraphicsError::ShaderLinkFailed(log));
        }

        Ok(program)
    }
}

/// Compile a single shader stage
///
/// # Safety
///
/// Requires a valid OpenGL context current on the calling thread.
unsafe fn compile_shader(
    gl: &glow::Context,
    stage: u32,
    source: &str,
) -> Result<glow::Shader, GraphicsError> {
    unsafe {
        let shader = gl.create_shader(stage).map_err(GraphicsError::ResourceCreation)?;
        gl.shader_source(shader, source);
        gl.compile_shader(shader);

        if !gl.get_shader_compile_status(shader) {
            let log = gl.get_shader_info_log(shader);
            gl.delete_shader(shader);
            return Err(GraphicsError::ShaderCompileFailed {
                stage: stage_name(stage),
                log,
            });
        }

        Ok(shader)
    }
}

fn stage_name(stage: u32) -> &'static str {
    match stage {
        glow::VERTEX_SHADER => "vertex",
        glow::FRAGMENT_SHADER => "fragment",
        _ => "unknown",
    }
}
