//! Camera and model matrices for the spinning quad
//!
//! Pure functions of framebuffer size and time. Screen space is in pixels with
//! the origin at the top-left corner and y pointing down.

use nalgebra::{Matrix4, Vector3};

/// Near clip plane of the screen-space camera
pub const NEAR_PLANE: f32 = -1000.0;
/// Far clip plane of the screen-space camera
pub const FAR_PLANE: f32 = 1000.0;

/// Orthographic projection mapping pixel coordinates to clip space
#[allow(clippy::cast_precision_loss)]
pub fn camera_projection(width: u32, height: u32) -> Matrix4<f32> {
    Matrix4::new_orthographic(0.0, width as f32, height as f32, 0.0, NEAR_PLANE, FAR_PLANE)
}

/// Model matrix for the unit quad
///
/// Scales the unit square to `quad_size` pixels, centres it on the origin,
/// rotates it by `elapsed_secs` radians about the view axis and moves it to
/// the middle of the framebuffer.
#[allow(clippy::cast_precision_loss)]
pub fn spinner_transform(
    width: u32,
    height: u32,
    elapsed_secs: f32,
    quad_size: f32,
) -> Matrix4<f32> {
    let half = quad_size / 2.0;

    Matrix4::new_translation(&Vector3::new(width as f32 / 2.0, height as f32 / 2.0, 0.0))
        * Matrix4::from_axis_angle(&Vector3::z_axis(), elapsed_secs)
        * Matrix4::new_translation(&Vector3::new(-half, -half, 0.0))
        * Matrix4::new_nonuniform_scaling(&Vector3::new(quad_size, quad_size, 1.0))
}
