//! Constant records written into the frame buffers every frame.

use bytemuck::{Pod, Zeroable};
use glam::{Mat4, Vec2, Vec3};

/// Matrix in the layout `shader.wgsl` reads.
///
/// glam stores columns contiguously, which is the transpose of the
/// row-vector convention the scene math was written in; no explicit
/// transpose is needed.
pub fn gpu_matrix(m: Mat4) -> [[f32; 4]; 4] {
    m.to_cols_array_2d()
}

/// Per-object constants (`@group(0)` in the shader)
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct ObjectConstants {
    pub world: [[f32; 4]; 4],
}

impl ObjectConstants {
    pub fn new(world: Mat4) -> Self {
        Self {
            world: gpu_matrix(world),
        }
    }
}

impl Default for ObjectConstants {
    fn default() -> Self {
        Self::new(Mat4::IDENTITY)
    }
}

/// Per-pass constants (`@group(1)` in the shader): camera, viewport, timing
#[repr(C)]
#[derive(Copy, Clone, Debug, PartialEq, Pod, Zeroable)]
pub struct PassConstants {
    pub view: [[f32; 4]; 4],
    pub inv_view: [[f32; 4]; 4],
    pub proj: [[f32; 4]; 4],
    pub inv_proj: [[f32; 4]; 4],
    pub view_proj: [[f32; 4]; 4],
    pub inv_view_proj: [[f32; 4]; 4],
    pub eye_pos_w: [f32; 3],
    pub _padding: f32, // vec3 occupies 16 bytes in WGSL
    pub render_target_size: [f32; 2],
    pub inv_render_target_size: [f32; 2],
    pub near_z: f32,
    pub far_z: f32,
    pub total_time: f32,
    pub delta_time: f32,
}

impl PassConstants {
    /// Build the pass record from the camera and projection of this frame.
    ///
    /// # Arguments
    /// * `view` - World-to-view matrix
    /// * `proj` - View-to-clip matrix
    /// * `eye` - Camera position in world space
    /// * `viewport` - Render target size in pixels
    /// * `near_far` - Clip plane distances the projection was built with
    /// * `total_time`, `delta_time` - Timer values in seconds
    pub fn new(
        view: Mat4,
        proj: Mat4,
        eye: Vec3,
        viewport: (u32, u32),
        near_far: (f32, f32),
        total_time: f32,
        delta_time: f32,
    ) -> Self {
        let view_proj = proj * view;
        let size = Vec2::new(viewport.0 as f32, viewport.1 as f32);

        Self {
            view: gpu_matrix(view),
            inv_view: gpu_matrix(view.inverse()),
            proj: gpu_matrix(proj),
            inv_proj: gpu_matrix(proj.inverse()),
            view_proj: gpu_matrix(view_proj),
            inv_view_proj: gpu_matrix(view_proj.inverse()),
            eye_pos_w: eye.to_array(),
            _padding: 0.0,
            render_target_size: size.to_array(),
            inv_render_target_size: size.recip().to_array(),
            near_z: near_far.0,
            far_z: near_far.1,
            total_time,
            delta_time,
        }
    }
}

impl Default for PassConstants {
    fn default() -> Self {
        Self::new(
            Mat4::IDENTITY,
            Mat4::IDENTITY,
            Vec3::ZERO,
            (1, 1),
            (1.0, 1000.0),
            0.0,
            0.0,
        )
    }
}
