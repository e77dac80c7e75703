//! Rendering configuration.

use std::f32::consts::PI;

/// Number of frames the CPU may record ahead of the GPU (ring depth)
pub const FRAME_RESOURCE_COUNT: usize = 3;

/// Rendering configuration
#[derive(Debug, Clone)]
pub struct RenderConfig {
    /// Window width (pixels)
    pub window_width: u32,

    /// Window height (pixels)
    pub window_height: u32,

    /// Vertical field of view (radians)
    pub fov_y_rad: f32,

    /// Near clipping plane (meters)
    pub near_plane_m: f32,

    /// Far clipping plane (meters)
    pub far_plane_m: f32,

    /// Back buffer clear colour (linear RGBA, light steel blue)
    pub clear_color: [f64; 4],
}

impl Default for RenderConfig {
    fn default() -> Self {
        Self {
            window_width: 800,
            window_height: 600,
            fov_y_rad: 0.25 * PI,
            near_plane_m: 1.0,
            far_plane_m: 1000.0,
            clear_color: [0.690_196, 0.768_627, 0.870_588, 1.0],
        }
    }
}

impl RenderConfig {
    pub fn aspect_ratio(&self) -> f32 {
        self.window_width as f32 / self.window_height.max(1) as f32
    }
}
