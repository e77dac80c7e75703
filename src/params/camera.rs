//! Orbit camera configuration.

use std::f32::consts::PI;
use std::ops::RangeInclusive;

/// Mouse-driven orbit camera parameters
#[derive(Debug, Clone)]
pub struct CameraParams {
    /// Initial azimuth (radians)
    pub theta_rad: f32,

    /// Initial polar angle from +Y (radians)
    pub phi_rad: f32,

    /// Allowed polar angle; keeps the camera off the poles
    pub phi_range_rad: RangeInclusive<f32>,

    /// Distance from the origin the view is built from (meters)
    /// High enough to frame the whole 160m terrain
    pub view_radius_m: f32,

    /// Initial zoom radius (meters)
    pub zoom_radius_m: f32,

    /// Allowed zoom radius (meters)
    pub zoom_range_m: RangeInclusive<f32>,

    /// Orbit sensitivity (degrees per pixel of left-drag)
    pub orbit_degrees_per_pixel: f32,

    /// Zoom sensitivity (meters per pixel of right-drag)
    pub zoom_units_per_pixel: f32,
}

impl Default for CameraParams {
    fn default() -> Self {
        Self {
            theta_rad: 1.5 * PI,
            phi_rad: PI / 4.0,
            phi_range_rad: 0.1..=PI - 0.1,
            view_radius_m: 150.0,
            zoom_radius_m: 15.0,
            zoom_range_m: 3.0..=15.0,
            orbit_degrees_per_pixel: 0.25,
            zoom_units_per_pixel: 0.005,
        }
    }
}
