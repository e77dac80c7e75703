//! Mouse-driven orbit camera around the scene origin.

use glam::{Mat4, Vec2, Vec3};
use winit::event::MouseButton;

use crate::params::CameraParams;

/// Spherical-coordinate camera looking at the origin.
///
/// Left-drag orbits (theta/phi), right-drag changes the zoom radius.
#[derive(Debug, Clone)]
pub struct OrbitCamera {
    params: CameraParams,
    theta: f32,
    phi: f32,
    zoom_radius: f32,

    last_cursor: Vec2,
    left_down: bool,
    right_down: bool,
}

impl OrbitCamera {
    pub fn new(params: &CameraParams) -> Self {
        Self {
            params: params.clone(),
            theta: params.theta_rad,
            phi: params.phi_rad.clamp(*params.phi_range_rad.start(), *params.phi_range_rad.end()),
            zoom_radius: params
                .zoom_radius_m
                .clamp(*params.zoom_range_m.start(), *params.zoom_range_m.end()),
            last_cursor: Vec2::ZERO,
            left_down: false,
            right_down: false,
        }
    }

    pub fn theta(&self) -> f32 {
        self.theta
    }

    pub fn phi(&self) -> f32 {
        self.phi
    }

    pub fn zoom_radius(&self) -> f32 {
        self.zoom_radius
    }

    /// Start a drag at cursor position (x, y) in pixels
    pub fn on_mouse_down(&mut self, button: MouseButton, x: f32, y: f32) {
        self.last_cursor = Vec2::new(x, y);
        match button {
            MouseButton::Left => self.left_down = true,
            MouseButton::Right => self.right_down = true,
            _ => {}
        }
    }

    pub fn on_mouse_up(&mut self, button: MouseButton) {
        match button {
            MouseButton::Left => self.left_down = false,
            MouseButton::Right => self.right_down = false,
            _ => {}
        }
    }

    /// Apply the drag since the last cursor position
    pub fn on_mouse_move(&mut self, x: f32, y: f32) {
        let cursor = Vec2::new(x, y);
        let delta = cursor - self.last_cursor;

        if self.left_down {
            let d = delta * self.params.orbit_degrees_per_pixel.to_radians();
            self.orbit(-d.x, -d.y);
        }

        if self.right_down {
            let d = delta * self.params.zoom_units_per_pixel;
            self.zoom(d.y - d.x);
        }

        self.last_cursor = cursor;
    }

    /// Rotate by the given angles (radians); phi stays off the poles
    pub fn orbit(&mut self, dtheta: f32, dphi: f32) {
        let range = &self.params.phi_range_rad;
        self.theta += dtheta;
        self.phi = (self.phi + dphi).clamp(*range.start(), *range.end());
    }

    pub fn zoom(&mut self, delta: f32) {
        let range = &self.params.zoom_range_m;
        self.zoom_radius = (self.zoom_radius + delta).clamp(*range.start(), *range.end());
    }

    /// Camera position in world space
    pub fn eye_position(&self) -> Vec3 {
        let r = self.params.view_radius_m;
        Vec3::new(
            r * self.phi.sin() * self.theta.cos(),
            r * self.phi.cos(),
            r * self.phi.sin() * self.theta.sin(),
        )
    }

    /// Left-handed view matrix looking at the origin, +Y up
    pub fn view_matrix(&self) -> Mat4 {
        Mat4::look_at_lh(self.eye_position(), Vec3::ZERO, Vec3::Y)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;
    use std::f32::consts::PI;

    fn camera() -> OrbitCamera {
        OrbitCamera::new(&CameraParams::default())
    }

    #[test]
    fn test_phi_clamps_to_lower_bound() {
        let mut camera = camera();
        camera.orbit(0.0, -1000.0);
        assert_relative_eq!(camera.phi(), 0.1);

        camera.orbit(0.0, 1000.0);
        assert_relative_eq!(camera.phi(), PI - 0.1);
    }

    #[test]
    fn test_zoom_clamps() {
        let mut camera = camera();
        camera.zoom(100.0);
        assert_eq!(camera.zoom_radius(), 15.0);
        camera.zoom(-100.0);
        assert_eq!(camera.zoom_radius(), 3.0);
    }

    #[test]
    fn test_initial_eye_position() {
        let camera = camera();
        let eye = camera.eye_position();

        // theta = 1.5 pi puts the camera on -Z, phi = pi/4 halfway up
        assert_relative_eq!(eye.x, 0.0, epsilon = 1e-3);
        assert_relative_eq!(eye.y, 150.0 * (PI / 4.0).cos(), epsilon = 1e-3);
        assert_relative_eq!(eye.z, -150.0 * (PI / 4.0).sin(), epsilon = 1e-3);
        assert_relative_eq!(eye.length(), 150.0, epsilon = 1e-3);
    }

    #[test]
    fn test_left_drag_orbits() {
        let mut camera = camera();
        camera.on_mouse_down(MouseButton::Left, 100.0, 100.0);
        camera.on_mouse_move(104.0, 102.0);

        assert_relative_eq!(camera.theta(), 1.5 * PI - 1.0_f32.to_radians(), epsilon = 1e-5);
        assert_relative_eq!(camera.phi(), PI / 4.0 - 0.5_f32.to_radians(), epsilon = 1e-5);

        // Released: moving no longer orbits
        camera.on_mouse_up(MouseButton::Left);
        let theta = camera.theta();
        camera.on_mouse_move(200.0, 200.0);
        assert_eq!(camera.theta(), theta);
    }

    #[test]
    fn test_right_drag_zooms() {
        let mut camera = camera();
        camera.zoom(-10.0);
        camera.on_mouse_down(MouseButton::Right, 0.0, 0.0);
        // dx = -100, dy = 100 -> zoom += -(dx - dy) * 0.005 = +1
        camera.on_mouse_move(-100.0, 100.0);

        assert_relative_eq!(camera.zoom_radius(), 6.0, epsilon = 1e-5);
        assert_relative_eq!(camera.phi(), PI / 4.0);
    }

    #[test]
    fn test_view_matrix_maps_origin_in_front() {
        let camera = camera();
        let origin = camera.view_matrix().transform_point3(Vec3::ZERO);

        // Left-handed view space looks down +Z
        assert_relative_eq!(origin.z, 150.0, epsilon = 1e-3);
    }
}
