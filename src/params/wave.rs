//! Wave simulation, disturbance and terrain parameters.

use std::ops::Range;

/// Finite-difference wave simulation parameters
#[derive(Debug, Clone)]
pub struct WaveParams {
    /// Grid rows (vertices along Z)
    pub rows: usize,

    /// Grid columns (vertices along X)
    pub cols: usize,

    /// Distance between neighbouring grid vertices (meters)
    pub spatial_step_m: f32,

    /// Fixed simulation time step (seconds)
    /// Must satisfy the CFL bound for `speed_m_per_s` and `spatial_step_m`
    pub time_step_s: f32,

    /// Wave propagation speed (meters per second)
    pub speed_m_per_s: f32,

    /// Damping ratio (dimensionless, 0 = no energy loss)
    pub damping: f32,
}

impl Default for WaveParams {
    fn default() -> Self {
        Self {
            rows: 128,
            cols: 128,
            spatial_step_m: 1.0,
            time_step_s: 0.03,
            speed_m_per_s: 4.0,
            damping: 0.2,
        }
    }
}

/// Random droplet ("disturbance") schedule
#[derive(Debug, Clone)]
pub struct DisturbanceParams {
    /// Seconds of total time between two droplets
    pub interval_s: f32,

    /// Droplet magnitude range (meters of added height at the centre cell)
    pub magnitude_m: Range<f32>,

    /// Minimum distance (cells) between a droplet and any grid edge
    pub edge_margin: usize,

    /// RNG seed; the same seed replays the same droplets
    pub seed: u64,
}

impl Default for DisturbanceParams {
    fn default() -> Self {
        Self {
            interval_s: 0.25,
            magnitude_m: 0.2..0.5,
            edge_margin: 4,
            seed: 0x5eed,
        }
    }
}

/// Procedural hills mesh
#[derive(Debug, Clone)]
pub struct LandParams {
    /// Extent along X (meters)
    pub width_m: f32,

    /// Extent along Z (meters)
    pub depth_m: f32,

    /// Vertex rows
    pub rows: usize,

    /// Vertex columns
    pub cols: usize,
}

impl Default for LandParams {
    fn default() -> Self {
        Self {
            width_m: 160.0,
            depth_m: 160.0,
            rows: 50,
            cols: 50,
        }
    }
}
