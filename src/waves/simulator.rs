//! Height-grid wave simulator.

use glam::Vec3;

use crate::params::WaveParams;

/// Damped 2D wave equation solved with an explicit finite-difference scheme.
///
/// The grid lies on the XZ plane centred on the origin; each vertex stores
/// its height in `y`. Two solutions are kept (previous and current step);
/// one update writes the next step over the previous one and swaps them.
#[derive(Debug, Clone)]
pub struct Waves {
    rows: usize,
    cols: usize,

    spatial_step: f32,
    time_step: f32,

    /// Coefficient of h(t-1)
    k1: f32,
    /// Coefficient of h(t)
    k2: f32,
    /// Coefficient of the 4-neighbour sum of h(t)
    k3: f32,

    /// Time not yet consumed by whole simulation steps (seconds)
    accumulator: f32,

    prev_solution: Vec<Vec3>,
    curr_solution: Vec<Vec3>,
    normals: Vec<Vec3>,
}

impl Waves {
    /// Create a flat `rows x cols` wave grid.
    ///
    /// # Arguments
    /// * `spatial_step` - Distance between neighbouring vertices (meters)
    /// * `time_step` - Fixed simulation step (seconds)
    /// * `speed` - Wave propagation speed (meters per second)
    /// * `damping` - Damping ratio
    pub fn new(
        rows: usize,
        cols: usize,
        spatial_step: f32,
        time_step: f32,
        speed: f32,
        damping: f32,
    ) -> Self {
        let d = damping * time_step + 2.0;
        let e = (speed * speed) * (time_step * time_step) / (spatial_step * spatial_step);
        let k1 = (damping * time_step - 2.0) / d;
        let k2 = (4.0 - 8.0 * e) / d;
        let k3 = (2.0 * e) / d;

        let half_width = (cols - 1) as f32 * spatial_step * 0.5;
        let half_depth = (rows - 1) as f32 * spatial_step * 0.5;

        let mut solution = Vec::with_capacity(rows * cols);
        for i in 0..rows {
            let z = half_depth - i as f32 * spatial_step;
            for j in 0..cols {
                let x = -half_width + j as f32 * spatial_step;
                solution.push(Vec3::new(x, 0.0, z));
            }
        }

        Self {
            rows,
            cols,
            spatial_step,
            time_step,
            k1,
            k2,
            k3,
            accumulator: 0.0,
            prev_solution: solution.clone(),
            curr_solution: solution,
            normals: vec![Vec3::Y; rows * cols],
        }
    }

    pub fn from_params(params: &WaveParams) -> Self {
        Self::new(
            params.rows,
            params.cols,
            params.spatial_step_m,
            params.time_step_s,
            params.speed_m_per_s,
            params.damping,
        )
    }

    pub fn row_count(&self) -> usize {
        self.rows
    }

    pub fn column_count(&self) -> usize {
        self.cols
    }

    pub fn vertex_count(&self) -> usize {
        self.rows * self.cols
    }

    pub fn triangle_count(&self) -> usize {
        (self.rows - 1) * (self.cols - 1) * 2
    }

    /// Extent along X (meters)
    pub fn width(&self) -> f32 {
        self.cols as f32 * self.spatial_step
    }

    /// Extent along Z (meters)
    pub fn depth(&self) -> f32 {
        self.rows as f32 * self.spatial_step
    }

    /// Current position of vertex `i` (row-major)
    pub fn position(&self, i: usize) -> Vec3 {
        self.curr_solution[i]
    }

    /// Current unit normal of vertex `i` (row-major)
    pub fn normal(&self, i: usize) -> Vec3 {
        self.normals[i]
    }

    /// Current height at grid cell (row, col)
    pub fn height(&self, row: usize, col: usize) -> f32 {
        self.curr_solution[row * self.cols + col].y
    }

    /// All current vertex positions, row-major
    pub fn positions(&self) -> &[Vec3] {
        &self.curr_solution
    }

    /// Advance the simulation by `dt` seconds of wall time.
    ///
    /// Time accumulates until at least one fixed step is available; each
    /// whole step is then simulated, so the result does not depend on the
    /// frame rate. Returns the number of steps taken.
    pub fn update(&mut self, dt: f32) -> usize {
        self.accumulator += dt;

        let mut steps = 0;
        while self.accumulator >= self.time_step {
            self.step();
            self.accumulator -= self.time_step;
            steps += 1;
        }

        if steps > 0 {
            self.compute_normals();
        }
        steps
    }

    /// One explicit step over the interior cells; the one-cell border stays fixed.
    fn step(&mut self) {
        let n = self.cols;
        for i in 1..self.rows - 1 {
            for j in 1..n - 1 {
                let idx = i * n + j;
                let neighbours = self.curr_solution[idx + n].y
                    + self.curr_solution[idx - n].y
                    + self.curr_solution[idx + 1].y
                    + self.curr_solution[idx - 1].y;

                // Next solution overwrites the previous one in place
                self.prev_solution[idx].y = self.k1 * self.prev_solution[idx].y
                    + self.k2 * self.curr_solution[idx].y
                    + self.k3 * neighbours;
            }
        }

        std::mem::swap(&mut self.prev_solution, &mut self.curr_solution);
    }

    /// Central-difference normals for the interior cells
    fn compute_normals(&mut self) {
        let n = self.cols;
        for i in 1..self.rows - 1 {
            for j in 1..n - 1 {
                let idx = i * n + j;
                let l = self.curr_solution[idx - 1].y;
                let r = self.curr_solution[idx + 1].y;
                let t = self.curr_solution[idx - n].y;
                let b = self.curr_solution[idx + n].y;

                self.normals[idx] = Vec3::new(l - r, 2.0 * self.spatial_step, b - t).normalize();
            }
        }
    }

    /// Drop a droplet of `magnitude` meters at cell (i, j).
    ///
    /// The centre rises by `magnitude`, its four axis neighbours by half of
    /// it. The cell must be at least two cells from every edge.
    pub fn disturb(&mut self, i: usize, j: usize, magnitude: f32) {
        debug_assert!(i > 1 && i < self.rows - 2, "row {i} too close to the edge");
        debug_assert!(j > 1 && j < self.cols - 2, "column {j} too close to the edge");

        let n = self.cols;
        let half_mag = 0.5 * magnitude;

        self.curr_solution[i * n + j].y += magnitude;
        self.curr_solution[i * n + j + 1].y += half_mag;
        self.curr_solution[i * n + j - 1].y += half_mag;
        self.curr_solution[(i + 1) * n + j].y += half_mag;
        self.curr_solution[(i - 1) * n + j].y += half_mag;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    fn default_waves() -> Waves {
        Waves::from_params(&WaveParams::default())
    }

    fn heights(waves: &Waves) -> Vec<f32> {
        waves.positions().iter().map(|p| p.y).collect()
    }

    #[test]
    fn test_grid_layout() {
        let waves = default_waves();

        assert_eq!(waves.vertex_count(), 128 * 128);
        assert_eq!(waves.triangle_count(), 127 * 127 * 2);
        assert_eq!(waves.width(), 128.0);
        assert_eq!(waves.depth(), 128.0);

        // Row 0 is the +Z edge, column 0 the -X edge
        let first = waves.position(0);
        assert_relative_eq!(first.x, -63.5);
        assert_relative_eq!(first.z, 63.5);
        assert_eq!(first.y, 0.0);
        assert_eq!(waves.normal(0), Vec3::Y);
    }

    #[test]
    fn test_zero_elapsed_time_is_a_no_op() {
        let mut waves = default_waves();
        waves.disturb(40, 40, 0.5);
        let before = heights(&waves);

        assert_eq!(waves.update(0.0), 0);
        assert_eq!(heights(&waves), before);
    }

    #[test]
    fn test_flat_water_stays_flat() {
        let mut waves = default_waves();

        let mut steps = 0;
        for _ in 0..60 {
            steps += waves.update(1.0 / 60.0);
        }

        assert!((32..=34).contains(&steps), "took {steps} steps");
        assert!(heights(&waves).iter().all(|&h| h == 0.0));
    }

    #[test]
    fn test_disturb_adds_impulse() {
        let mut waves = default_waves();
        waves.disturb(10, 20, 0.4);

        assert_relative_eq!(waves.height(10, 20), 0.4);
        assert_relative_eq!(waves.height(10, 21), 0.2);
        assert_relative_eq!(waves.height(10, 19), 0.2);
        assert_relative_eq!(waves.height(11, 20), 0.2);
        assert_relative_eq!(waves.height(9, 20), 0.2);
        assert_eq!(waves.height(11, 21), 0.0);
    }

    #[test]
    fn test_disturb_near_edge_in_bounds() {
        let mut waves = default_waves();
        waves.disturb(2, 2, 0.3);
        waves.disturb(125, 125, 0.3);

        assert_relative_eq!(waves.height(2, 2), 0.3);
        assert_relative_eq!(waves.height(125, 125), 0.3);
    }

    #[test]
    fn test_accumulates_partial_steps() {
        let mut waves = default_waves();

        assert_eq!(waves.update(0.02), 0);
        assert_eq!(waves.update(0.02), 1);
        assert_eq!(waves.update(0.065), 2);
    }

    #[test]
    fn test_ripple_spreads_and_border_stays_fixed() {
        let mut waves = default_waves();
        waves.disturb(64, 64, 0.5);

        waves.update(0.03 * 10.0 + 1e-4);

        // Energy reached cells that were untouched by the droplet
        assert_ne!(waves.height(64, 68), 0.0);
        assert!(waves.normal(64 * 128 + 66) != Vec3::Y);

        for j in 0..128 {
            assert_eq!(waves.height(0, j), 0.0);
            assert_eq!(waves.height(127, j), 0.0);
        }
    }

    #[test]
    fn test_damping_decays_ripple() {
        let mut waves = default_waves();
        waves.disturb(64, 64, 0.5);

        for _ in 0..2000 {
            waves.update(0.03);
        }

        let peak = heights(&waves).iter().fold(0.0f32, |m, h| m.max(h.abs()));
        assert!(peak < 0.05, "peak {peak} did not decay");
    }
}
