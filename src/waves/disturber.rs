//! Periodic random droplets that keep the water surface moving.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use std::ops::Range;

use super::Waves;
use crate::params::DisturbanceParams;

/// Drops one random droplet per interval of total time.
///
/// Seeded, so the same seed and the same sequence of `tick` times produce
/// the same droplets.
#[derive(Debug, Clone)]
pub struct WaveDisturber {
    rng: StdRng,
    interval_s: f32,
    magnitude_m: Range<f32>,
    edge_margin: usize,
    /// Total time at which the last droplet was due
    t_base: f32,
}

impl WaveDisturber {
    pub fn new(params: &DisturbanceParams) -> Self {
        Self {
            rng: StdRng::seed_from_u64(params.seed),
            interval_s: params.interval_s,
            magnitude_m: params.magnitude_m.clone(),
            edge_margin: params.edge_margin,
            t_base: 0.0,
        }
    }

    /// Disturb `waves` if an interval has elapsed since the last droplet.
    ///
    /// Returns the droplet `(row, col, magnitude)` when one was dropped.
    pub fn tick(&mut self, total_time_s: f32, waves: &mut Waves) -> Option<(usize, usize, f32)> {
        if total_time_s - self.t_base < self.interval_s {
            return None;
        }
        self.t_base += self.interval_s;

        let margin = self.edge_margin;
        let i = self.rng.gen_range(margin..=waves.row_count() - margin - 1);
        let j = self.rng.gen_range(margin..=waves.column_count() - margin - 1);
        let magnitude = self.rng.gen_range(self.magnitude_m.clone());

        log::trace!("Droplet at ({i}, {j}) magnitude {magnitude:.3}");
        waves.disturb(i, j, magnitude);
        Some((i, j, magnitude))
    }
}
