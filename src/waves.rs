//! Water surface simulation: a damped finite-difference wave equation on a
//! height grid, plus the random droplets that keep it moving.

mod disturber;
mod simulator;

// Re-export public types
pub use disturber::WaveDisturber;
pub use simulator::Waves;
