//! wavebox library - frame-paced rendering of a box, hills and simulated waves

pub mod camera;
pub mod cli;
pub mod error;
pub mod frame;
pub mod geometry;
pub mod gpu;
pub mod orchestrator;
pub mod params;
pub mod rendering;
pub mod scene;
pub mod timer;
pub mod waves;
