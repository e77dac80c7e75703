//! Parameter definitions with physical units and documented semantics.
//!
//! Every tunable of the demo lives here with:
//! - Physical units (meters, seconds, radians, pixels)
//! - The value the scene was tuned with
//! - A `Default` impl so the binary needs no config file

mod camera;
mod render;
mod wave;

// Re-export all types
pub use camera::CameraParams;
pub use render::{RenderConfig, FRAME_RESOURCE_COUNT};
pub use wave::{DisturbanceParams, LandParams, WaveParams};

/// Everything the application needs to build the scene and the frame loop.
#[derive(Debug, Clone, Default)]
pub struct DemoConfig {
    pub waves: WaveParams,
    pub disturbance: DisturbanceParams,
    pub land: LandParams,
    pub camera: CameraParams,
    pub render: RenderConfig,
}
