//! Command-line argument parsing.

use clap::Parser;

use crate::params::DemoConfig;

/// Command line arguments
#[derive(Parser, Debug)]
#[command(name = "wavebox")]
#[command(about = "Box, hills and simulated waves drawn through a frame resource ring", long_about = None)]
pub struct Args {
    /// Window width in pixels
    #[arg(long, value_name = "PIXELS")]
    pub width: Option<u32>,

    /// Window height in pixels
    #[arg(long, value_name = "PIXELS")]
    pub height: Option<u32>,

    /// Seed of the wave disturbance generator
    #[arg(long, value_name = "SEED", default_value_t = 0x5eed)]
    pub seed: u64,

    /// Quit after this many frames
    #[arg(long, value_name = "FRAMES")]
    pub max_frames: Option<u64>,
}

impl Args {
    /// Override the compiled-in defaults with the given arguments
    pub fn apply(&self, config: &mut DemoConfig) {
        if let Some(width) = self.width {
            config.render.window_width = width;
        }
        if let Some(height) = self.height {
            config.render.window_height = height;
        }
        config.disturbance.seed = self.seed;
    }

    pub fn to_config(&self) -> DemoConfig {
        let mut config = DemoConfig::default();
        self.apply(&mut config);
        config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let args = Args::parse_from(["wavebox"]);
        let config = args.to_config();

        assert_eq!(args.max_frames, None);
        assert_eq!(config.disturbance.seed, 0x5eed);
        assert_eq!(config.render.window_width, 800);
        assert_eq!(config.render.window_height, 600);
    }

    #[test]
    fn test_overrides() {
        let args = Args::parse_from([
            "wavebox",
            "--width",
            "1280",
            "--height",
            "720",
            "--seed",
            "7",
            "--max-frames",
            "100",
        ]);
        let config = args.to_config();

        assert_eq!(args.max_frames, Some(100));
        assert_eq!(config.disturbance.seed, 7);
        assert_eq!(config.render.window_width, 1280);
        assert_eq!(config.render.window_height, 720);
    }
}
