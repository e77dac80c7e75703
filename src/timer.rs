//! Frame timing and the once-per-second FPS readout.

use std::time::{Duration, Instant};

/// Wall-clock timer advanced once per frame
#[derive(Debug, Clone)]
pub struct FrameTimer {
    start: Instant,
    last: Instant,
    total_s: f32,
    delta_s: f32,
}

impl FrameTimer {
    pub fn new() -> Self {
        let now = Instant::now();
        Self {
            start: now,
            last: now,
            total_s: 0.0,
            delta_s: 0.0,
        }
    }

    /// Advance to now
    pub fn tick(&mut self) {
        self.tick_at(Instant::now());
    }

    fn tick_at(&mut self, now: Instant) {
        self.delta_s = now.saturating_duration_since(self.last).as_secs_f32();
        self.total_s = now.saturating_duration_since(self.start).as_secs_f32();
        self.last = now;
    }

    /// Seconds since the timer was created
    pub fn total_time(&self) -> f32 {
        self.total_s
    }

    /// Seconds between the last two ticks
    pub fn delta_time(&self) -> f32 {
        self.delta_s
    }
}

impl Default for FrameTimer {
    fn default() -> Self {
        Self::new()
    }
}

/// Frames per second and milliseconds per frame, averaged over one second
#[derive(Debug, Clone, Default)]
pub struct FrameStats {
    frame_count: u32,
    window_start_s: f32,
    fps: f32,
    mspf: f32,
}

impl FrameStats {
    /// Count one frame. Returns true when a new one-second average is ready.
    pub fn frame(&mut self, total_time_s: f32) -> bool {
        self.frame_count += 1;

        let elapsed = total_time_s - self.window_start_s;
        if elapsed < 1.0 {
            return false;
        }

        self.fps = self.frame_count as f32 / elapsed;
        self.mspf = 1000.0 / self.fps;
        self.frame_count = 0;
        self.window_start_s = total_time_s;
        true
    }

    pub fn fps(&self) -> f32 {
        self.fps
    }

    pub fn mspf(&self) -> f32 {
        self.mspf
    }

    pub fn title(&self, app_name: &str) -> String {
        format!("{app_name}    fps: {:.0}   mspf: {:.3}", self.fps, self.mspf)
    }
}

/// Duration helper used by `--max-frames` logging
pub fn average_frame_time(total: Duration, frames: u64) -> Duration {
    if frames == 0 {
        Duration::ZERO
    } else {
        total.div_f64(frames as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_tick_tracks_total_and_delta() {
        let mut timer = FrameTimer::new();
        let start = timer.start;

        timer.tick_at(start + Duration::from_millis(16));
        assert_relative_eq!(timer.delta_time(), 0.016, epsilon = 1e-6);

        timer.tick_at(start + Duration::from_millis(50));
        assert_relative_eq!(timer.delta_time(), 0.034, epsilon = 1e-6);
        assert_relative_eq!(timer.total_time(), 0.05, epsilon = 1e-6);
    }

    #[test]
    fn test_stats_average_over_one_second() {
        let mut stats = FrameStats::default();

        for frame in 1..60 {
            assert!(!stats.frame(frame as f32 / 60.0));
        }
        assert!(stats.frame(1.0));
        assert_relative_eq!(stats.fps(), 60.0, epsilon = 1e-3);
        assert_relative_eq!(stats.mspf(), 1000.0 / 60.0, epsilon = 1e-3);

        // Next window starts fresh
        assert!(!stats.frame(1.5));
    }

    #[test]
    fn test_average_frame_time() {
        assert_eq!(average_frame_time(Duration::from_secs(1), 0), Duration::ZERO);
        assert_eq!(
            average_frame_time(Duration::from_secs(1), 100),
            Duration::from_millis(10)
        );

        // More frames than fit in a u32
        let frames = u64::from(u32::MAX) * 4;
        let average = average_frame_time(Duration::from_secs(frames), frames);
        assert_relative_eq!(average.as_secs_f64(), 1.0, epsilon = 1e-6);
    }
}
