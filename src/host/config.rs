//! Host configuration

use std::time::Duration;

/// Host configuration options
#[derive(Debug, Clone)]
pub struct HostConfig {
    /// Base canvas width passed to main render callbacks
    pub canvas_width: u32,

    /// Base canvas height passed to main render callbacks
    pub canvas_height: u32,

    /// Interval between frame loop iterations (tick + render)
    pub frame_interval: Duration,
}

impl Default for HostConfig {
    fn default() -> Self {
        Self {
            canvas_width: 1920,
            canvas_height: 1080,
            frame_interval: Duration::from_nanos(1_000_000_000 / 30),
        }
    }
}

impl HostConfig {
    /// Set the canvas size
    pub fn canvas(mut self, width: u32, height: u32) -> Self {
        self.canvas_width = width;
        self.canvas_height = height;
        self
    }

    /// Set the frame loop interval
    pub fn frame_interval(mut self, interval: Duration) -> Self {
        self.frame_interval = interval;
        self
    }

    /// Set the frame loop interval from a frame rate
    ///
    /// A rate of zero leaves the interval unchanged.
    pub fn fps(mut self, fps: u32) -> Self {
        if fps > 0 {
            self.frame_interval = Duration::from_nanos(1_000_000_000 / fps as u64);
        }
        self
    }
}
