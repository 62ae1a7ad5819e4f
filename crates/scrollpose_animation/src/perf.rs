//! Frame-rate monitoring
//!
//! Counts frames and emits one fps sample per window of at least a second,
//! warning when a sample drops below the low-fps threshold.

use std::time::{Duration, Instant};

use smallvec::SmallVec;
use tracing::warn;

/// Number of fps samples kept
pub const FPS_HISTORY: usize = 10;

/// Samples below this are logged as warnings
pub const LOW_FPS_THRESHOLD: u32 = 30;

const SAMPLE_WINDOW: Duration = Duration::from_secs(1);

#[derive(Clone, Debug)]
pub struct FrameMonitor {
    frame_count: u32,
    window_start: Option<Instant>,
    history: SmallVec<[u32; FPS_HISTORY]>,
    low_fps_threshold: u32,
}

impl FrameMonitor {
    pub fn new() -> Self {
        Self {
            frame_count: 0,
            window_start: None,
            history: SmallVec::new(),
            low_fps_threshold: LOW_FPS_THRESHOLD,
        }
    }

    pub fn set_low_fps_threshold(&mut self, fps: u32) {
        self.low_fps_threshold = fps;
    }

    /// Record a rendered frame; returns the new fps sample when a window closes
    pub fn record_frame(&mut self, now: Instant) -> Option<u32> {
        let Some(start) = self.window_start else {
            self.window_start = Some(now);
            return None;
        };

        self.frame_count += 1;
        let elapsed = now.saturating_duration_since(start);
        if elapsed < SAMPLE_WINDOW {
            return None;
        }

        let fps = (self.frame_count as f64 / elapsed.as_secs_f64()).round() as u32;
        if self.history.len() == FPS_HISTORY {
            self.history.remove(0);
        }
        self.history.push(fps);
        self.frame_count = 0;
        self.window_start = Some(now);

        if fps < self.low_fps_threshold {
            warn!("Low FPS detected: {}fps", fps);
        }
        Some(fps)
    }

    /// Rounded mean of the kept samples, 0 when there are none
    pub fn average_fps(&self) -> u32 {
        if self.history.is_empty() {
            return 0;
        }
        let sum: u32 = self.history.iter().sum();
        (sum as f32 / self.history.len() as f32).round() as u32
    }

    pub fn samples(&self) -> &[u32] {
        &self.history
    }
}

impl Default for FrameMonitor {
    fn default() -> Self {
        Self::new()
    }
}
