//! Scroll-progress mapping
//!
//! One pass over the pinned scroll region plays the cycle `loops` times back
//! to back. With a single loop, wrapping from the end of the region back to
//! its start is reported as a discrete reset instead.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::ConfigError;

/// Largest f32 strictly below 1.0
pub const LAST_BEFORE_ONE: f32 = 1.0 - f32::EPSILON / 2.0;

/// Raw progress at or above which a single-loop pass counts as finished
pub const DEFAULT_RESET_ENTER: f32 = 0.995;

/// Raw progress below which a finished pass counts as restarted
pub const DEFAULT_RESET_EXIT: f32 = 0.1;

/// Thresholds of the single-loop reset window
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ResetWindow {
    pub enter: f32,
    pub exit: f32,
}

impl ResetWindow {
    /// Check `0 <= exit < enter <= 1`, both finite.
    ///
    /// Anything else would let an ordinary reverse scrub count as a wrap.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let in_range = |v: f32| v.is_finite() && (0.0..=1.0).contains(&v);
        if in_range(self.enter) && in_range(self.exit) && self.exit < self.enter {
            Ok(())
        } else {
            Err(ConfigError::InvalidResetWindow {
                enter: self.enter,
                exit: self.exit,
            })
        }
    }
}

impl Default for ResetWindow {
    fn default() -> Self {
        Self {
            enter: DEFAULT_RESET_ENTER,
            exit: DEFAULT_RESET_EXIT,
        }
    }
}

/// Clamp a collaborator-supplied scroll fraction into [0, 1] (NaN becomes 0)
pub fn clamp_progress(raw: f32) -> f32 {
    if raw.is_nan() {
        0.0
    } else {
        raw.clamp(0.0, 1.0)
    }
}

/// Map raw scroll progress to looped timeline progress in [0, 1).
///
/// The end of the scroll region (`raw == 1`) maps just below 1 so the last
/// loop finishes in its final segment instead of snapping back to the start.
/// A `loops` of 0 is treated as 1.
pub fn map(raw: f32, loops: u32) -> f32 {
    let raw = clamp_progress(raw);
    let loops = loops.max(1) as f32;

    let scaled = raw * loops;
    if scaled >= loops {
        return LAST_BEFORE_ONE;
    }
    scaled.fract().min(LAST_BEFORE_ONE)
}

/// Output of one scroll update
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct MappedProgress {
    /// Clamped raw scroll fraction
    pub raw: f32,
    /// Looped timeline progress in [0, 1)
    pub progress: f32,
    /// Set when a single-loop pass wrapped back to its start
    pub reset: bool,
}

/// Stateful mapper fed from the scroll callback
#[derive(Clone, Debug)]
pub struct ScrollMapper {
    loops: u32,
    window: ResetWindow,
    last_raw: Option<f32>,
}

impl ScrollMapper {
    pub fn new(loops: u32) -> Self {
        Self {
            loops: loops.max(1),
            window: ResetWindow::default(),
            last_raw: None,
        }
    }

    /// Builder: set the reset window
    pub fn with_reset_window(mut self, window: ResetWindow) -> Result<Self, ConfigError> {
        self.set_reset_window(window)?;
        Ok(self)
    }

    pub fn loops(&self) -> u32 {
        self.loops
    }

    /// Change the loop count, keeping the scroll history
    pub fn set_loops(&mut self, loops: u32) {
        self.loops = loops.max(1);
    }

    pub fn reset_window(&self) -> ResetWindow {
        self.window
    }

    /// Replace the reset window; a rejected window leaves the current one
    pub fn set_reset_window(&mut self, window: ResetWindow) -> Result<(), ConfigError> {
        window.validate()?;
        self.window = window;
        Ok(())
    }

    /// Feed a new raw scroll fraction
    pub fn update(&mut self, raw: f32) -> MappedProgress {
        let raw = clamp_progress(raw);
        let reset = self.loops == 1
            && self.last_raw.is_some_and(|prev| prev >= self.window.enter)
            && raw < self.window.exit;
        self.last_raw = Some(raw);

        if reset {
            debug!("Scroll pass wrapped to {}, signalling reset", raw);
        }

        MappedProgress {
            raw,
            progress: map(raw, self.loops),
            reset,
        }
    }

    /// Progress for the latest raw value under the current loop count
    pub fn current(&self) -> MappedProgress {
        let raw = self.last_raw.unwrap_or(0.0);
        MappedProgress {
            raw,
            progress: map(raw, self.loops),
            reset: false,
        }
    }
}

impl Default for ScrollMapper {
    fn default() -> Self {
        Self::new(1)
    }
}
