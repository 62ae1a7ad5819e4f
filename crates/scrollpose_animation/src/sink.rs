//! Update sinks
//!
//! The animation never touches scene nodes or overlay elements directly; it
//! hands each frame's [`Pose`] to the registered [`UpdateSink`]s.

use std::cell::RefCell;
use std::rc::Rc;

use crate::pose::Pose;

/// Consumer of evaluated poses
pub trait UpdateSink {
    /// Apply position, rotation, and scale to the animated node
    fn apply_pose(&mut self, pose: &Pose);

    /// Apply the overlay opacity (already clamped to [0, 1])
    fn apply_overlay_opacity(&mut self, opacity: f32);

    /// Apply the idle sway angle to the companion model; ignored by default
    fn apply_idle_sway(&mut self, _rotation_y: f32) {}

    /// Snap to `initial` without interpolating
    fn reset(&mut self, initial: &Pose) {
        self.apply_pose(initial);
        self.apply_overlay_opacity(initial.ui_opacity);
    }
}

/// Everything a [`RecordingSink`] has received
#[derive(Clone, Debug, Default, PartialEq)]
pub struct SinkLog {
    pub poses: Vec<Pose>,
    pub opacities: Vec<f32>,
    pub resets: Vec<Pose>,
    pub sways: Vec<f32>,
}

/// In-memory sink; clones share one log
#[derive(Clone, Debug, Default)]
pub struct RecordingSink {
    log: Rc<RefCell<SinkLog>>,
}

impl RecordingSink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Snapshot of the calls received so far
    pub fn log(&self) -> SinkLog {
        self.log.borrow().clone()
    }

    pub fn last_pose(&self) -> Option<Pose> {
        self.log.borrow().poses.last().copied()
    }

    pub fn clear(&self) {
        *self.log.borrow_mut() = SinkLog::default();
    }
}

impl UpdateSink for RecordingSink {
    fn apply_pose(&mut self, pose: &Pose) {
        self.log.borrow_mut().poses.push(*pose);
    }

    fn apply_overlay_opacity(&mut self, opacity: f32) {
        self.log.borrow_mut().opacities.push(opacity);
    }

    fn apply_idle_sway(&mut self, rotation_y: f32) {
        self.log.borrow_mut().sways.push(rotation_y);
    }

    fn reset(&mut self, initial: &Pose) {
        let mut log = self.log.borrow_mut();
        log.resets.push(*initial);
        log.poses.push(*initial);
        log.opacities.push(initial.ui_opacity);
    }
}
