//! Timeline compilation
//!
//! A [`Timeline`] pairs a validated [`KeyframeStore`] with the segments
//! compiled from it. Both are replaced together, so a reader never sees
//! segments that disagree with the store.

use smallvec::SmallVec;
use tracing::debug;

use crate::easing::{resolve_or_linear, Easing};
use crate::keyframe::{Keyframe, KeyframeStore};
use crate::pose::Pose;

/// Transition between two adjacent keyframes
#[derive(Clone, Debug, PartialEq)]
pub struct Segment {
    pub from: Keyframe,
    pub to: Keyframe,
    /// `to.time - from.time`, always > 0
    pub duration: f32,
    /// Resolved from `to.easing`
    pub easing: Easing,
}

impl Segment {
    fn new(from: &Keyframe, to: &Keyframe) -> Self {
        Self {
            from: from.clone(),
            to: to.clone(),
            duration: to.time - from.time,
            easing: resolve_or_linear(&to.easing),
        }
    }

    /// Local progress of `time` within this segment, clamped to [0, 1]
    pub fn local_progress(&self, time: f32) -> f32 {
        ((time - self.from.time) / self.duration).clamp(0.0, 1.0)
    }
}

/// Compiled segment list, inline for stores of up to 9 keyframes
pub type Segments = SmallVec<[Segment; 8]>;

/// One segment per adjacent keyframe pair
pub fn compile(store: &KeyframeStore) -> Segments {
    store
        .keyframes()
        .windows(2)
        .map(|pair| Segment::new(&pair[0], &pair[1]))
        .collect()
}

/// A keyframe store together with its compiled segments
#[derive(Clone, Debug)]
pub struct Timeline {
    store: KeyframeStore,
    segments: Segments,
}

impl Timeline {
    pub fn compile(store: KeyframeStore) -> Self {
        let segments = compile(&store);
        debug!(
            "Compiled timeline: {} keyframes -> {} segments over [{}, {}]",
            store.len(),
            segments.len(),
            store.start_time(),
            store.end_time()
        );
        Self { store, segments }
    }

    pub fn store(&self) -> &KeyframeStore {
        &self.store
    }

    pub fn segments(&self) -> &[Segment] {
        &self.segments
    }

    pub fn start_time(&self) -> f32 {
        self.store.start_time()
    }

    pub fn end_time(&self) -> f32 {
        self.store.end_time()
    }

    /// Map looped progress in [0, 1) onto the keyframe time range
    pub fn timeline_time(&self, looped: f32) -> f32 {
        let start = self.start_time();
        start + (self.end_time() - start) * looped
    }

    /// Pose of the first keyframe, where every cycle starts
    pub fn initial_pose(&self) -> Pose {
        Pose::from_keyframe(self.store.first())
    }

    /// Evaluate the pose at looped progress
    pub fn sample(&self, looped: f32) -> Pose {
        crate::pose::evaluate(&self.segments, self.timeline_time(looped))
    }
}

impl Default for Timeline {
    fn default() -> Self {
        Self::compile(crate::presets::defaults())
    }
}
