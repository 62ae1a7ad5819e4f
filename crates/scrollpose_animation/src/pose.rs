//! Pose evaluation
//!
//! [`evaluate`] is a pure function of the compiled segments and a progress
//! value: it keeps no state between calls, so the latest scroll position
//! always yields the full pose regardless of how often frames and scroll
//! events fire.
//!
//! Rotation is interpolated as raw Euler components, not along the shortest
//! arc. Large multi-axis rotations can show axis coupling; the keyframe
//! values (such as the literal 243° flip) are authored against this
//! behavior.

use serde::{Deserialize, Serialize};

use crate::keyframe::{Keyframe, REST_POSITION};
use crate::math::{lerp, Vec3};
use crate::timeline::Segment;

/// Interpolated output applied to the scene every frame
#[derive(Clone, Copy, Debug, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Pose {
    pub position: Vec3,
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Always within [0, 1]
    pub ui_opacity: f32,
}

impl Pose {
    /// Rest pose, used when there is nothing to evaluate
    pub const REST: Pose = Pose {
        position: REST_POSITION,
        rotation: Vec3::ZERO,
        scale: Vec3::ONE,
        ui_opacity: 1.0,
    };

    pub fn from_keyframe(keyframe: &Keyframe) -> Self {
        Self {
            position: keyframe.position,
            rotation: keyframe.rotation,
            scale: keyframe.scale,
            ui_opacity: clamp_opacity(keyframe.ui_opacity),
        }
    }

    /// Largest absolute difference across all channels
    pub fn max_abs_diff(&self, other: &Pose) -> f32 {
        self.position
            .max_abs_diff(other.position)
            .max(self.rotation.max_abs_diff(other.rotation))
            .max(self.scale.max_abs_diff(other.scale))
            .max((self.ui_opacity - other.ui_opacity).abs())
    }
}

impl Default for Pose {
    fn default() -> Self {
        Self::REST
    }
}

/// Time-driven idle sway of the companion model, independent of scroll.
///
/// Yields `rotation.y = sin(elapsed * frequency) * amplitude` for a node
/// other than the posed one; sinks receive it through
/// [`UpdateSink::apply_idle_sway`](crate::sink::UpdateSink::apply_idle_sway).
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct IdleSway {
    /// Peak angle in radians
    pub amplitude: f32,
    /// Angular frequency in radians per second
    pub frequency: f32,
}

impl IdleSway {
    pub fn rotation_y(&self, elapsed_secs: f32) -> f32 {
        (elapsed_secs * self.frequency).sin() * self.amplitude
    }
}

impl Default for IdleSway {
    fn default() -> Self {
        Self {
            amplitude: 0.015,
            frequency: 0.5,
        }
    }
}

fn clamp_opacity(value: f32) -> f32 {
    if value.is_nan() {
        1.0
    } else {
        value.clamp(0.0, 1.0)
    }
}

/// Find the segment active at `time` and the local progress within it.
///
/// Times past the last keyframe clamp to the final segment at 1, times
/// before the first keyframe clamp to the first segment at 0. Returns `None`
/// only for an empty segment list.
pub fn locate(segments: &[Segment], time: f32) -> Option<(usize, f32)> {
    let first = segments.first()?;
    let last_index = segments.len() - 1;

    if time.is_nan() || time < first.from.time {
        return Some((0, 0.0));
    }
    if time >= segments[last_index].to.time {
        return Some((last_index, 1.0));
    }

    // Small keyframe counts; an ordered scan beats anything fancier
    let index = segments
        .iter()
        .position(|segment| time < segment.to.time)
        .unwrap_or(last_index);
    Some((index, segments[index].local_progress(time)))
}

/// Evaluate the pose at timeline progress `time`
pub fn evaluate(segments: &[Segment], time: f32) -> Pose {
    let Some((index, local)) = locate(segments, time) else {
        return Pose::REST;
    };

    let segment = &segments[index];
    let eased = segment.easing.apply(local);
    let (from, to) = (&segment.from, &segment.to);

    Pose {
        position: from.position.lerp(to.position, eased),
        rotation: from.rotation.lerp(to.rotation, eased),
        scale: from.scale.lerp(to.scale, eased),
        ui_opacity: clamp_opacity(lerp(from.ui_opacity, to.ui_opacity, eased)),
    }
}
