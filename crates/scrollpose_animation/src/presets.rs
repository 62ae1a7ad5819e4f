//! Baseline animation cycle
//!
//! The tray approaches the camera, the overlay fades, the tray flips to show
//! its underside, holds at full scale, flips back, returns to rest, and the
//! overlay fades back in. Values are reproduced exactly; regression tests
//! depend on them.

use crate::keyframe::{Keyframe, KeyframeStore};

/// Keyframe times of the baseline cycle
pub const DEFAULT_TIMES: [f32; 8] = [0.0, 0.15, 0.25, 0.4, 0.5, 0.65, 0.8, 1.0];

/// Literal flip angle of the baseline (≈243°)
pub const FLIP_ANGLE: f32 = 4.24;

/// The 8-keyframe baseline, unvalidated
pub fn default_keyframes() -> Vec<Keyframe> {
    vec![
        Keyframe::rest(0.0)
            .with_easing("power2.out")
            .with_label("Initial State"),
        Keyframe::rest(0.15)
            .with_position(0.0, 1.37, 0.4)
            .with_scale(1.1)
            .with_easing("power2.out")
            .with_label("Approach"),
        Keyframe::rest(0.25)
            .with_position(0.0, 1.37, 0.3)
            .with_rotation(0.15, 0.0, 0.0)
            .with_scale(1.1)
            .with_ui_opacity(0.0)
            .with_easing("power3.inOut")
            .with_label("UI Fade & Tilt"),
        Keyframe::rest(0.4)
            .with_position(0.0, 1.37, 0.18)
            .with_rotation(FLIP_ANGLE, 0.0, 0.0)
            .with_scale(1.1)
            .with_ui_opacity(0.0)
            .with_easing("expo.inOut")
            .with_label("Flip Start"),
        Keyframe::rest(0.5)
            .with_position(0.0, 1.37, 0.14)
            .with_rotation(FLIP_ANGLE, 0.0, 0.0)
            .with_scale(1.4)
            .with_ui_opacity(0.0)
            .with_easing("expo.inOut")
            .with_label("Cover Frame"),
        Keyframe::rest(0.65)
            .with_position(0.0, 1.37, 0.3)
            .with_rotation(0.15, 0.0, 0.0)
            .with_scale(1.1)
            .with_ui_opacity(0.0)
            .with_easing("expo.inOut")
            .with_label("Flip Back"),
        Keyframe::rest(0.8)
            .with_ui_opacity(0.0)
            .with_easing("power2.inOut")
            .with_label("Return"),
        Keyframe::rest(1.0)
            .with_easing("power3.inOut")
            .with_label("UI Return"),
    ]
}

/// The validated baseline store
pub fn defaults() -> KeyframeStore {
    KeyframeStore::validate(default_keyframes())
        .unwrap_or_else(|err| unreachable!("baseline keyframes are invalid: {err}"))
}
