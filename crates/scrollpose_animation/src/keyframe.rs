//! Keyframes and the validated keyframe store
//!
//! A [`KeyframeStore`] is the source of truth for the animation's shape. It
//! can only be built through [`KeyframeStore::validate`], so every store in
//! circulation holds at least two finite keyframes sorted by strictly
//! increasing time.

use std::f32::consts::PI;

use serde::{Deserialize, Serialize};

use crate::error::ConfigError;
use crate::math::Vec3;

/// Minimum number of keyframes a store may hold
pub const MIN_KEYFRAMES: usize = 2;

/// Rest position of the animated node
pub const REST_POSITION: Vec3 = Vec3::new(0.0, 1.35, 0.6);

/// Rotation preset: upright
pub const ROTATION_REST: Vec3 = Vec3::ZERO;

/// Rotation preset: flipped over to show the underside (243°)
pub const ROTATION_FLIP: Vec3 = Vec3::new(PI * 1.35, 0.0, 0.0);

fn default_easing() -> String {
    "power2.out".to_string()
}

/// A single keyframe of the scroll animation
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Keyframe {
    /// Time position, nominally 0.0 to 1.0
    pub time: f32,
    pub position: Vec3,
    /// Euler angles in radians
    pub rotation: Vec3,
    pub scale: Vec3,
    /// Overlay opacity; clamped only when a pose is produced
    pub ui_opacity: f32,
    /// Easing used when transitioning TO this keyframe
    #[serde(default = "default_easing")]
    pub easing: String,
    /// Free-text label, diagnostics only
    #[serde(default)]
    pub label: String,
}

impl Keyframe {
    /// The editor's template keyframe: rest pose, fully visible overlay
    pub fn rest(time: f32) -> Self {
        Self {
            time,
            position: REST_POSITION,
            rotation: ROTATION_REST,
            scale: Vec3::ONE,
            ui_opacity: 1.0,
            easing: default_easing(),
            label: String::new(),
        }
    }

    /// Builder: set position
    pub fn with_position(mut self, x: f32, y: f32, z: f32) -> Self {
        self.position = Vec3::new(x, y, z);
        self
    }

    /// Builder: set Euler rotation in radians
    pub fn with_rotation(mut self, x: f32, y: f32, z: f32) -> Self {
        self.rotation = Vec3::new(x, y, z);
        self
    }

    /// Builder: set uniform scale
    pub fn with_scale(mut self, value: f32) -> Self {
        self.scale = Vec3::splat(value);
        self
    }

    /// Builder: set overlay opacity
    pub fn with_ui_opacity(mut self, value: f32) -> Self {
        self.ui_opacity = value;
        self
    }

    /// Builder: set easing name
    pub fn with_easing(mut self, easing: impl Into<String>) -> Self {
        self.easing = easing.into();
        self
    }

    /// Builder: set label
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = label.into();
        self
    }

    fn non_finite_field(&self) -> Option<&'static str> {
        if !self.time.is_finite() {
            Some("time")
        } else if !self.position.is_finite() {
            Some("position")
        } else if !self.rotation.is_finite() {
            Some("rotation")
        } else if !self.scale.is_finite() {
            Some("scale")
        } else if !self.ui_opacity.is_finite() {
            Some("uiOpacity")
        } else {
            None
        }
    }
}

/// Partial keyframe edit; `None` fields are left untouched
#[derive(Clone, Debug, Default)]
pub struct KeyframePatch {
    pub time: Option<f32>,
    pub position: Option<Vec3>,
    pub rotation: Option<Vec3>,
    pub scale: Option<Vec3>,
    pub ui_opacity: Option<f32>,
    pub easing: Option<String>,
    pub label: Option<String>,
}

impl KeyframePatch {
    pub fn time(value: f32) -> Self {
        Self {
            time: Some(value),
            ..Default::default()
        }
    }

    pub fn rotation(value: Vec3) -> Self {
        Self {
            rotation: Some(value),
            ..Default::default()
        }
    }

    pub fn easing(value: impl Into<String>) -> Self {
        Self {
            easing: Some(value.into()),
            ..Default::default()
        }
    }

    fn apply_to(self, keyframe: &mut Keyframe) {
        if let Some(time) = self.time {
            keyframe.time = time;
        }
        if let Some(position) = self.position {
            keyframe.position = position;
        }
        if let Some(rotation) = self.rotation {
            keyframe.rotation = rotation;
        }
        if let Some(scale) = self.scale {
            keyframe.scale = scale;
        }
        if let Some(opacity) = self.ui_opacity {
            keyframe.ui_opacity = opacity;
        }
        if let Some(easing) = self.easing {
            keyframe.easing = easing;
        }
        if let Some(label) = self.label {
            keyframe.label = label;
        }
    }
}

/// Ordered, validated set of keyframes
#[derive(Clone, Debug, PartialEq, Serialize)]
#[serde(transparent)]
pub struct KeyframeStore {
    keyframes: Vec<Keyframe>,
}

impl KeyframeStore {
    /// Validate and sort a keyframe list.
    ///
    /// Fails on fewer than two keyframes, any non-finite field, or two
    /// keyframes sharing a time.
    pub fn validate(mut keyframes: Vec<Keyframe>) -> Result<Self, ConfigError> {
        if keyframes.len() < MIN_KEYFRAMES {
            return Err(ConfigError::TooFewKeyframes {
                count: keyframes.len(),
            });
        }

        for (index, keyframe) in keyframes.iter().enumerate() {
            if let Some(field) = keyframe.non_finite_field() {
                return Err(ConfigError::NonFinite {
                    index,
                    label: keyframe.label.clone(),
                    field,
                });
            }
        }

        keyframes.sort_by(|a, b| a.time.total_cmp(&b.time));

        if let Some(pair) = keyframes.windows(2).find(|pair| pair[0].time == pair[1].time) {
            return Err(ConfigError::DuplicateTime {
                time: pair[1].time,
                first: pair[0].label.clone(),
                second: pair[1].label.clone(),
            });
        }

        Ok(Self { keyframes })
    }

    /// Insert a keyframe and re-sort
    pub fn add(&mut self, keyframe: Keyframe) -> Result<(), ConfigError> {
        let mut candidate = self.keyframes.clone();
        candidate.push(keyframe);
        self.commit(candidate)
    }

    /// Insert the editor's template keyframe at `time`
    pub fn add_at(&mut self, time: f32) -> Result<(), ConfigError> {
        let label = format!("Keyframe {}", self.keyframes.len() + 1);
        self.add(Keyframe::rest(time).with_label(label))
    }

    /// Apply a partial edit to the keyframe at `index` and re-sort
    pub fn update(&mut self, index: usize, patch: KeyframePatch) -> Result<(), ConfigError> {
        self.check_index(index)?;
        let mut candidate = self.keyframes.clone();
        patch.apply_to(&mut candidate[index]);
        self.commit(candidate)
    }

    /// Remove the keyframe at `index`; a store never drops below two keyframes
    pub fn remove(&mut self, index: usize) -> Result<Keyframe, ConfigError> {
        self.check_index(index)?;
        if self.keyframes.len() <= MIN_KEYFRAMES {
            return Err(ConfigError::TooFewKeyframes {
                count: self.keyframes.len() - 1,
            });
        }
        Ok(self.keyframes.remove(index))
    }

    pub fn keyframes(&self) -> &[Keyframe] {
        &self.keyframes
    }

    pub fn len(&self) -> usize {
        self.keyframes.len()
    }

    /// Always false; kept for API symmetry with `len`
    pub fn is_empty(&self) -> bool {
        self.keyframes.is_empty()
    }

    pub fn first(&self) -> &Keyframe {
        &self.keyframes[0]
    }

    pub fn last(&self) -> &Keyframe {
        &self.keyframes[self.keyframes.len() - 1]
    }

    /// Cycle start (time of the earliest keyframe)
    pub fn start_time(&self) -> f32 {
        self.first().time
    }

    /// Cycle end (time of the latest keyframe)
    pub fn end_time(&self) -> f32 {
        self.last().time
    }

    pub fn into_keyframes(self) -> Vec<Keyframe> {
        self.keyframes
    }

    fn check_index(&self, index: usize) -> Result<(), ConfigError> {
        if index >= self.keyframes.len() {
            return Err(ConfigError::IndexOutOfRange {
                index,
                len: self.keyframes.len(),
            });
        }
        Ok(())
    }

    fn commit(&mut self, candidate: Vec<Keyframe>) -> Result<(), ConfigError> {
        *self = Self::validate(candidate)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn labels(store: &KeyframeStore) -> Vec<&str> {
        store.keyframes().iter().map(|k| k.label.as_str()).collect()
    }

    fn three() -> KeyframeStore {
        KeyframeStore::validate(vec![
            Keyframe::rest(1.0).with_label("end"),
            Keyframe::rest(0.0).with_label("start"),
            Keyframe::rest(0.5).with_label("mid"),
        ])
        .unwrap()
    }

    #[test]
    fn test_validate_sorts_by_time() {
        assert_eq!(labels(&three()), vec!["start", "mid", "end"]);
    }

    #[test]
    fn test_validate_rejects_single_keyframe() {
        let err = KeyframeStore::validate(vec![Keyframe::rest(0.0)]).unwrap_err();
        assert_eq!(err, ConfigError::TooFewKeyframes { count: 1 });
    }

    #[test]
    fn test_validate_rejects_duplicate_time() {
        let err = KeyframeStore::validate(vec![
            Keyframe::rest(0.3).with_label("a"),
            Keyframe::rest(0.3).with_label("b"),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTime { time, .. } if time == 0.3));
    }

    #[test]
    fn test_validate_rejects_duplicate_after_sort() {
        let err = KeyframeStore::validate(vec![
            Keyframe::rest(0.5),
            Keyframe::rest(0.0),
            Keyframe::rest(0.5),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::DuplicateTime { .. }));
    }

    #[test]
    fn test_validate_rejects_non_finite() {
        let err = KeyframeStore::validate(vec![
            Keyframe::rest(0.0),
            Keyframe::rest(1.0)
                .with_label("broken")
                .with_rotation(0.0, f32::NAN, 0.0),
        ])
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::NonFinite {
                index: 1,
                label: "broken".to_string(),
                field: "rotation",
            }
        );

        let err = KeyframeStore::validate(vec![
            Keyframe::rest(f32::INFINITY),
            Keyframe::rest(1.0),
        ])
        .unwrap_err();
        assert!(matches!(err, ConfigError::NonFinite { field: "time", .. }));
    }

    #[test]
    fn test_unclamped_opacity_is_accepted() {
        let store = KeyframeStore::validate(vec![
            Keyframe::rest(0.0).with_ui_opacity(-0.5),
            Keyframe::rest(1.0).with_ui_opacity(1.5),
        ]);
        assert!(store.is_ok());
    }

    #[test]
    fn test_add_at_inserts_template_in_order() {
        let mut store = three();
        store.add_at(0.25).unwrap();

        assert_eq!(store.len(), 4);
        let added = &store.keyframes()[1];
        assert_eq!(added.label, "Keyframe 4");
        assert_eq!(added.position, REST_POSITION);
        assert_eq!(added.easing, "power2.out");
    }

    #[test]
    fn test_add_duplicate_time_leaves_store_untouched() {
        let mut store = three();
        let before = store.clone();

        assert!(store.add(Keyframe::rest(0.5)).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_update_resorts() {
        let mut store = three();
        store.update(0, KeyframePatch::time(0.75)).unwrap();
        assert_eq!(labels(&store), vec!["mid", "start", "end"]);

        store
            .update(2, KeyframePatch::rotation(ROTATION_FLIP))
            .unwrap();
        assert_eq!(store.last().rotation, ROTATION_FLIP);
    }

    #[test]
    fn test_update_rejects_bad_index_and_collisions() {
        let mut store = three();
        let before = store.clone();

        assert_eq!(
            store.update(9, KeyframePatch::easing("sine.inOut")),
            Err(ConfigError::IndexOutOfRange { index: 9, len: 3 })
        );
        assert!(store.update(0, KeyframePatch::time(1.0)).is_err());
        assert_eq!(store, before);
    }

    #[test]
    fn test_remove_never_drops_below_two() {
        let mut store = three();
        let removed = store.remove(1).unwrap();
        assert_eq!(removed.label, "mid");

        assert_eq!(
            store.remove(0),
            Err(ConfigError::TooFewKeyframes { count: 1 })
        );
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_serde_uses_editor_field_names() {
        let json = r#"{
            "time": 0.5,
            "position": {"x": 0, "y": 1.37, "z": 0.14},
            "rotation": {"x": 4.24, "y": 0, "z": 0},
            "scale": {"x": 1.4, "y": 1.4, "z": 1.4},
            "uiOpacity": 0,
            "easing": "expo.inOut",
            "label": "Cover Frame"
        }"#;
        let keyframe: Keyframe = serde_json::from_str(json).unwrap();
        assert_eq!(keyframe.ui_opacity, 0.0);
        assert_eq!(keyframe.scale, Vec3::splat(1.4));

        let out = serde_json::to_value(&keyframe).unwrap();
        assert!(out.get("uiOpacity").is_some());
    }
}
