//! Animation settings and the editor's export document

use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

use crate::error::{ConfigError, DocumentError};
use crate::keyframe::{Keyframe, KeyframeStore};
use crate::presets::default_keyframes;

/// Version written into exported documents
pub const DOCUMENT_VERSION: &str = "1.0";

/// Default number of cycles per scroll pass
pub const DEFAULT_LOOPS: u32 = 4;

fn default_duration() -> f32 {
    1.0
}

fn default_loops() -> u32 {
    DEFAULT_LOOPS
}

fn default_speed() -> f32 {
    1.0
}

/// Configuration supplied by the timeline editor
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct AnimationSettings {
    pub keyframes: Vec<Keyframe>,
    /// Informational; does not affect scroll-driven progress
    #[serde(default = "default_duration")]
    pub duration: f32,
    /// Cycles per traversal of the pinned scroll region
    #[serde(default = "default_loops")]
    pub loops: u32,
    /// Informational playback multiplier
    #[serde(default = "default_speed")]
    pub speed: f32,
}

impl Default for AnimationSettings {
    fn default() -> Self {
        Self {
            keyframes: default_keyframes(),
            duration: default_duration(),
            loops: DEFAULT_LOOPS,
            speed: default_speed(),
        }
    }
}

impl AnimationSettings {
    /// Builder: set loop count
    pub fn with_loops(mut self, loops: u32) -> Self {
        self.loops = loops;
        self
    }

    /// Builder: replace keyframes
    pub fn with_keyframes(mut self, keyframes: Vec<Keyframe>) -> Self {
        self.keyframes = keyframes;
        self
    }

    pub fn validate(self) -> Result<ValidatedSettings, ConfigError> {
        if self.loops == 0 {
            return Err(ConfigError::InvalidLoops);
        }
        check_scalar("duration", self.duration)?;
        check_scalar("speed", self.speed)?;

        Ok(ValidatedSettings {
            store: KeyframeStore::validate(self.keyframes)?,
            duration: self.duration,
            loops: self.loops,
            speed: self.speed,
        })
    }
}

fn check_scalar(field: &'static str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::InvalidScalar { field, value })
    }
}

/// Settings that passed validation
#[derive(Clone, Debug, PartialEq)]
pub struct ValidatedSettings {
    pub store: KeyframeStore,
    pub duration: f32,
    pub loops: u32,
    pub speed: f32,
}

impl ValidatedSettings {
    pub fn into_settings(self) -> AnimationSettings {
        AnimationSettings {
            keyframes: self.store.into_keyframes(),
            duration: self.duration,
            loops: self.loops,
            speed: self.speed,
        }
    }
}

impl Default for ValidatedSettings {
    fn default() -> Self {
        Self {
            store: crate::presets::defaults(),
            duration: default_duration(),
            loops: DEFAULT_LOOPS,
            speed: default_speed(),
        }
    }
}

/// Export envelope written by the timeline editor's "copy" action
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SettingsDocument {
    pub animation: AnimationSettings,
    /// Opaque export time; this crate writes unix milliseconds
    #[serde(default)]
    pub timestamp: String,
    pub version: String,
}

impl SettingsDocument {
    /// Wrap settings stamped with the current time
    pub fn new(animation: AnimationSettings) -> Self {
        let millis = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis())
            .unwrap_or_default();
        Self {
            animation,
            timestamp: millis.to_string(),
            version: DOCUMENT_VERSION.to_string(),
        }
    }

    pub fn to_json_pretty(&self) -> Result<String, DocumentError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Parse a document, rejecting versions other than [`DOCUMENT_VERSION`]
    pub fn from_json(src: &str) -> Result<Self, DocumentError> {
        let doc: SettingsDocument = serde_json::from_str(src)?;
        if doc.version != DOCUMENT_VERSION {
            return Err(DocumentError::UnsupportedVersion(doc.version));
        }
        Ok(doc)
    }

    pub fn into_validated(self) -> Result<ValidatedSettings, DocumentError> {
        Ok(self.animation.validate()?)
    }
}
