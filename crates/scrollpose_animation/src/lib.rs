//! Scrollpose Animation
//!
//! Maps a scroll fraction onto an interpolated 3D pose every frame.
//!
//! # Features
//!
//! - **Easing**: Named curves (`power2.out`, `expo.inOut`, `elastic.out`, ...)
//! - **Keyframe Stores**: Validated, time-sorted keyframe sets with editor mutations
//! - **Timelines**: Keyframe pairs compiled into eased segments
//! - **Scroll Mapping**: Multi-loop wrapping with a single-loop reset window
//! - **Pose Evaluation**: Stateless sampling of position, rotation, scale, and overlay opacity
//!
//! # Example
//!
//! ```rust
//! use scrollpose_animation::{RecordingSink, ScrollAnimator};
//!
//! let mut animator = ScrollAnimator::new(None);
//! let sink = RecordingSink::new();
//! animator.add_sink(Box::new(sink.clone()));
//!
//! animator.on_scroll(0.1);
//! let pose = animator.frame();
//!
//! assert!(pose.ui_opacity >= 0.0 && pose.ui_opacity <= 1.0);
//! assert_eq!(sink.log().poses.len(), 1);
//! ```

pub mod easing;
pub mod engine;
pub mod error;
pub mod keyframe;
pub mod math;
pub mod perf;
pub mod pose;
pub mod presets;
pub mod scroll;
pub mod settings;
pub mod sink;
pub mod timeline;

pub use easing::{ease, Easing, EDITOR_EASINGS};
pub use engine::{ScrollAnimator, SettingsSender, SinkId};
pub use error::{ConfigError, DocumentError};
pub use keyframe::{Keyframe, KeyframePatch, KeyframeStore};
pub use math::Vec3;
pub use perf::FrameMonitor;
pub use pose::{evaluate, IdleSway, Pose};
pub use scroll::{MappedProgress, ResetWindow, ScrollMapper};
pub use settings::{AnimationSettings, SettingsDocument, ValidatedSettings};
pub use sink::{RecordingSink, SinkLog, UpdateSink};
pub use timeline::{Segment, Timeline};
