use thiserror::Error;

/// Rejected animation configuration.
///
/// A rejected replacement never touches the timeline already in use.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    #[error("a keyframe store needs at least 2 keyframes, got {count}")]
    TooFewKeyframes { count: usize },

    #[error("keyframes `{first}` and `{second}` share time {time}, leaving a zero-duration segment")]
    DuplicateTime {
        time: f32,
        first: String,
        second: String,
    },

    #[error("keyframe {index} (`{label}`) has a non-finite {field}")]
    NonFinite {
        index: usize,
        label: String,
        field: &'static str,
    },

    #[error("keyframe index {index} is out of range for a store of {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("loops must be a positive integer")]
    InvalidLoops,

    #[error("{field} must be a positive finite number, got {value}")]
    InvalidScalar { field: &'static str, value: f32 },

    #[error("reset window needs 0 <= exit < enter <= 1, got enter {enter}, exit {exit}")]
    InvalidResetWindow { enter: f32, exit: f32 },
}

/// Failure reading an exported settings document
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("malformed settings document: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unsupported settings document version `{0}`")]
    UnsupportedVersion(String),

    #[error(transparent)]
    Config(#[from] ConfigError),
}
