//! Error types shared across FaceRig crates.

use std::path::PathBuf;

/// Top-level error type for FaceRig operations.
#[derive(Debug, thiserror::Error)]
pub enum FacerigError {
    /// Bad static configuration: blendshape mapping, rig binding, calibration.
    #[error("Configuration error: {message}")]
    Configuration { message: String },

    /// Bad per-frame tracking data.
    #[error("Malformed input: {message}")]
    MalformedInput { message: String },

    /// A persisted animation log exists but cannot be parsed.
    #[error("Corrupt data in {path}: {message}")]
    CorruptData { path: PathBuf, message: String },

    /// The bound rig exposes no mesh carrying shape keys.
    #[error("No shape key target: {message}")]
    NoShapeKeyTarget { message: String },

    /// The host rig adapter refused an operation.
    #[error("Rig error: {message}")]
    Rig { message: String },

    /// Capture session misuse or failure.
    #[error("Session error: {message}")]
    Session { message: String },

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Result type alias using FacerigError.
pub type FacerigResult<T> = Result<T, FacerigError>;

impl FacerigError {
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration {
            message: msg.into(),
        }
    }

    pub fn malformed(msg: impl Into<String>) -> Self {
        Self::MalformedInput {
            message: msg.into(),
        }
    }

    pub fn corrupt(path: impl Into<PathBuf>, msg: impl Into<String>) -> Self {
        Self::CorruptData {
            path: path.into(),
            message: msg.into(),
        }
    }

    pub fn no_shape_key_target(msg: impl Into<String>) -> Self {
        Self::NoShapeKeyTarget {
            message: msg.into(),
        }
    }

    pub fn rig(msg: impl Into<String>) -> Self {
        Self::Rig {
            message: msg.into(),
        }
    }

    pub fn session(msg: impl Into<String>) -> Self {
        Self::Session {
            message: msg.into(),
        }
    }

    /// Whether this error must prevent a capture session from starting or continuing.
    pub fn is_fatal(&self) -> bool {
        matches!(
            self,
            Self::Configuration { .. } | Self::NoShapeKeyTarget { .. }
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fatal_classification() {
        assert!(FacerigError::configuration("bad index").is_fatal());
        assert!(FacerigError::no_shape_key_target("empty rig").is_fatal());
        assert!(!FacerigError::malformed("short translation").is_fatal());
        assert!(!FacerigError::rig("refused").is_fatal());
    }

    #[test]
    fn test_display_includes_path() {
        let err = FacerigError::corrupt("/tmp/log.json", "expected `[`");
        assert_eq!(
            err.to_string(),
            "Corrupt data in /tmp/log.json: expected `[`"
        );
    }
}
