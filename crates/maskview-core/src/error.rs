//! Error types for loading, normalizing and rendering label volumes.

use thiserror::Error;

/// Main error type for maskview operations.
#[derive(Error, Debug)]
pub enum Error {
    /// Input volume missing, unreadable or not a supported container.
    #[error("Load error: {0}")]
    Load(String),

    /// Geometry normalization received incompatible shapes or parameters.
    #[error("Transform error: {0}")]
    Transform(String),

    /// Shape mismatch between tensors, masks or buffers.
    #[error("Shape mismatch: expected {expected:?}, got {actual:?}")]
    ShapeMismatch {
        expected: Vec<usize>,
        actual: Vec<usize>,
    },

    /// Invalid pipeline configuration.
    #[error("Invalid configuration: {0}")]
    InvalidConfiguration(String),

    /// Writing an output volume failed.
    #[error("Write error: {0}")]
    Write(String),

    /// Building or exporting the scene failed.
    #[error("Render error: {0}")]
    Render(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Result type for maskview operations.
pub type Result<T> = std::result::Result<T, Error>;

impl Error {
    /// Create a load error.
    pub fn load(msg: impl Into<String>) -> Self {
        Self::Load(msg.into())
    }

    /// Create a transform error.
    pub fn transform(msg: impl Into<String>) -> Self {
        Self::Transform(msg.into())
    }

    /// Create an invalid configuration error.
    pub fn invalid_configuration(msg: impl Into<String>) -> Self {
        Self::InvalidConfiguration(msg.into())
    }

    /// Create a write error.
    pub fn write(msg: impl Into<String>) -> Self {
        Self::Write(msg.into())
    }

    /// Create a render error.
    pub fn render(msg: impl Into<String>) -> Self {
        Self::Render(msg.into())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_display() {
        let err = Error::transform("degenerate direction");
        assert!(matches!(err, Error::Transform(_)));
        assert_eq!(err.to_string(), "Transform error: degenerate direction");
    }

    #[test]
    fn test_shape_mismatch() {
        let err = Error::ShapeMismatch {
            expected: vec![128, 128, 128],
            actual: vec![64, 64, 20],
        };
        let err_str = err.to_string();
        assert!(err_str.contains("[128, 128, 128]"));
        assert!(err_str.contains("[64, 64, 20]"));
    }

    #[test]
    fn test_io_error_is_transparent() {
        let io = std::io::Error::new(std::io::ErrorKind::NotFound, "gone");
        let err: Error = io.into();
        assert_eq!(err.to_string(), "gone");
    }
}
