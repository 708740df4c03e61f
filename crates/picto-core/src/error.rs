use thiserror::Error;

/// Top-level error type for the Picto system.
///
/// Each variant wraps a subsystem-specific failure. Subsystem crates define
/// their own error types and implement `From` conversions so that the `?`
/// operator works seamlessly across crate boundaries.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum PictoError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Capture error: {0}")]
    Capture(String),

    #[error("Speech error: {0}")]
    Speech(String),

    #[error("Inference error: {0}")]
    Inference(String),

    #[error("Session error: {0}")]
    Session(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(String),
}

impl From<toml::de::Error> for PictoError {
    fn from(err: toml::de::Error) -> Self {
        PictoError::Config(err.to_string())
    }
}

impl From<toml::ser::Error> for PictoError {
    fn from(err: toml::ser::Error) -> Self {
        PictoError::Config(err.to_string())
    }
}

impl From<serde_json::Error> for PictoError {
    fn from(err: serde_json::Error) -> Self {
        PictoError::Serialization(err.to_string())
    }
}

pub type Result<T> = std::result::Result<T, PictoError>;

// =============================================================================
// Tests
// =============================================================================
