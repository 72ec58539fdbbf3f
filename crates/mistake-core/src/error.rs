//! Error types for mistake

use thiserror::Error;

use crate::classify::MetadataError;
use crate::debugger::{BackendError, LaunchError};

/// Result type alias for mistake operations
pub type MistakeResult<T> = Result<T, MistakeError>;

/// Main error type for mistake
///
/// Nothing in the panic hook is allowed to escalate one of these into a second
/// panic; the hook logs them and returns.
#[derive(Error, Debug, Clone)]
pub enum MistakeError {
    /// Configuration related errors
    #[error("Configuration error: {0}")]
    Config(String),

    /// Package metadata could not be queried
    #[error("Package metadata error: {0}")]
    Metadata(#[from] MetadataError),

    /// The debugger backend failed
    #[error("Debugger backend error: {0}")]
    Backend(#[from] BackendError),

    /// The post-mortem session could not be launched
    #[error("Launch error: {0}")]
    Launch(#[from] LaunchError),

    /// Backtrace capture or parsing failed
    #[error("Backtrace error: {0}")]
    Backtrace(String),

    /// IO errors
    #[error("IO error: {0}")]
    Io(String),
}

impl MistakeError {
    /// Create a new configuration error
    pub fn config(message: impl Into<String>) -> Self {
        Self::Config(message.into())
    }

    /// Create a new backtrace error
    pub fn backtrace(message: impl Into<String>) -> Self {
        Self::Backtrace(message.into())
    }
}

impl From<std::io::Error> for MistakeError {
    fn from(error: std::io::Error) -> Self {
        Self::Io(error.to_string())
    }
}
