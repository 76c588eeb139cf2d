//! Platform-specific operation errors

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::UserFacingError;
use thiserror::Error;

/// Errors that can occur during platform-specific operations
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum PlatformError {
    #[error("filesystem operation failed: {operation} on {} - {message}", .path.display())]
    FilesystemOperationFailed {
        operation: String,
        path: PathBuf,
        #[cfg_attr(feature = "serde", serde(with = "crate::io_kind_as_str"))]
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("platform not supported: {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },
}

impl PlatformError {
    /// Wrap an `io::Error` raised by `operation` on `path`
    #[must_use]
    pub fn filesystem(operation: &str, path: &Path, err: &std::io::Error) -> Self {
        Self::FilesystemOperationFailed {
            operation: operation.to_string(),
            path: path.to_path_buf(),
            kind: err.kind(),
            message: err.to_string(),
        }
    }

    /// The underlying I/O error kind, when this error wraps one
    #[must_use]
    pub fn io_kind(&self) -> Option<std::io::ErrorKind> {
        match self {
            Self::FilesystemOperationFailed { kind, .. } => Some(*kind),
            Self::UnsupportedPlatform { .. } => None,
        }
    }
}

impl UserFacingError for PlatformError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::FilesystemOperationFailed { .. } => "platform.filesystem",
            Self::UnsupportedPlatform { .. } => "platform.unsupported",
        };
        Some(code)
    }
}
