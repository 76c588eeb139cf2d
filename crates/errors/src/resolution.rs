//! Executable resolution error types

use std::borrow::Cow;
use std::path::{Path, PathBuf};

use crate::{FetchError, PlatformError, UserFacingError};
use thiserror::Error;

/// Terminal outcome of a single failed resolution attempt.
///
/// Every resolution strategy (explicit path, path search, repository
/// coordinate) reports failures through this one taxonomy so that callers
/// never branch on which strategy was used.
#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum ResolutionError {
    #[error("no {name} executable was found in {searched}")]
    NotFound { name: String, searched: String },

    #[error("{} exists but is not executable", .path.display())]
    NotExecutable { path: PathBuf },

    #[error("file system error during {operation} on {}: {message}", .path.display())]
    FileSystem {
        operation: String,
        path: PathBuf,
        #[cfg_attr(feature = "serde", serde(with = "crate::io_kind_as_str"))]
        kind: std::io::ErrorKind,
        message: String,
    },

    #[error("no artifact classifier is known for platform {os}/{arch}")]
    UnsupportedPlatform { os: String, arch: String },

    #[error("failed to fetch {coordinate}")]
    FetchFailure {
        coordinate: String,
        #[source]
        cause: FetchError,
    },

    #[error("artifact {coordinate} resolved to {}, which is not a single executable file: {reason}", .path.display())]
    UnexpectedArtifactLayout {
        coordinate: String,
        path: PathBuf,
        reason: String,
    },
}

impl ResolutionError {
    /// No match after exhausting the search path
    #[must_use]
    pub fn not_found_on_path(name: &str, directories: usize) -> Self {
        Self::NotFound {
            name: name.to_string(),
            searched: format!("the search path ({directories} directories)"),
        }
    }

    /// An explicitly configured path that does not exist
    #[must_use]
    pub fn explicit_path_missing(path: &Path) -> Self {
        Self::NotFound {
            name: path
                .file_name()
                .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned()),
            searched: format!("the configured path {}", path.display()),
        }
    }

    /// Stable kind name, independent of the variant payload
    #[must_use]
    pub fn kind(&self) -> &'static str {
        match self {
            Self::NotFound { .. } => "not_found",
            Self::NotExecutable { .. } => "not_executable",
            Self::FileSystem { .. } => "file_system",
            Self::UnsupportedPlatform { .. } => "unsupported_platform",
            Self::FetchFailure { .. } => "fetch_failure",
            Self::UnexpectedArtifactLayout { .. } => "unexpected_artifact_layout",
        }
    }
}

impl From<PlatformError> for ResolutionError {
    fn from(err: PlatformError) -> Self {
        match err {
            PlatformError::FilesystemOperationFailed {
                operation,
                path,
                kind,
                message,
            } => Self::FileSystem {
                operation,
                path,
                kind,
                message,
            },
            PlatformError::UnsupportedPlatform { os, arch } => {
                Self::UnsupportedPlatform { os, arch }
            }
        }
    }
}

impl UserFacingError for ResolutionError {
    fn user_message(&self) -> Cow<'_, str> {
        match self {
            Self::FetchFailure { coordinate, cause } => {
                Cow::Owned(format!("failed to fetch {coordinate}: {cause}"))
            }
            _ => Cow::Owned(self.to_string()),
        }
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::NotFound { .. } => {
                Some("Install the executable, add its directory to PATH, or configure an explicit path.")
            }
            Self::NotExecutable { .. } => Some("Mark the file as executable (chmod +x) and retry."),
            Self::FileSystem { kind, .. } if *kind == std::io::ErrorKind::PermissionDenied => {
                Some("Fix the permissions of the reported directory or remove it from PATH.")
            }
            Self::UnsupportedPlatform { .. } => {
                Some("Set an explicit classifier or point to a locally installed executable.")
            }
            Self::FetchFailure { cause, .. } => cause.user_hint(),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::FetchFailure { cause, .. } => cause.is_retryable(),
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::NotFound { .. } => "resolution.not_found",
            Self::NotExecutable { .. } => "resolution.not_executable",
            Self::FileSystem { .. } => "resolution.file_system",
            Self::UnsupportedPlatform { .. } => "resolution.unsupported_platform",
            Self::FetchFailure { .. } => "resolution.fetch_failure",
            Self::UnexpectedArtifactLayout { .. } => "resolution.unexpected_artifact_layout",
        };
        Some(code)
    }
}
