//! Artifact fetch error types

use std::borrow::Cow;

use crate::UserFacingError;
use thiserror::Error;

#[derive(Debug, Clone, Error)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[non_exhaustive]
pub enum FetchError {
    #[error("connection timeout to {url}")]
    Timeout { url: String },

    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    #[error("download failed: {0}")]
    DownloadFailed(String),

    #[error("invalid URL: {0}")]
    InvalidUrl(String),

    #[error("HTTP error {status}: {message}")]
    HttpError { status: u16, message: String },

    #[error("artifact {artifact} was not found in {searched}")]
    ArtifactMissing { artifact: String, searched: String },

    #[error("checksum mismatch for {artifact}: expected {expected}, got {actual}")]
    ChecksumMismatch {
        artifact: String,
        expected: String,
        actual: String,
    },

    #[error("repository is offline and {artifact} is not available locally")]
    Offline { artifact: String },

    #[error("I/O error: {message}")]
    Io { message: String },
}

impl From<std::io::Error> for FetchError {
    fn from(err: std::io::Error) -> Self {
        Self::Io {
            message: err.to_string(),
        }
    }
}

impl UserFacingError for FetchError {
    fn user_message(&self) -> Cow<'_, str> {
        Cow::Owned(self.to_string())
    }

    fn user_hint(&self) -> Option<&'static str> {
        match self {
            Self::Timeout { .. } | Self::ConnectionFailed(_) => {
                Some("Check your network connection or repository URL and retry.")
            }
            Self::ArtifactMissing { .. } => {
                Some("Verify the group, artifact, version and classifier of the coordinate.")
            }
            Self::ChecksumMismatch { .. } => {
                Some("Delete the partially downloaded artifact and retry; report persistent mismatches.")
            }
            Self::Offline { .. } => Some("Disable offline mode or pre-populate the local repository."),
            _ => None,
        }
    }

    fn is_retryable(&self) -> bool {
        match self {
            Self::Timeout { .. }
            | Self::ConnectionFailed(_)
            | Self::DownloadFailed(_)
            | Self::ChecksumMismatch { .. } => true,
            Self::HttpError { status, .. } => *status >= 500,
            _ => false,
        }
    }

    fn user_code(&self) -> Option<&'static str> {
        let code = match self {
            Self::Timeout { .. } => "fetch.timeout",
            Self::ConnectionFailed(_) => "fetch.connection_failed",
            Self::DownloadFailed(_) => "fetch.download_failed",
            Self::InvalidUrl(_) => "fetch.invalid_url",
            Self::HttpError { .. } => "fetch.http_error",
            Self::ArtifactMissing { .. } => "fetch.artifact_missing",
            Self::ChecksumMismatch { .. } => "fetch.checksum_mismatch",
            Self::Offline { .. } => "fetch.offline",
            Self::Io { .. } => "fetch.io",
        };
        Some(code)
    }
}
