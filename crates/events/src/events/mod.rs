use serde::{Deserialize, Serialize};

use crate::EventSource;
use protoloc_errors::UserFacingError;

/// Structured failure information shared across domains.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FailureContext {
    /// Stable error code from the error taxonomy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,
    /// Short user-facing message.
    pub message: String,
    /// Optional remediation hint.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
    /// Whether retrying the operation might succeed.
    pub retryable: bool,
}

impl FailureContext {
    /// Construct a new failure context.
    #[must_use]
    pub fn new(
        code: Option<impl Into<String>>,
        message: impl Into<String>,
        hint: Option<impl Into<String>>,
        retryable: bool,
    ) -> Self {
        Self {
            code: code.map(Into::into),
            message: message.into(),
            hint: hint.map(Into::into),
            retryable,
        }
    }

    /// Build failure context from a `UserFacingError` implementation.
    #[must_use]
    pub fn from_error<E: UserFacingError + ?Sized>(error: &E) -> Self {
        Self::new(
            error.user_code(),
            error.user_message().into_owned(),
            error.user_hint(),
            error.is_retryable(),
        )
    }
}

pub mod fetch;
pub mod resolution;

pub use fetch::*;
pub use resolution::*;

/// Top-level application event enum that aggregates all domain-specific events
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "domain", content = "event", rename_all = "snake_case")]
pub enum AppEvent {
    /// Executable resolution events (search, cache, permissions)
    Resolution(ResolutionEvent),

    /// Artifact fetch events (local repository, downloads, checksums)
    Fetch(FetchEvent),
}

impl AppEvent {
    /// Identify the source domain for this event (used for metadata/logging).
    #[must_use]
    pub fn event_source(&self) -> EventSource {
        match self {
            Self::Resolution(_) => EventSource::Resolution,
            Self::Fetch(_) => EventSource::Fetch,
        }
    }

    /// Determine the appropriate tracing log level for this event
    #[must_use]
    pub fn log_level(&self) -> tracing::Level {
        use tracing::Level;

        match self {
            Self::Resolution(ResolutionEvent::Failed { .. })
            | Self::Fetch(FetchEvent::Failed { .. }) => Level::ERROR,

            Self::Fetch(
                FetchEvent::DownloadRetrying { .. }
                | FetchEvent::RemoteSkipped { .. }
                | FetchEvent::ChecksumUnavailable { .. },
            ) => Level::WARN,

            Self::Resolution(
                ResolutionEvent::DirectorySkipped { .. } | ResolutionEvent::CacheHit { .. },
            )
            | Self::Fetch(FetchEvent::Requested { .. } | FetchEvent::LocalHit { .. }) => {
                Level::DEBUG
            }

            _ => Level::INFO,
        }
    }

    /// Get the log target for this event (for structured logging)
    #[must_use]
    pub fn log_target(&self) -> &'static str {
        match self {
            Self::Resolution(_) => "protoloc::events::resolution",
            Self::Fetch(_) => "protoloc::events::fetch",
        }
    }
}
