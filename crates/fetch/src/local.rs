//! Local Maven-layout repository

use async_trait::async_trait;
use protoloc_errors::FetchError;
use protoloc_events::{AppEvent, EventEmitter, EventSender, FailureContext, FetchEvent};
use protoloc_types::CoordinateKey;
use std::path::{Path, PathBuf};

use crate::layout::artifact_path;
use crate::{ArtifactFetchService, FetchRequest};

/// Serves artifacts already present in a local repository directory
#[derive(Debug, Clone)]
pub struct LocalRepository {
    root: PathBuf,
    event_sender: Option<EventSender>,
}

impl LocalRepository {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self {
            root: root.into(),
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Where `key` lives (or would live) in this repository
    #[must_use]
    pub fn path_for(&self, key: &CoordinateKey) -> PathBuf {
        artifact_path(&self.root, key)
    }

    /// Look `key` up without reporting it as missing
    ///
    /// Anything present at the layout path is returned; deciding whether it
    /// is a usable executable is left to the resolver.
    ///
    /// # Errors
    ///
    /// Returns `FetchError::Io` when the path cannot be inspected for a reason
    /// other than not existing.
    pub async fn find(&self, key: &CoordinateKey) -> Result<Option<PathBuf>, FetchError> {
        let path = self.path_for(key);
        match tokio::fs::metadata(&path).await {
            Ok(_) => Ok(Some(path)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(FetchError::Io {
                message: format!("{}: {e}", path.display()),
            }),
        }
    }

    pub(crate) fn missing(&self, key: &CoordinateKey) -> FetchError {
        FetchError::ArtifactMissing {
            artifact: key.to_string(),
            searched: format!("local repository {}", self.root.display()),
        }
    }
}

impl EventEmitter for LocalRepository {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

#[async_trait]
impl ArtifactFetchService for LocalRepository {
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, FetchError> {
        let artifact = request.key.to_string();
        self.emit(AppEvent::Fetch(FetchEvent::Requested {
            artifact: artifact.clone(),
            resolution_depth: request.resolution_depth.map(|depth| depth.to_string()),
        }));

        let outcome = match self.find(&request.key).await {
            Ok(Some(path)) => Ok(path),
            Ok(None) => Err(self.missing(&request.key)),
            Err(e) => Err(e),
        };

        match &outcome {
            Ok(path) => self.emit(AppEvent::Fetch(FetchEvent::LocalHit {
                artifact,
                path: path.clone(),
            })),
            Err(e) => self.emit(AppEvent::Fetch(FetchEvent::Failed {
                artifact,
                failure: FailureContext::from_error(e),
            })),
        }
        outcome
    }
}
