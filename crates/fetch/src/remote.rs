//! Remote repository download into the local repository

use async_trait::async_trait;
use futures::StreamExt;
use protoloc_errors::FetchError;
use protoloc_events::{AppEvent, EventEmitter, EventSender, FailureContext, FetchEvent};
use protoloc_types::CoordinateKey;
use reqwest::StatusCode;
use sha2::{Digest, Sha256};
use std::path::{Path, PathBuf};
use tokio::io::AsyncWriteExt;
use url::Url;

use crate::client::NetClient;
use crate::layout::artifact_url;
use crate::local::LocalRepository;
use crate::validation::{parse_checksum, validate_response, verify_checksum};
use crate::{ArtifactFetchService, FetchRequest};

/// Bytes written and whether a published checksum confirmed them
struct Downloaded {
    bytes: u64,
    checksum_verified: bool,
}

/// Local repository backed by an ordered list of remote repositories
///
/// Missing artifacts are downloaded to a uniquely named part file next to
/// their final location and renamed into place once complete, so readers
/// never observe a partial artifact.
#[derive(Clone)]
pub struct RemoteRepository {
    local: LocalRepository,
    remotes: Vec<Url>,
    client: NetClient,
    offline: bool,
    event_sender: Option<EventSender>,
}

impl RemoteRepository {
    #[must_use]
    pub fn new(local: LocalRepository, remotes: Vec<Url>, client: NetClient) -> Self {
        Self {
            local,
            remotes,
            client,
            offline: false,
            event_sender: None,
        }
    }

    /// Only serve what is already in the local repository
    #[must_use]
    pub fn with_offline(mut self, offline: bool) -> Self {
        self.offline = offline;
        self
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    #[must_use]
    pub fn local(&self) -> &LocalRepository {
        &self.local
    }

    async fn fetch_artifact(&self, key: &CoordinateKey) -> Result<PathBuf, FetchError> {
        let artifact = key.to_string();

        if let Some(path) = self.local.find(key).await? {
            self.emit(AppEvent::Fetch(FetchEvent::LocalHit {
                artifact,
                path: path.clone(),
            }));
            return Ok(path);
        }

        if self.offline {
            return Err(FetchError::Offline { artifact });
        }

        let destination = self.local.path_for(key);
        let mut last_error = None;
        for base in &self.remotes {
            let url = artifact_url(base, key)?;
            match self.download(&url, &artifact, &destination).await {
                Ok(Some(downloaded)) => {
                    self.emit(AppEvent::Fetch(FetchEvent::DownloadCompleted {
                        artifact,
                        url: url.to_string(),
                        path: destination.clone(),
                        bytes: downloaded.bytes,
                        checksum_verified: downloaded.checksum_verified,
                    }));
                    return Ok(destination);
                }
                Ok(None) => {
                    tracing::debug!(url = %url, "artifact not present in repository");
                }
                Err(e) => {
                    tracing::debug!(url = %url, error = %e, "repository download failed");
                    self.emit(AppEvent::Fetch(FetchEvent::RemoteSkipped {
                        artifact: artifact.clone(),
                        url: url.to_string(),
                        failure: FailureContext::from_error(&e),
                    }));
                    last_error = Some(e);
                }
            }
        }

        Err(last_error.unwrap_or_else(|| FetchError::ArtifactMissing {
            artifact,
            searched: self.searched(),
        }))
    }

    /// Download one URL; `Ok(None)` when the repository does not have it
    async fn download(
        &self,
        url: &Url,
        artifact: &str,
        destination: &Path,
    ) -> Result<Option<Downloaded>, FetchError> {
        let response = self.client.get(url.as_str()).await?;
        if response.status() == StatusCode::NOT_FOUND {
            return Ok(None);
        }
        validate_response(&response)?;

        self.emit(AppEvent::Fetch(FetchEvent::DownloadStarted {
            artifact: artifact.to_string(),
            url: url.to_string(),
            total_size: response.content_length(),
        }));

        let directory = destination.parent().ok_or_else(|| FetchError::Io {
            message: format!("{} has no parent directory", destination.display()),
        })?;
        tokio::fs::create_dir_all(directory).await?;

        let file_name = destination
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        let part = directory.join(format!(".{file_name}.{}.part", uuid::Uuid::new_v4().simple()));

        let result = self.write_and_verify(response, url, artifact, &part).await;
        match result {
            Ok(downloaded) => {
                if let Err(e) = tokio::fs::rename(&part, destination).await {
                    discard(&part).await;
                    return Err(e.into());
                }
                Ok(Some(downloaded))
            }
            Err(e) => {
                discard(&part).await;
                Err(e)
            }
        }
    }

    async fn write_and_verify(
        &self,
        response: reqwest::Response,
        url: &Url,
        artifact: &str,
        part: &Path,
    ) -> Result<Downloaded, FetchError> {
        let mut file = tokio::fs::File::create(part).await?;
        let mut hasher = Sha256::new();
        let mut bytes = 0u64;

        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| FetchError::DownloadFailed(e.to_string()))?;
            hasher.update(&chunk);
            file.write_all(&chunk).await?;
            bytes += chunk.len() as u64;
        }
        file.flush().await?;
        drop(file);

        let actual = hex::encode(hasher.finalize());
        let checksum_verified = match self.published_checksum(url).await {
            Some(expected) => {
                verify_checksum(artifact, &expected, &actual)?;
                true
            }
            None => {
                self.emit(AppEvent::Fetch(FetchEvent::ChecksumUnavailable {
                    artifact: artifact.to_string(),
                    url: url.to_string(),
                }));
                false
            }
        };

        Ok(Downloaded {
            bytes,
            checksum_verified,
        })
    }

    /// The `.sha256` sidecar digest, when the repository serves one
    async fn published_checksum(&self, url: &Url) -> Option<String> {
        let checksum_url = format!("{url}.sha256");
        let response = match self.client.get(&checksum_url).await {
            Ok(response) if response.status().is_success() => response,
            Ok(response) => {
                tracing::debug!(url = %checksum_url, status = %response.status(), "no checksum published");
                return None;
            }
            Err(e) => {
                tracing::debug!(url = %checksum_url, error = %e, "checksum request failed");
                return None;
            }
        };
        let body = response.text().await.ok()?;
        parse_checksum(&body)
    }

    fn searched(&self) -> String {
        let remotes: Vec<&str> = self.remotes.iter().map(Url::as_str).collect();
        format!(
            "local repository {} and remote repositories [{}]",
            self.local.root().display(),
            remotes.join(", ")
        )
    }
}

async fn discard(part: &Path) {
    if let Err(e) = tokio::fs::remove_file(part).await {
        tracing::debug!(path = %part.display(), error = %e, "could not remove partial download");
    }
}

impl EventEmitter for RemoteRepository {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

#[async_trait]
impl ArtifactFetchService for RemoteRepository {
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, FetchError> {
        self.emit(AppEvent::Fetch(FetchEvent::Requested {
            artifact: request.key.to_string(),
            resolution_depth: request.resolution_depth.map(|depth| depth.to_string()),
        }));

        let outcome = self.fetch_artifact(&request.key).await;
        if let Err(e) = &outcome {
            self.emit(AppEvent::Fetch(FetchEvent::Failed {
                artifact: request.key.to_string(),
                failure: FailureContext::from_error(e),
            }));
        }
        outcome
    }
}
