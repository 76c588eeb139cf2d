//! Resolving repository coordinates through a fetch service

use protoloc_errors::ResolutionError;
use protoloc_events::{AppEvent, EventEmitter, EventSender, ResolutionEvent};
use protoloc_fetch::{ArtifactFetchService, FetchRequest};
use protoloc_platform::{ensure_executable, FilesystemOperations, HostPlatform, PlatformEnvironment};
use protoloc_types::{Coordinate, CoordinateKey, ResolvedExecutable};
use std::path::Path;
use std::sync::Arc;

use crate::cache::ResolutionCache;

/// File name suffixes that mark a fetched artifact as an archive
pub const ARCHIVE_SUFFIXES: [&str; 5] = [".zip", ".jar", ".tar", ".tar.gz", ".tgz"];

/// Fetches coordinates, verifies they are a single executable file, and
/// memoizes the result in a [`ResolutionCache`]
#[derive(Clone)]
pub struct CoordinateResolver {
    filesystem: Arc<dyn FilesystemOperations>,
    host: HostPlatform,
    event_sender: Option<EventSender>,
}

impl CoordinateResolver {
    #[must_use]
    pub fn new(filesystem: Arc<dyn FilesystemOperations>, host: HostPlatform) -> Self {
        Self {
            filesystem,
            host,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// The normalized cache key for `coordinate` on this host
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::UnsupportedPlatform` when the coordinate has
    /// no classifier and none is known for the host.
    pub fn key_for(&self, coordinate: &Coordinate) -> Result<CoordinateKey, ResolutionError> {
        let classifier = match &coordinate.classifier {
            Some(classifier) => classifier.clone(),
            None => self.host.classifier()?.to_string(),
        };
        Ok(coordinate.key(classifier))
    }

    /// Resolve `coordinate` to a local executable
    ///
    /// A key already in `cache` is returned without fetching and flagged as
    /// a cache hit. Otherwise the artifact is fetched, its layout checked and
    /// its execute bits set before it is committed to the cache.
    ///
    /// # Errors
    ///
    /// Returns `UnsupportedPlatform`, `FetchFailure`,
    /// `UnexpectedArtifactLayout` or `FileSystem`. Failures are not cached.
    pub async fn resolve(
        &self,
        coordinate: &Coordinate,
        environment: &PlatformEnvironment,
        fetcher: &dyn ArtifactFetchService,
        cache: &ResolutionCache,
    ) -> Result<ResolvedExecutable, ResolutionError> {
        let key = self.key_for(coordinate)?;

        let (resolved, cache_hit) = cache
            .get_or_try_init(&key, || {
                self.fetch_and_prepare(coordinate, &key, environment, fetcher)
            })
            .await?;

        if cache_hit {
            tracing::debug!(coordinate = %key, "coordinate served from cache");
            self.emit(AppEvent::Resolution(ResolutionEvent::CacheHit {
                coordinate: key.to_string(),
                path: resolved.path().to_path_buf(),
            }));
            return Ok(resolved.as_cache_hit());
        }
        Ok(resolved)
    }

    async fn fetch_and_prepare(
        &self,
        coordinate: &Coordinate,
        key: &CoordinateKey,
        environment: &PlatformEnvironment,
        fetcher: &dyn ArtifactFetchService,
    ) -> Result<ResolvedExecutable, ResolutionError> {
        let request = FetchRequest::new(key.clone(), coordinate.resolution_depth());
        let path = fetcher
            .fetch(&request)
            .await
            .map_err(|cause| ResolutionError::FetchFailure {
                coordinate: key.to_string(),
                cause,
            })?;

        self.verify_layout(key, &path).await?;

        if !environment.is_windows() {
            if let Some(change) = ensure_executable(self.filesystem.as_ref(), &path).await? {
                self.emit(AppEvent::Resolution(ResolutionEvent::PermissionsNormalized {
                    path: path.clone(),
                    mode_before: change.before,
                    mode_after: change.after,
                }));
            }
        }

        Ok(ResolvedExecutable::coordinate(path, false))
    }

    async fn verify_layout(&self, key: &CoordinateKey, path: &Path) -> Result<(), ResolutionError> {
        let layout_error = |reason: &str| ResolutionError::UnexpectedArtifactLayout {
            coordinate: key.to_string(),
            path: path.to_path_buf(),
            reason: reason.to_string(),
        };

        let Some(metadata) = self.filesystem.metadata(path).await? else {
            return Err(layout_error("fetched path does not exist"));
        };
        if metadata.is_dir {
            return Err(layout_error("fetched path is a directory"));
        }
        if !metadata.is_file {
            return Err(layout_error("fetched path is not a regular file"));
        }
        if is_archive(path) {
            return Err(layout_error("fetched artifact is an archive"));
        }
        Ok(())
    }
}

fn is_archive(path: &Path) -> bool {
    let Some(file_name) = path.file_name() else {
        return false;
    };
    let file_name = file_name.to_string_lossy().to_ascii_lowercase();
    ARCHIVE_SUFFIXES
        .iter()
        .any(|suffix| file_name.ends_with(suffix))
}

impl EventEmitter for CoordinateResolver {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn archive_suffixes_are_case_insensitive() {
        assert!(is_archive(Path::new("/repo/protoc-3.25.1.zip")));
        assert!(is_archive(Path::new("/repo/protoc-3.25.1.TAR.GZ")));
        assert!(is_archive(Path::new("/repo/plugin.tgz")));
        assert!(!is_archive(Path::new("/repo/protoc-3.25.1-linux-x86_64.exe")));
        assert!(!is_archive(Path::new("/repo/protoc-gen-grpc")));
    }

    #[test]
    fn pinned_classifier_bypasses_host() {
        let resolver = CoordinateResolver::new(
            Arc::new(protoloc_platform::NativeFilesystem::new()),
            HostPlatform::new("plan9", "mips"),
        );
        let pinned = Coordinate::new("com.google.protobuf", "protoc", "3.25.1")
            .with_classifier("linux-x86_64");
        let key = resolver.key_for(&pinned).unwrap();
        assert_eq!(key.classifier, "linux-x86_64");

        let err = resolver
            .key_for(&Coordinate::new("com.google.protobuf", "protoc", "3.25.1"))
            .unwrap_err();
        assert_eq!(err.kind(), "unsupported_platform");
    }
}
