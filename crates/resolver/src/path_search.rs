//! Locating an executable by name on the search path

use protoloc_errors::ResolutionError;
use protoloc_events::{AppEvent, EventEmitter, EventSender, ResolutionEvent};
use protoloc_platform::{satisfies_executability, FilesystemOperations, PlatformEnvironment};
use protoloc_types::ResolvedExecutable;
use std::path::{Path, PathBuf};
use std::sync::Arc;

/// Searches the directories of a [`PlatformEnvironment`] for a named executable
#[derive(Clone)]
pub struct PathSearchResolver {
    filesystem: Arc<dyn FilesystemOperations>,
    event_sender: Option<EventSender>,
}

impl PathSearchResolver {
    #[must_use]
    pub fn new(filesystem: Arc<dyn FilesystemOperations>) -> Self {
        Self {
            filesystem,
            event_sender: None,
        }
    }

    #[must_use]
    pub fn with_event_sender(mut self, sender: EventSender) -> Self {
        self.event_sender = Some(sender);
        self
    }

    /// Find the first executable called `name` on the search path
    ///
    /// Directories are visited in order and the first one holding a matching
    /// executable wins. Missing directories and search entries that are not
    /// directories are passed over.
    ///
    /// # Errors
    ///
    /// Returns `ResolutionError::FileSystem` as soon as an existing directory
    /// or candidate cannot be inspected, and `ResolutionError::NotFound` when
    /// every directory was searched without a match.
    pub async fn resolve(
        &self,
        name: &str,
        environment: &PlatformEnvironment,
    ) -> Result<ResolvedExecutable, ResolutionError> {
        let directories = environment.search_directories();

        for directory in directories {
            match self.filesystem.metadata(directory).await? {
                None => {
                    self.skip(directory, "does not exist");
                    continue;
                }
                Some(metadata) if !metadata.is_dir => {
                    self.skip(directory, "not a directory");
                    continue;
                }
                Some(_) => {}
            }

            if let Some(found) = self.search_directory(directory, name, environment).await? {
                tracing::debug!(name, path = %found.display(), "found executable on search path");
                return Ok(ResolvedExecutable::path_search(found));
            }
        }

        Err(ResolutionError::not_found_on_path(name, directories.len()))
    }

    async fn search_directory(
        &self,
        directory: &Path,
        name: &str,
        environment: &PlatformEnvironment,
    ) -> Result<Option<PathBuf>, ResolutionError> {
        let entries = self.filesystem.read_dir(directory).await?;

        for entry in entries {
            let Some(file_name) = entry.to_str() else {
                tracing::trace!(directory = %directory.display(), "skipping non UTF-8 entry");
                continue;
            };
            if !environment.name_extensions().matches(file_name, name) {
                continue;
            }

            let candidate = directory.join(file_name);
            match self.filesystem.metadata(&candidate).await? {
                Some(metadata) if satisfies_executability(environment, &metadata) => {
                    return Ok(Some(candidate));
                }
                Some(_) => {
                    tracing::debug!(path = %candidate.display(), "candidate is not executable");
                }
                None => {
                    tracing::debug!(path = %candidate.display(), "candidate disappeared or dangles");
                }
            }
        }

        Ok(None)
    }

    fn skip(&self, directory: &Path, reason: &str) {
        tracing::debug!(directory = %directory.display(), reason, "skipping search directory");
        self.emit(AppEvent::Resolution(ResolutionEvent::DirectorySkipped {
            directory: directory.to_path_buf(),
            reason: reason.to_string(),
        }));
    }
}

impl EventEmitter for PathSearchResolver {
    fn event_sender(&self) -> Option<&EventSender> {
        self.event_sender.as_ref()
    }
}
