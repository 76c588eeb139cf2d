//! Filesystem operations used while resolving executables

use async_trait::async_trait;
use protoloc_errors::PlatformError;
use std::ffi::OsString;
use std::path::Path;

/// The subset of `stat` the resolvers care about
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FileMetadata {
    pub is_file: bool,
    pub is_dir: bool,
    /// Permission bits; `None` on hosts without a POSIX mode
    pub mode: Option<u32>,
}

impl FileMetadata {
    /// Regular file with the given permission bits
    #[must_use]
    pub fn file(mode: Option<u32>) -> Self {
        Self {
            is_file: true,
            is_dir: false,
            mode,
        }
    }

    #[must_use]
    pub fn directory() -> Self {
        Self {
            is_file: false,
            is_dir: true,
            mode: None,
        }
    }
}

/// Trait for filesystem access performed during resolution
///
/// Implementations must follow symbolic links when reading metadata and
/// report a missing path as `Ok(None)` rather than an error.
#[async_trait]
pub trait FilesystemOperations: Send + Sync {
    /// Stat `path`, following symlinks; `None` if nothing exists there
    async fn metadata(&self, path: &Path) -> Result<Option<FileMetadata>, PlatformError>;

    /// List the entry names of a directory in filesystem order
    async fn read_dir(&self, path: &Path) -> Result<Vec<OsString>, PlatformError>;

    /// Replace the permission bits of `path`
    async fn set_mode(&self, path: &Path, mode: u32) -> Result<(), PlatformError>;
}
