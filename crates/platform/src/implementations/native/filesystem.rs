//! Native filesystem operations over `tokio::fs`

use async_trait::async_trait;
use protoloc_errors::PlatformError;
use std::ffi::OsString;
use std::io::ErrorKind;
use std::path::Path;
use tokio::fs;

use crate::filesystem::{FileMetadata, FilesystemOperations};

/// Host filesystem implementation
#[derive(Debug, Clone, Copy, Default)]
pub struct NativeFilesystem;

impl NativeFilesystem {
    #[must_use]
    pub fn new() -> Self {
        Self
    }
}

#[cfg(unix)]
fn mode_of(metadata: &std::fs::Metadata) -> Option<u32> {
    use std::os::unix::fs::PermissionsExt;
    Some(metadata.permissions().mode() & 0o7777)
}

#[cfg(not(unix))]
fn mode_of(_metadata: &std::fs::Metadata) -> Option<u32> {
    None
}

#[async_trait]
impl FilesystemOperations for NativeFilesystem {
    async fn metadata(&self, path: &Path) -> Result<Option<FileMetadata>, PlatformError> {
        match fs::metadata(path).await {
            Ok(metadata) => Ok(Some(FileMetadata {
                is_file: metadata.is_file(),
                is_dir: metadata.is_dir(),
                mode: mode_of(&metadata),
            })),
            // A dangling symlink or a file used as a parent directory
            Err(e) if matches!(e.kind(), ErrorKind::NotFound | ErrorKind::NotADirectory) => {
                Ok(None)
            }
            Err(e) => Err(PlatformError::filesystem("metadata", path, &e)),
        }
    }

    async fn read_dir(&self, path: &Path) -> Result<Vec<OsString>, PlatformError> {
        let mut entries = fs::read_dir(path)
            .await
            .map_err(|e| PlatformError::filesystem("read_dir", path, &e))?;

        let mut names = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| PlatformError::filesystem("read_dir", path, &e))?
        {
            names.push(entry.file_name());
        }
        Ok(names)
    }

    #[cfg(unix)]
    async fn set_mode(&self, path: &Path, mode: u32) -> Result<(), PlatformError> {
        use std::os::unix::fs::PermissionsExt;
        fs::set_permissions(path, std::fs::Permissions::from_mode(mode))
            .await
            .map_err(|e| PlatformError::filesystem("set_permissions", path, &e))
    }

    #[cfg(not(unix))]
    async fn set_mode(&self, _path: &Path, _mode: u32) -> Result<(), PlatformError> {
        Ok(())
    }
}
