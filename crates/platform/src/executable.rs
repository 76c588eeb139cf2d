//! Executability rules and permission normalization

use protoloc_errors::PlatformError;
use std::path::Path;

use crate::environment::PlatformEnvironment;
use crate::filesystem::{FileMetadata, FilesystemOperations};

/// Owner, group and other execute bits
pub const EXECUTE_BITS: u32 = 0o111;

/// Permission bits before and after normalization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ModeChange {
    pub before: u32,
    pub after: u32,
}

/// Whether an entry whose name already matched counts as executable
///
/// Windows: any non-directory (the matched extension is the proof).
/// POSIX: a regular file with at least one execute bit. Hosts that report
/// no mode cannot express "not executable" and accept any regular file.
#[must_use]
pub fn satisfies_executability(environment: &PlatformEnvironment, metadata: &FileMetadata) -> bool {
    if environment.is_windows() {
        !metadata.is_dir
    } else {
        metadata.is_file && metadata.mode.is_none_or(|mode| mode & EXECUTE_BITS != 0)
    }
}

/// Add every execute bit to `path` when one is missing
///
/// Returns the change made, or `None` when the file was already fully
/// executable or the host has no permission bits.
///
/// # Errors
///
/// Returns an error if the file cannot be inspected or its permissions
/// cannot be changed.
pub async fn ensure_executable(
    filesystem: &dyn FilesystemOperations,
    path: &Path,
) -> Result<Option<ModeChange>, PlatformError> {
    let metadata = filesystem.metadata(path).await?.ok_or_else(|| {
        PlatformError::filesystem(
            "set_permissions",
            path,
            &std::io::Error::from(std::io::ErrorKind::NotFound),
        )
    })?;

    let Some(before) = metadata.mode else {
        return Ok(None);
    };
    let after = before | EXECUTE_BITS;
    if after == before {
        return Ok(None);
    }

    filesystem.set_mode(path, after).await?;
    tracing::debug!(
        path = %path.display(),
        before = format_args!("{before:o}"),
        after = format_args!("{after:o}"),
        "added execute permission"
    );
    Ok(Some(ModeChange { before, after }))
}
