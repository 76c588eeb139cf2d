//! Maven repository layout

use protoloc_errors::FetchError;
use protoloc_types::CoordinateKey;
use std::path::{Path, PathBuf};
use url::Url;

/// `<group as dirs>/<artifact>/<version>/<file name>`, `/`-separated
#[must_use]
pub fn relative_path(key: &CoordinateKey) -> String {
    format!(
        "{}/{}/{}/{}",
        key.group.replace('.', "/"),
        key.artifact,
        key.version,
        key.file_name()
    )
}

/// Location of an artifact under a local repository root
#[must_use]
pub fn artifact_path(root: &Path, key: &CoordinateKey) -> PathBuf {
    let mut path = root.to_path_buf();
    path.extend(key.group.split('.'));
    path.push(&key.artifact);
    path.push(&key.version);
    path.push(key.file_name());
    path
}

/// Location of an artifact under a remote repository base URL
///
/// # Errors
///
/// Returns `FetchError::InvalidUrl` if the joined URL cannot be parsed.
pub fn artifact_url(base: &Url, key: &CoordinateKey) -> Result<Url, FetchError> {
    // Url::join drops the last path segment unless the base ends with '/'
    let mut base = base.clone();
    if !base.path().ends_with('/') {
        let path = format!("{}/", base.path());
        base.set_path(&path);
    }
    base.join(&relative_path(key))
        .map_err(|e| FetchError::InvalidUrl(e.to_string()))
}
