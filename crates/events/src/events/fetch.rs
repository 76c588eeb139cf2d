use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;

/// Artifact fetch events for the event system
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum FetchEvent {
    /// The fetch service was asked for an artifact
    Requested {
        artifact: String,
        resolution_depth: Option<String>,
    },

    /// The artifact already existed in the local repository
    LocalHit { artifact: String, path: PathBuf },

    /// Download from a remote repository started
    DownloadStarted {
        artifact: String,
        url: String,
        total_size: Option<u64>,
    },

    /// Download retrying after a transient failure
    DownloadRetrying {
        url: String,
        attempt: u32,
        max_attempts: u32,
        reason: String,
    },

    /// A remote repository failed for a reason other than not having the
    /// artifact; the next remote is tried
    RemoteSkipped {
        artifact: String,
        url: String,
        failure: FailureContext,
    },

    /// Download finished and the file was moved into the local repository
    DownloadCompleted {
        artifact: String,
        url: String,
        path: PathBuf,
        bytes: u64,
        checksum_verified: bool,
    },

    /// The repository published no checksum for the artifact
    ChecksumUnavailable { artifact: String, url: String },

    /// The artifact could not be materialized
    Failed {
        artifact: String,
        failure: FailureContext,
    },
}
