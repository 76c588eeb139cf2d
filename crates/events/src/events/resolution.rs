use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use super::FailureContext;
use protoloc_types::ResolutionStrategy;

/// Events emitted while turning a specification into an executable path
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ResolutionEvent {
    /// A single specification is being resolved
    Started {
        specification: String,
        strategy: ResolutionStrategy,
    },

    /// A search directory was passed over without being listed
    DirectorySkipped { directory: PathBuf, reason: String },

    /// A coordinate was served from the in-process cache
    CacheHit { coordinate: String, path: PathBuf },

    /// Execute bits were added to a fetched artifact
    PermissionsNormalized {
        path: PathBuf,
        mode_before: u32,
        mode_after: u32,
    },

    /// Resolution produced an executable
    Completed {
        specification: String,
        strategy: ResolutionStrategy,
        path: PathBuf,
        cache_hit: Option<bool>,
        duration_ms: u64,
    },

    /// Resolution failed terminally
    Failed {
        specification: String,
        strategy: ResolutionStrategy,
        failure: FailureContext,
    },

    /// A compiler plus plugins are being resolved together
    ToolchainStarted { plugins: usize, concurrency: usize },

    /// Every descriptor of a toolchain has an outcome
    ToolchainCompleted {
        succeeded: usize,
        failed: usize,
        duration_ms: u64,
    },
}
