//! Executable specifications and resolution outcomes

use crate::Coordinate;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};

/// What the caller needs resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ExecutableSpecification {
    /// A literal path, verified but never searched for
    Explicit { path: PathBuf },
    /// A bare name looked up on the host search path
    PathSearch { name: String },
    /// An artifact fetched from a repository
    Coordinate(Coordinate),
}

impl ExecutableSpecification {
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self::Explicit { path: path.into() }
    }

    pub fn path_search(name: impl Into<String>) -> Self {
        Self::PathSearch { name: name.into() }
    }

    #[must_use]
    pub fn coordinate(coordinate: Coordinate) -> Self {
        Self::Coordinate(coordinate)
    }

    /// Strategy that will handle this specification
    #[must_use]
    pub fn strategy(&self) -> ResolutionStrategy {
        match self {
            Self::Explicit { .. } => ResolutionStrategy::Explicit,
            Self::PathSearch { .. } => ResolutionStrategy::PathSearch,
            Self::Coordinate(_) => ResolutionStrategy::Coordinate,
        }
    }
}

impl fmt::Display for ExecutableSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit { path } => write!(f, "path {}", path.display()),
            Self::PathSearch { name } => write!(f, "{name} on the search path"),
            Self::Coordinate(coordinate) => write!(f, "artifact {coordinate}"),
        }
    }
}

/// Which resolver produced a [`ResolvedExecutable`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolutionStrategy {
    Explicit,
    PathSearch,
    Coordinate,
}

impl fmt::Display for ResolutionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Explicit => write!(f, "explicit"),
            Self::PathSearch => write!(f, "path_search"),
            Self::Coordinate => write!(f, "coordinate"),
        }
    }
}

/// A verified, executable path
///
/// Immutable once constructed. `cache_hit` is only present for coordinate
/// resolution.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedExecutable {
    path: PathBuf,
    source_strategy: ResolutionStrategy,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    cache_hit: Option<bool>,
}

impl ResolvedExecutable {
    pub fn explicit(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_strategy: ResolutionStrategy::Explicit,
            cache_hit: None,
        }
    }

    pub fn path_search(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            source_strategy: ResolutionStrategy::PathSearch,
            cache_hit: None,
        }
    }

    pub fn coordinate(path: impl Into<PathBuf>, cache_hit: bool) -> Self {
        Self {
            path: path.into(),
            source_strategy: ResolutionStrategy::Coordinate,
            cache_hit: Some(cache_hit),
        }
    }

    /// Same executable, reported as served from the cache
    #[must_use]
    pub fn as_cache_hit(&self) -> Self {
        Self {
            path: self.path.clone(),
            source_strategy: self.source_strategy,
            cache_hit: Some(true),
        }
    }

    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    #[must_use]
    pub fn source_strategy(&self) -> ResolutionStrategy {
        self.source_strategy
    }

    #[must_use]
    pub fn cache_hit(&self) -> Option<bool> {
        self.cache_hit
    }

    #[must_use]
    pub fn into_path(self) -> PathBuf {
        self.path
    }
}
