#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Artifact fetching for protoloc
//!
//! The resolvers only see [`ArtifactFetchService`]: hand it a normalized
//! coordinate and it returns a local path holding the artifact. The bundled
//! implementations read a Maven-layout local repository and download missing
//! artifacts from remote repositories with retry and checksum validation.

mod client;
mod layout;
mod local;
mod remote;
mod validation;

pub use client::{NetClient, NetConfig};
pub use layout::{artifact_path, artifact_url, relative_path};
pub use local::LocalRepository;
pub use remote::RemoteRepository;
pub use validation::{parse_checksum, validate_url};

use async_trait::async_trait;
use protoloc_errors::FetchError;
use protoloc_types::{CoordinateKey, ResolutionDepth};
use std::path::PathBuf;

/// What the resolver asks the fetch service for
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchRequest {
    pub key: CoordinateKey,
    /// Forwarded untouched from the coordinate; `None` for standalone binaries
    pub resolution_depth: Option<ResolutionDepth>,
}

impl FetchRequest {
    #[must_use]
    pub fn new(key: CoordinateKey, resolution_depth: Option<ResolutionDepth>) -> Self {
        Self {
            key,
            resolution_depth,
        }
    }
}

/// Materializes repository artifacts on the local filesystem
///
/// Implementations are free to retry internally; callers treat every error
/// as terminal for the attempt.
#[async_trait]
pub trait ArtifactFetchService: Send + Sync {
    /// Return a local path containing the requested artifact
    async fn fetch(&self, request: &FetchRequest) -> Result<PathBuf, FetchError>;
}
