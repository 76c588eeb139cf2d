#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Core type definitions for protoloc
//!
//! This crate provides the data model shared by every resolver:
//! executable specifications, repository coordinates, resolution outcomes,
//! and the compiler/plugin descriptors read from build configuration.

pub mod coordinate;
pub mod descriptor;
pub mod specification;

// Re-export commonly used types
pub use coordinate::{Coordinate, CoordinateKey, ResolutionDepth, DEFAULT_EXTENSION};
pub use descriptor::{
    CompilerDescriptor, PluginDescriptor, ToolchainDescriptors, PATH_VERSION, PROTOC_ARTIFACT,
    PROTOC_EXECUTABLE, PROTOC_GROUP,
};
pub use specification::{ExecutableSpecification, ResolutionStrategy, ResolvedExecutable};

use serde::{Deserialize, Serialize};

/// Output format for CLI
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Plain text output
    #[default]
    Plain,
    /// JSON output
    Json,
}
