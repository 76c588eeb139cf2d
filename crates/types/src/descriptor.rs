//! Compiler and plugin descriptors consumed from build configuration

use crate::{Coordinate, ExecutableSpecification, ResolutionDepth};
use serde::{Deserialize, Serialize};

/// Maven group publishing the `protoc` binaries
pub const PROTOC_GROUP: &str = "com.google.protobuf";
/// Artifact id of the `protoc` binaries
pub const PROTOC_ARTIFACT: &str = "protoc";
/// Logical executable name used for path search
pub const PROTOC_EXECUTABLE: &str = "protoc";
/// Version string meaning "use the protoc found on the search path"
pub const PATH_VERSION: &str = "PATH";

/// Where the compiler comes from
///
/// The compiler is always a standalone binary, so no resolution depth can
/// be attached to it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompilerDescriptor {
    specification: ExecutableSpecification,
}

impl CompilerDescriptor {
    /// Fetch the compiler from a repository coordinate
    #[must_use]
    pub fn from_coordinate(coordinate: Coordinate) -> Self {
        Self {
            specification: ExecutableSpecification::Coordinate(
                coordinate.without_resolution_depth(),
            ),
        }
    }

    /// Use a compiler at a known location
    pub fn from_path(path: impl Into<std::path::PathBuf>) -> Self {
        Self {
            specification: ExecutableSpecification::explicit(path),
        }
    }

    /// Search the host path for `name`
    pub fn search(name: impl Into<String>) -> Self {
        Self {
            specification: ExecutableSpecification::path_search(name),
        }
    }

    /// Interpret a `protoc` version string
    ///
    /// `PATH` (any case) selects the `protoc` on the search path; anything
    /// else is the version of `com.google.protobuf:protoc`.
    #[must_use]
    pub fn from_version(version: &str) -> Self {
        let version = version.trim();
        if version.eq_ignore_ascii_case(PATH_VERSION) {
            Self::search(PROTOC_EXECUTABLE)
        } else {
            Self::from_coordinate(Coordinate::new(PROTOC_GROUP, PROTOC_ARTIFACT, version))
        }
    }

    #[must_use]
    pub fn specification(&self) -> &ExecutableSpecification {
        &self.specification
    }
}

/// A code-generation plugin
///
/// Single-binary plugins have their resolution depth forced to none.
/// Plugins that also carry library dependencies may choose a depth, which
/// is forwarded to the fetch service.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    name: String,
    specification: ExecutableSpecification,
}

impl PluginDescriptor {
    /// A standalone plugin executable
    pub fn binary(name: impl Into<String>, specification: ExecutableSpecification) -> Self {
        let specification = match specification {
            ExecutableSpecification::Coordinate(coordinate) => {
                ExecutableSpecification::Coordinate(coordinate.without_resolution_depth())
            }
            other => other,
        };
        Self {
            name: name.into(),
            specification,
        }
    }

    /// A plugin fetched together with its library dependencies
    pub fn with_libraries(
        name: impl Into<String>,
        coordinate: Coordinate,
        resolution_depth: Option<ResolutionDepth>,
    ) -> Self {
        Self {
            name: name.into(),
            specification: ExecutableSpecification::Coordinate(
                coordinate.with_resolution_depth(resolution_depth),
            ),
        }
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub fn specification(&self) -> &ExecutableSpecification {
        &self.specification
    }

    #[must_use]
    pub fn resolution_depth(&self) -> Option<ResolutionDepth> {
        match &self.specification {
            ExecutableSpecification::Coordinate(coordinate) => coordinate.resolution_depth(),
            _ => None,
        }
    }
}

/// Everything one code-generation step needs resolved
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ToolchainDescriptors {
    pub compiler: CompilerDescriptor,
    #[serde(default)]
    pub plugins: Vec<PluginDescriptor>,
}

impl ToolchainDescriptors {
    #[must_use]
    pub fn new(compiler: CompilerDescriptor) -> Self {
        Self {
            compiler,
            plugins: Vec::new(),
        }
    }

    #[must_use]
    pub fn with_plugin(mut self, plugin: PluginDescriptor) -> Self {
        self.plugins.push(plugin);
        self
    }
}
