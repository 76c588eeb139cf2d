//! Repository coordinate type definitions

use protoloc_errors::ConfigError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Artifact type used when a coordinate does not name one
pub const DEFAULT_EXTENSION: &str = "exe";

/// How many levels of an artifact's own dependency graph a fetch pulls in
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResolutionDepth {
    /// Only the artifact's direct dependencies
    Direct,
    /// The full transitive closure
    Transitive,
}

impl fmt::Display for ResolutionDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Direct => write!(f, "direct"),
            Self::Transitive => write!(f, "transitive"),
        }
    }
}

impl FromStr for ResolutionDepth {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "direct" => Ok(Self::Direct),
            "transitive" => Ok(Self::Transitive),
            _ => Err(ConfigError::InvalidValue {
                field: "resolution_depth".to_string(),
                value: s.to_string(),
            }),
        }
    }
}

/// A repository-resolvable artifact
///
/// The classifier is optional and is derived from the host platform when
/// absent. The resolution depth is not settable through this type: a
/// standalone executable has no meaningful transitive depth, so it is only
/// populated by [`crate::PluginDescriptor::with_libraries`].
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Coordinate {
    pub group: String,
    pub artifact: String,
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub classifier: Option<String>,
    #[serde(default = "default_extension")]
    pub extension: String,
    #[serde(skip)]
    resolution_depth: Option<ResolutionDepth>,
}

fn default_extension() -> String {
    DEFAULT_EXTENSION.to_string()
}

impl Coordinate {
    /// Create a coordinate with the default `exe` extension and no classifier
    pub fn new(
        group: impl Into<String>,
        artifact: impl Into<String>,
        version: impl Into<String>,
    ) -> Self {
        Self {
            group: group.into(),
            artifact: artifact.into(),
            version: version.into(),
            classifier: None,
            extension: default_extension(),
            resolution_depth: None,
        }
    }

    /// Pin the classifier instead of deriving it from the host
    #[must_use]
    pub fn with_classifier(mut self, classifier: impl Into<String>) -> Self {
        self.classifier = Some(classifier.into());
        self
    }

    /// Override the artifact type (file extension)
    #[must_use]
    pub fn with_extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = extension.into();
        self
    }

    pub(crate) fn with_resolution_depth(mut self, depth: Option<ResolutionDepth>) -> Self {
        self.resolution_depth = depth;
        self
    }

    pub(crate) fn without_resolution_depth(mut self) -> Self {
        self.resolution_depth = None;
        self
    }

    /// Transitive depth forwarded to the fetch service, if any
    #[must_use]
    pub fn resolution_depth(&self) -> Option<ResolutionDepth> {
        self.resolution_depth
    }

    /// Build the normalized cache key using `classifier` for the platform slot
    #[must_use]
    pub fn key(&self, classifier: impl Into<String>) -> CoordinateKey {
        CoordinateKey {
            group: self.group.clone(),
            artifact: self.artifact.clone(),
            version: self.version.clone(),
            classifier: classifier.into(),
            extension: self.extension.clone(),
        }
    }
}

impl fmt::Display for Coordinate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.extension)?;
        if let Some(classifier) = &self.classifier {
            write!(f, ":{classifier}")?;
        }
        write!(f, ":{}", self.version)
    }
}

/// Parses `group:artifact:version`, `group:artifact:extension:version` or
/// `group:artifact:extension:classifier:version`.
impl FromStr for Coordinate {
    type Err = ConfigError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let parts: Vec<&str> = s.trim().split(':').collect();
        if parts.iter().any(|part| part.trim().is_empty()) {
            return Err(invalid_coordinate(s));
        }

        match parts.as_slice() {
            [group, artifact, version] => Ok(Self::new(*group, *artifact, *version)),
            [group, artifact, extension, version] => {
                Ok(Self::new(*group, *artifact, *version).with_extension(*extension))
            }
            [group, artifact, extension, classifier, version] => {
                Ok(Self::new(*group, *artifact, *version)
                    .with_extension(*extension)
                    .with_classifier(*classifier))
            }
            _ => Err(invalid_coordinate(s)),
        }
    }
}

fn invalid_coordinate(input: &str) -> ConfigError {
    ConfigError::InvalidValue {
        field: "coordinate".to_string(),
        value: input.to_string(),
    }
}

/// Normalized identity of a fetched artifact, classifier already resolved
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CoordinateKey {
    pub group: String,
    pub artifact: String,
    pub version: String,
    pub classifier: String,
    pub extension: String,
}

impl CoordinateKey {
    /// File name of the artifact in a Maven-layout repository
    #[must_use]
    pub fn file_name(&self) -> String {
        if self.classifier.is_empty() {
            format!("{}-{}.{}", self.artifact, self.version, self.extension)
        } else {
            format!(
                "{}-{}-{}.{}",
                self.artifact, self.version, self.classifier, self.extension
            )
        }
    }
}

impl fmt::Display for CoordinateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}:{}", self.group, self.artifact, self.extension)?;
        if !self.classifier.is_empty() {
            write!(f, ":{}", self.classifier)?;
        }
        write!(f, ":{}", self.version)
    }
}
