//! Toolchain descriptor file
//!
//! ```toml
//! [compiler]
//! version = "3.25.1"          # or "PATH", or one of path / search / coordinate
//!
//! [[plugins]]
//! name = "grpc-java"
//! kind = "binary"
//! coordinate = "io.grpc:protoc-gen-grpc-java:1.62.2"
//!
//! [[plugins]]
//! name = "reactor"
//! kind = "with-libraries"
//! coordinate = "com.salesforce.servicelibs:reactor-grpc:1.2.4"
//! resolution_depth = "transitive"
//! ```

use protoloc_errors::{ConfigError, Error};
use protoloc_types::{
    CompilerDescriptor, Coordinate, ExecutableSpecification, PluginDescriptor, ResolutionDepth,
    ToolchainDescriptors,
};
use serde::Deserialize;
use std::path::{Path, PathBuf};

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawDescriptors {
    compiler: RawSource,
    #[serde(default)]
    plugins: Vec<RawPlugin>,
}

/// Where an executable comes from; exactly one field must be set
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawSource {
    version: Option<String>,
    path: Option<PathBuf>,
    search: Option<String>,
    coordinate: Option<String>,
    classifier: Option<String>,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "kebab-case")]
enum PluginKind {
    #[default]
    Binary,
    WithLibraries,
}

#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct RawPlugin {
    name: String,
    #[serde(default)]
    kind: PluginKind,
    path: Option<PathBuf>,
    search: Option<String>,
    coordinate: Option<String>,
    classifier: Option<String>,
    resolution_depth: Option<ResolutionDepth>,
}

/// Read and parse a descriptor file
///
/// # Errors
///
/// Returns an error if the file cannot be read or does not describe a valid
/// toolchain.
pub async fn load_descriptors(path: &Path) -> Result<ToolchainDescriptors, Error> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .map_err(|_| ConfigError::NotFound {
            path: path.display().to_string(),
        })?;
    parse_descriptors(&contents).map_err(Into::into)
}

/// Parse descriptor TOML
///
/// # Errors
///
/// Returns a parse error for malformed TOML and an invalid-value error when
/// a source is ambiguous, missing, or a binary plugin sets a resolution depth.
pub fn parse_descriptors(contents: &str) -> Result<ToolchainDescriptors, ConfigError> {
    let raw: RawDescriptors = toml::from_str(contents).map_err(|e| ConfigError::ParseError {
        message: e.to_string(),
    })?;

    let compiler = compiler_descriptor(raw.compiler)?;
    let mut descriptors = ToolchainDescriptors::new(compiler);
    for plugin in raw.plugins {
        descriptors = descriptors.with_plugin(plugin_descriptor(plugin)?);
    }
    Ok(descriptors)
}

fn compiler_descriptor(raw: RawSource) -> Result<CompilerDescriptor, ConfigError> {
    match (raw.version, raw.path, raw.search, raw.coordinate) {
        (Some(version), None, None, None) => {
            let descriptor = CompilerDescriptor::from_version(&version);
            let coordinate = match descriptor.specification() {
                ExecutableSpecification::Coordinate(coordinate) => Some(coordinate.clone()),
                _ => None,
            };
            match (coordinate, raw.classifier) {
                (Some(coordinate), Some(classifier)) => Ok(CompilerDescriptor::from_coordinate(
                    coordinate.with_classifier(classifier),
                )),
                (None, classifier) => {
                    reject_classifier("compiler.classifier", classifier)?;
                    Ok(descriptor)
                }
                (Some(_), None) => Ok(descriptor),
            }
        }
        (None, Some(path), None, None) => {
            reject_classifier("compiler.classifier", raw.classifier)?;
            Ok(CompilerDescriptor::from_path(path))
        }
        (None, None, Some(name), None) => {
            reject_classifier("compiler.classifier", raw.classifier)?;
            Ok(CompilerDescriptor::search(name))
        }
        (None, None, None, Some(coordinate)) => Ok(CompilerDescriptor::from_coordinate(
            parse_coordinate(&coordinate, raw.classifier)?,
        )),
        _ => Err(ConfigError::Invalid {
            message: "compiler needs exactly one of version, path, search, coordinate".to_string(),
        }),
    }
}

/// A classifier only selects an artifact; it means nothing for a path or search source
fn reject_classifier(field: &str, classifier: Option<String>) -> Result<(), ConfigError> {
    match classifier {
        Some(value) => Err(ConfigError::InvalidValue {
            field: field.to_string(),
            value,
        }),
        None => Ok(()),
    }
}

fn plugin_descriptor(raw: RawPlugin) -> Result<PluginDescriptor, ConfigError> {
    let field = |name: &str| format!("plugins.{}.{name}", raw.name);

    match raw.kind {
        PluginKind::Binary => {
            if let Some(depth) = raw.resolution_depth {
                return Err(ConfigError::InvalidValue {
                    field: field("resolution_depth"),
                    value: depth.to_string(),
                });
            }
            let specification = match (raw.path, raw.search, raw.coordinate) {
                (Some(path), None, None) => {
                    reject_classifier(&field("classifier"), raw.classifier)?;
                    ExecutableSpecification::explicit(path)
                }
                (None, Some(name), None) => {
                    reject_classifier(&field("classifier"), raw.classifier)?;
                    ExecutableSpecification::path_search(name)
                }
                (None, None, Some(coordinate)) => ExecutableSpecification::coordinate(
                    parse_coordinate(&coordinate, raw.classifier)?,
                ),
                _ => {
                    return Err(ConfigError::Invalid {
                        message: format!(
                            "plugin {} needs exactly one of path, search, coordinate",
                            raw.name
                        ),
                    })
                }
            };
            Ok(PluginDescriptor::binary(raw.name, specification))
        }
        PluginKind::WithLibraries => {
            if raw.path.is_some() || raw.search.is_some() {
                return Err(ConfigError::Invalid {
                    message: format!(
                        "plugin {} with libraries can only be fetched from a coordinate",
                        raw.name
                    ),
                });
            }
            let coordinate = raw.coordinate.ok_or_else(|| ConfigError::MissingField {
                field: field("coordinate"),
            })?;
            let coordinate = parse_coordinate(&coordinate, raw.classifier)?;
            Ok(PluginDescriptor::with_libraries(
                raw.name,
                coordinate,
                raw.resolution_depth,
            ))
        }
    }
}

fn parse_coordinate(input: &str, classifier: Option<String>) -> Result<Coordinate, ConfigError> {
    let coordinate: Coordinate = input.parse()?;
    Ok(match classifier {
        Some(classifier) => coordinate.with_classifier(classifier),
        None => coordinate,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compiler_version_path_keyword() {
        let descriptors = parse_descriptors("[compiler]\nversion = \"PATH\"\n").unwrap();
        assert_eq!(
            descriptors.compiler.specification(),
            &ExecutableSpecification::path_search("protoc")
        );
        assert!(descriptors.plugins.is_empty());
    }

    #[test]
    fn test_compiler_requires_single_source() {
        let err = parse_descriptors("[compiler]\nversion = \"3.25.1\"\nsearch = \"protoc\"\n")
            .unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));

        let err = parse_descriptors("[compiler]\n").unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { .. }));
    }

    #[test]
    fn test_classifier_without_coordinate_is_rejected() {
        for source in [
            "version = \"PATH\"",
            "path = \"/opt/protoc/bin/protoc\"",
            "search = \"protoc\"",
        ] {
            let err = parse_descriptors(&format!(
                "[compiler]\n{source}\nclassifier = \"linux-x86_64\"\n"
            ))
            .unwrap_err();
            match err {
                ConfigError::InvalidValue { field, value } => {
                    assert_eq!(field, "compiler.classifier");
                    assert_eq!(value, "linux-x86_64");
                }
                other => panic!("unexpected error for {source}: {other:?}"),
            }
        }

        let err = parse_descriptors(
            "[compiler]\nversion = \"PATH\"\n[[plugins]]\nname = \"grpc\"\nsearch = \"protoc-gen-grpc\"\nclassifier = \"osx-aarch_64\"\n",
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::InvalidValue { ref field, .. } if field == "plugins.grpc.classifier"
        ));
    }

    #[test]
    fn test_classifier_pins_versioned_compiler() {
        let descriptors = parse_descriptors(
            "[compiler]\nversion = \"3.25.1\"\nclassifier = \"osx-aarch_64\"\n",
        )
        .unwrap();
        match descriptors.compiler.specification() {
            ExecutableSpecification::Coordinate(coordinate) => {
                assert_eq!(coordinate.classifier.as_deref(), Some("osx-aarch_64"));
            }
            other => panic!("unexpected specification: {other:?}"),
        }
    }

    #[test]
    fn test_unknown_plugin_kind_is_parse_error() {
        let err = parse_descriptors(
            "[compiler]\nversion = \"PATH\"\n[[plugins]]\nname = \"x\"\nkind = \"jar\"\nsearch = \"x\"\n",
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::ParseError { .. }));
    }
}
