//! Host operating system / architecture and artifact classifiers

use protoloc_errors::PlatformError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Every classifier protoc-style artifacts are published under
pub const SUPPORTED_CLASSIFIERS: [&str; 9] = [
    "linux-aarch_64",
    "linux-ppcle_64",
    "linux-s390_64",
    "linux-x86_32",
    "linux-x86_64",
    "osx-aarch_64",
    "osx-x86_64",
    "windows-x86_32",
    "windows-x86_64",
];

/// Operating system and CPU architecture of a host
///
/// Values use the `std::env::consts` vocabulary (`linux`, `macos`,
/// `windows`; `x86_64`, `aarch64`, `x86`, `powerpc64le`, `s390x`).
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct HostPlatform {
    pub os: String,
    pub arch: String,
}

impl HostPlatform {
    pub fn new(os: impl Into<String>, arch: impl Into<String>) -> Self {
        Self {
            os: os.into(),
            arch: arch.into(),
        }
    }

    /// The platform this process runs on
    #[must_use]
    pub fn current() -> Self {
        let arch = match std::env::consts::ARCH {
            "powerpc64" if cfg!(target_endian = "little") => "powerpc64le",
            other => other,
        };
        Self::new(std::env::consts::OS, arch)
    }

    /// Classifier of the artifact built for this host
    ///
    /// # Errors
    ///
    /// Returns `PlatformError::UnsupportedPlatform` when no artifact is
    /// published for the operating system / architecture pair.
    pub fn classifier(&self) -> Result<&'static str, PlatformError> {
        let os = normalize_os(&self.os);
        let arch = normalize_arch(&self.arch);

        let classifier = match (os, arch) {
            ("linux", "aarch64") => "linux-aarch_64",
            ("linux", "powerpc64le") => "linux-ppcle_64",
            ("linux", "s390x") => "linux-s390_64",
            ("linux", "x86") => "linux-x86_32",
            ("linux", "x86_64") => "linux-x86_64",
            ("macos", "aarch64") => "osx-aarch_64",
            ("macos", "x86_64") => "osx-x86_64",
            ("windows", "x86") => "windows-x86_32",
            ("windows", "x86_64") => "windows-x86_64",
            _ => {
                return Err(PlatformError::UnsupportedPlatform {
                    os: self.os.clone(),
                    arch: self.arch.clone(),
                })
            }
        };
        tracing::trace!(os = %self.os, arch = %self.arch, classifier, "derived classifier");
        Ok(classifier)
    }
}

impl fmt::Display for HostPlatform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.os, self.arch)
    }
}

fn normalize_os(os: &str) -> &str {
    match os {
        "darwin" | "osx" | "macosx" => "macos",
        other => other,
    }
}

fn normalize_arch(arch: &str) -> &str {
    match arch {
        "amd64" | "x64" => "x86_64",
        "arm64" | "aarch_64" => "aarch64",
        "i386" | "i586" | "i686" | "x86_32" => "x86",
        "ppc64le" => "powerpc64le",
        other => other,
    }
}
