//! Core platform abstraction bundling host facts with filesystem access

use std::sync::Arc;

use crate::environment::PlatformEnvironment;
use crate::filesystem::FilesystemOperations;
use crate::host::HostPlatform;
use crate::implementations::native::NativeFilesystem;

/// Everything a resolver needs to know about the machine it runs on
#[derive(Clone)]
pub struct Platform {
    environment: PlatformEnvironment,
    host: HostPlatform,
    filesystem: Arc<dyn FilesystemOperations>,
}

impl Platform {
    /// Create a platform from explicit parts (tests, cross-resolution)
    pub fn new(
        environment: PlatformEnvironment,
        host: HostPlatform,
        filesystem: Arc<dyn FilesystemOperations>,
    ) -> Self {
        Self {
            environment,
            host,
            filesystem,
        }
    }

    /// Capture the running host
    #[must_use]
    pub fn current() -> Self {
        Self::new(
            PlatformEnvironment::capture(),
            HostPlatform::current(),
            Arc::new(NativeFilesystem::new()),
        )
    }

    /// Replace the environment, keeping host and filesystem
    #[must_use]
    pub fn with_environment(mut self, environment: PlatformEnvironment) -> Self {
        self.environment = environment;
        self
    }

    /// Replace the host used for classifier derivation
    #[must_use]
    pub fn with_host(mut self, host: HostPlatform) -> Self {
        self.host = host;
        self
    }

    #[must_use]
    pub fn environment(&self) -> &PlatformEnvironment {
        &self.environment
    }

    #[must_use]
    pub fn host(&self) -> &HostPlatform {
        &self.host
    }

    #[must_use]
    pub fn filesystem(&self) -> &dyn FilesystemOperations {
        self.filesystem.as_ref()
    }

    #[must_use]
    pub fn filesystem_handle(&self) -> Arc<dyn FilesystemOperations> {
        Arc::clone(&self.filesystem)
    }
}

impl std::fmt::Debug for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Platform")
            .field("environment", &self.environment)
            .field("host", &self.host)
            .finish_non_exhaustive()
    }
}
