#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Platform abstraction layer for executable resolution.
//!
//! This crate provides the host facts and filesystem access the resolvers
//! depend on:
//! - `PlatformEnvironment`: search directories, executable name extensions
//!   and the Windows/POSIX flag, captured once per resolution run
//! - `HostPlatform`: operating system and architecture, mapped to the
//!   artifact classifier published for that host
//! - `FilesystemOperations`: the async seam every directory listing, stat
//!   and permission change goes through
//! - executability checks and permission normalization

pub mod core;
pub mod environment;
pub mod executable;
pub mod filesystem;
pub mod host;
pub mod implementations;

pub use core::Platform;
pub use environment::{ExtensionSet, PlatformEnvironment};
pub use executable::{ensure_executable, satisfies_executability, ModeChange, EXECUTE_BITS};
pub use filesystem::{FileMetadata, FilesystemOperations};
pub use host::{HostPlatform, SUPPORTED_CLASSIFIERS};
pub use implementations::native::NativeFilesystem;
