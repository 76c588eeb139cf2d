#![deny(clippy::pedantic, unsafe_code)]
#![allow(clippy::module_name_repetitions)]

//! Executable resolution for protoloc
//!
//! This crate turns an [`ExecutableSpecification`] into a verified,
//! executable filesystem path. Three strategies exist: an explicit path is
//! verified as-is, a bare name is searched on the host path, and a
//! repository coordinate is fetched, checked, made executable and cached for
//! the lifetime of the engine. Every strategy reports failures through
//! [`ResolutionError`].
//!
//! [`ExecutableSpecification`]: protoloc_types::ExecutableSpecification
//! [`ResolutionError`]: protoloc_errors::ResolutionError

mod cache;
mod coordinate;
mod engine;
mod path_search;
mod toolchain;

pub use cache::ResolutionCache;
pub use coordinate::{CoordinateResolver, ARCHIVE_SUFFIXES};
pub use engine::ResolutionEngine;
pub use path_search::PathSearchResolver;
pub use toolchain::{ResolvedToolchain, ToolOutcome};
