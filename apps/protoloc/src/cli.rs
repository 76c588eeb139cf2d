//! Command line interface definition

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// protoloc - Locate protoc and its plugins for a build
#[derive(Parser)]
#[command(name = "protoloc")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Locate protoc and its plugins for a build")]
#[command(long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    #[command(flatten)]
    pub global: GlobalArgs,
}

/// Global arguments available for all commands
#[derive(Parser)]
pub struct GlobalArgs {
    /// Output in JSON format
    #[arg(long, global = true)]
    pub json: bool,

    /// Enable debug logging to the protoloc log directory
    #[arg(long, global = true)]
    pub debug: bool,

    /// Use alternate config file
    #[arg(long, global = true, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Never contact remote repositories
    #[arg(long, global = true)]
    pub offline: bool,

    /// Local repository directory
    #[arg(long, global = true, value_name = "DIR")]
    pub local_repository: Option<PathBuf>,

    /// Maximum number of executables resolved at once
    #[arg(short = 'j', long, global = true, value_name = "N")]
    pub concurrency: Option<usize>,
}

/// Available commands
#[derive(Subcommand)]
pub enum Commands {
    /// Resolve the compiler and plugins listed in a descriptor file
    Resolve {
        /// Descriptor file with a [compiler] table and [[plugins]] entries
        descriptors: PathBuf,

        /// Stop at the first executable that fails to resolve
        #[arg(long)]
        fail_fast: bool,
    },

    /// Search the PATH for an executable
    Which {
        /// Executable name without extension
        #[arg(default_value = "protoc")]
        name: String,
    },

    /// Fetch an executable from the configured repositories
    Fetch {
        /// Coordinate as group:artifact[:extension[:classifier]]:version
        ///
        /// The version always comes last; pass a classifier with --classifier
        /// rather than appending it to group:artifact:version.
        coordinate: String,

        /// Classifier to use instead of the host's or the coordinate's
        #[arg(long)]
        classifier: Option<String>,
    },

    /// Show the host platform and its artifact classifier
    Platform,
}
