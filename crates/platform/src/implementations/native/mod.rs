//! Implementation backed by the host operating system

pub mod filesystem;

pub use filesystem::NativeFilesystem;
