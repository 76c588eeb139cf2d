//! CLI error handling

use std::fmt;

use protoloc_errors::UserFacingError;

/// CLI-specific error type
#[derive(Debug)]
pub enum CliError {
    /// Configuration error
    Config(protoloc_errors::ConfigError),
    /// A requested executable could not be resolved
    Resolution(protoloc_errors::ResolutionError),
    /// Any other library error
    Ops(protoloc_errors::Error),
    /// Some toolchain entries failed; details were already rendered
    Incomplete { failed: usize },
    /// Invalid command arguments
    InvalidArguments(String),
    /// I/O error
    Io(std::io::Error),
}

impl CliError {
    fn write_user_facing(f: &mut fmt::Formatter<'_>, e: &dyn UserFacingError) -> fmt::Result {
        write!(f, "{}", e.user_message())?;
        if let Some(code) = e.user_code() {
            write!(f, "\n  Code: {code}")?;
        }
        if let Some(hint) = e.user_hint() {
            write!(f, "\n  Hint: {hint}")?;
        }
        if e.is_retryable() {
            write!(f, "\n  Retry: safe to retry this operation.")?;
        }
        Ok(())
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Config(e) => write!(f, "Configuration error: {e}"),
            CliError::Resolution(e) => Self::write_user_facing(f, e),
            CliError::Ops(e) => Self::write_user_facing(f, e),
            CliError::Incomplete { failed } => {
                write!(f, "{failed} executable(s) could not be resolved")
            }
            CliError::InvalidArguments(msg) => write!(f, "Invalid arguments: {msg}"),
            CliError::Io(e) => write!(f, "I/O error: {e}"),
        }
    }
}

impl std::error::Error for CliError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            CliError::Config(e) => Some(e),
            CliError::Resolution(e) => Some(e),
            CliError::Ops(e) => Some(e),
            CliError::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<protoloc_errors::ConfigError> for CliError {
    fn from(e: protoloc_errors::ConfigError) -> Self {
        CliError::Config(e)
    }
}

impl From<protoloc_errors::ResolutionError> for CliError {
    fn from(e: protoloc_errors::ResolutionError) -> Self {
        CliError::Resolution(e)
    }
}

impl From<protoloc_errors::FetchError> for CliError {
    fn from(e: protoloc_errors::FetchError) -> Self {
        CliError::Ops(e.into())
    }
}

impl From<protoloc_errors::Error> for CliError {
    fn from(e: protoloc_errors::Error) -> Self {
        match e {
            protoloc_errors::Error::Config(e) => CliError::Config(e),
            protoloc_errors::Error::Resolution(e) => CliError::Resolution(e),
            other => CliError::Ops(other),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(e: std::io::Error) -> Self {
        CliError::Io(e)
    }
}
