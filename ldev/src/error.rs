//! Error type for the ldev CLI.
//!
//! Library failures arrive as [`LdevError`] and are shown as-is; the CLI adds
//! the few failures that only exist at this layer.

use ldev_core::error::LdevError;
use std::error::Error;
use std::fmt;

#[derive(Debug)]
pub enum CliError {
    /// Target resolution, dispatch, discovery or configuration failed
    Ldev(LdevError),

    /// A confirmation prompt could not be shown
    Prompt { source: dialoguer::Error },

    /// A local file given on the command line could not be used
    FileSystem {
        source: std::io::Error,
        path: String,
        operation: String,
    },

    /// Output could not be rendered
    Render { source: serde_json::Error },
}

impl CliError {
    pub fn filesystem(
        source: std::io::Error,
        path: impl Into<String>,
        operation: impl Into<String>,
    ) -> Self {
        Self::FileSystem {
            source,
            path: path.into(),
            operation: operation.into(),
        }
    }

    /// One-line remediation shown under the error, if there is one.
    pub fn hint(&self) -> Option<&'static str> {
        match self {
            CliError::Ldev(e) => e.hint(),
            CliError::Prompt { .. } => Some("Pass --yes to skip the prompt"),
            CliError::FileSystem { .. } | CliError::Render { .. } => None,
        }
    }
}

impl fmt::Display for CliError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            CliError::Ldev(e) => write!(f, "{e}"),
            CliError::Prompt { source } => write!(f, "Failed to prompt user: {source}"),
            CliError::FileSystem {
                source,
                path,
                operation,
            } => write!(f, "Filesystem error during '{operation}' on '{path}': {source}"),
            CliError::Render { source } => write!(f, "Failed to render output: {source}"),
        }
    }
}

impl Error for CliError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            CliError::Ldev(e) => Some(e),
            CliError::Prompt { source } => Some(source),
            CliError::FileSystem { source, .. } => Some(source),
            CliError::Render { source } => Some(source),
        }
    }
}

pub type CliResult<T> = Result<T, CliError>;

impl From<LdevError> for CliError {
    fn from(err: LdevError) -> Self {
        CliError::Ldev(err)
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        CliError::Ldev(LdevError::Io(err))
    }
}

impl From<dialoguer::Error> for CliError {
    fn from(source: dialoguer::Error) -> Self {
        CliError::Prompt { source }
    }
}

impl From<serde_json::Error> for CliError {
    fn from(source: serde_json::Error) -> Self {
        CliError::Render { source }
    }
}
