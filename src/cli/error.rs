//! CLI-level errors (wraps application errors)

use thiserror::Error;

use crate::application::AnnotationError;

/// CLI errors are the top-level error type.
/// These are what get displayed to the user.
#[derive(Error, Debug)]
pub enum CliError {
    #[error("{0}")]
    Annotation(#[from] AnnotationError),

    #[error("{0}")]
    Usage(String),
}

/// Result type for CLI operations.
pub type CliResult<T> = Result<T, CliError>;

impl CliError {
    /// Get the appropriate exit code for this error.
    pub fn exit_code(&self) -> i32 {
        match self {
            CliError::Annotation(_) | CliError::Usage(_) => crate::exitcode::FAILURE,
        }
    }
}
