//! Application-level errors (wraps domain errors)

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::DomainError;

/// The single error kind reported by annotation transfers.
///
/// Wraps domain errors and adds file-level context.
#[derive(Error, Debug)]
pub enum AnnotationError {
    #[error("{0}")]
    Domain(#[from] DomainError),

    #[error("source SVG not found: {}", .0.display())]
    SourceNotFound(PathBuf),

    #[error("target SVG not found: {}", .0.display())]
    TargetNotFound(PathBuf),

    #[error("could not parse {}: {source}", path.display())]
    Parse {
        path: PathBuf,
        #[source]
        source: roxmltree::Error,
    },

    #[error("no annotation groups available after filtering")]
    NoCandidates,

    #[error("config error: {message}")]
    Config { message: String },

    #[error("operation failed: {context}: {source}")]
    OperationFailed {
        context: String,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },
}

/// Result type for application layer operations.
pub type AnnotationResult<T> = Result<T, AnnotationError>;
