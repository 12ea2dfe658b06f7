//! Error conversion helpers for common I/O operations
//!
//! Provides extension traits for cleaner error handling with path context.

use std::io;
use std::path::Path;

use crate::application::{AnnotationError, AnnotationResult};

/// Extension trait for converting `io::Result` to `AnnotationResult` with context.
pub trait IoResultExt<T> {
    /// Add path context to an I/O error.
    ///
    /// # Example
    /// ```ignore
    /// self.fs.read_to_string(&target)
    ///     .with_path_context("read target SVG", &target)?;
    /// ```
    fn with_path_context(self, action: &str, path: &Path) -> AnnotationResult<T>;
}

impl<T> IoResultExt<T> for io::Result<T> {
    fn with_path_context(self, action: &str, path: &Path) -> AnnotationResult<T> {
        self.map_err(|e| AnnotationError::OperationFailed {
            context: format!("{}: {}", action, path.display()),
            source: Box::new(e),
        })
    }
}
