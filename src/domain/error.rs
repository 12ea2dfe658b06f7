//! Domain-level errors (no external dependencies)

use thiserror::Error;

/// Domain errors represent structural violations in the documents being merged.
/// These are independent of infrastructure concerns.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    #[error("destination SVG missing </defs> tag for annotation defs")]
    MissingDefs,

    #[error("could not locate insertion point for annotation groups in target SVG")]
    NoInsertionPoint,

    #[error("expression must contain '>' or '<' to indicate direction")]
    MissingDirection,

    #[error("both source and target paths are required in the expression")]
    EmptyExpressionSide,
}
