//! Directional `source > target` / `target < source` shorthand

use std::path::PathBuf;

use crate::domain::error::DomainError;

/// Split a directional expression into `(source, target)` paths.
///
/// `a.svg > b.svg` copies from `a.svg` into `b.svg`; `b.svg < a.svg` is the
/// same transfer written right to left. When both separators appear, `>`
/// wins and only the first occurrence splits.
pub fn parse_expression(value: &str) -> Result<(PathBuf, PathBuf), DomainError> {
    let expr = value.trim();
    let (source, target) = if let Some((left, right)) = expr.split_once('>') {
        (left.trim(), right.trim())
    } else if let Some((left, right)) = expr.split_once('<') {
        (right.trim(), left.trim())
    } else {
        return Err(DomainError::MissingDirection);
    };
    if source.is_empty() || target.is_empty() {
        return Err(DomainError::EmptyExpressionSide);
    }
    Ok((PathBuf::from(source), PathBuf::from(target)))
}

/// True if `value` reads as a directional expression rather than a plain path.
pub fn is_expression(value: &str) -> bool {
    value.contains('>') || value.contains('<')
}
