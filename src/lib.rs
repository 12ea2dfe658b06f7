//! Transfer hand-drawn annotation overlays between SVG renderings of a plot.
//!
//! A plotting script regenerates its SVG from scratch; annotations drawn on
//! top of an earlier rendering (arrows, callouts, highlights) would be lost.
//! This crate finds those overlay groups in the annotated file and merges
//! them, together with the markers, filters and clip paths they reference,
//! into the new file. Everything else in the target is left byte-for-byte
//! unchanged.

use std::path::{Path, PathBuf};
use std::sync::Arc;

pub mod application;
pub mod cli;
pub mod config;
pub mod domain;
pub mod exitcode;
pub mod infrastructure;
pub mod util;

pub use application::services::{TransferOptions, TransferReport, TransferService};
pub use application::{AnnotationError, AnnotationResult};

use domain::NamingConvention;
use infrastructure::RealFileSystem;

fn default_service() -> TransferService {
    TransferService::new(Arc::new(RealFileSystem), NamingConvention::default())
}

/// Identifiers of the overlay groups in the SVG at `path`, in source order.
pub fn list_overlay_groups(path: impl AsRef<Path>) -> AnnotationResult<Vec<String>> {
    default_service().list_overlay_groups(path.as_ref())
}

/// Copy overlay groups from `source` into `target` and return the ids that changed.
///
/// Empty `include` / `exclude` lists do not filter. With `dry_run` the target
/// is left untouched and the ids that would change are returned.
pub fn copy_annotations(
    source: impl AsRef<Path>,
    target: impl AsRef<Path>,
    include: &[String],
    exclude: &[String],
    dry_run: bool,
) -> AnnotationResult<Vec<String>> {
    let options = TransferOptions {
        include: include.to_vec(),
        exclude: exclude.to_vec(),
        dry_run,
    };
    let report = default_service().copy_annotations(source.as_ref(), target.as_ref(), &options)?;
    Ok(report.copied)
}

/// Split `source>target` or `target<source` into `(source, target)`.
pub fn parse_expression(value: &str) -> AnnotationResult<(PathBuf, PathBuf)> {
    Ok(domain::parse_expression(value)?)
}
