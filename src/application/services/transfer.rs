//! Annotation transfer service
//!
//! Copies overlay groups, together with the definitions they reference,
//! from a source SVG into a target SVG.

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info, instrument, warn};

use crate::application::{AnnotationError, AnnotationResult, IoResultExt};
use crate::domain::{
    collect_references, discover_candidates, insert_or_replace, locate_single_tag,
    CandidateGroup, DefinitionFragment, FragmentClass, NamingConvention, SvgDocument,
};
use crate::infrastructure::traits::FileSystem;

/// Which candidates to transfer and whether to persist the result.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferOptions {
    /// Keep only these group ids (empty = keep all)
    pub include: Vec<String>,
    /// Drop these group ids, applied after `include`
    pub exclude: Vec<String>,
    /// Compute changes without writing the target
    pub dry_run: bool,
}

/// Outcome of one transfer.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransferReport {
    /// Group ids whose merge changed the target text, in source order
    pub copied: Vec<String>,
    /// Definition ids whose merge changed the target text, in source order
    pub definitions: Vec<String>,
    /// Whether the target file was rewritten
    pub written: bool,
}

impl TransferReport {
    pub fn is_unchanged(&self) -> bool {
        self.copied.is_empty() && self.definitions.is_empty()
    }
}

/// Service for discovering and transferring annotation overlays.
pub struct TransferService {
    fs: Arc<dyn FileSystem>,
    convention: NamingConvention,
}

impl TransferService {
    /// Create a new transfer service.
    ///
    /// # Arguments
    /// * `fs` - Filesystem abstraction
    /// * `convention` - Naming rules that identify generated content
    pub fn new(fs: Arc<dyn FileSystem>, convention: NamingConvention) -> Self {
        Self { fs, convention }
    }

    pub fn convention(&self) -> &NamingConvention {
        &self.convention
    }

    /// Directories and dangling paths count as missing.
    fn ensure_file(
        &self,
        path: &Path,
        missing: fn(PathBuf) -> AnnotationError,
    ) -> AnnotationResult<()> {
        if self.fs.is_file(path) {
            Ok(())
        } else {
            Err(missing(path.to_path_buf()))
        }
    }

    fn read(&self, path: &Path) -> AnnotationResult<String> {
        self.fs
            .read_to_string(path)
            .with_path_context("read SVG", path)
    }

    fn parse<'input>(path: &Path, text: &'input str) -> AnnotationResult<SvgDocument<'input>> {
        SvgDocument::parse(text).map_err(|source| AnnotationError::Parse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// List overlay group ids of an SVG, in source order.
    #[instrument(skip(self))]
    pub fn list_overlay_groups(&self, path: &Path) -> AnnotationResult<Vec<String>> {
        self.ensure_file(path, AnnotationError::SourceNotFound)?;
        let text = self.read(path)?;
        let document = Self::parse(path, &text)?;
        let ids: Vec<String> = discover_candidates(&document, &self.convention)
            .into_iter()
            .map(|cand| cand.id)
            .collect();
        debug!("list_overlay_groups: {} groups", ids.len());
        Ok(ids)
    }

    /// Copy overlay groups and the definitions they reference from `source` into `target`.
    ///
    /// Definitions are merged first, then groups, each in source order.
    /// The target is written at most once, and only if its text changed and
    /// `dry_run` is off.
    ///
    /// # Errors
    /// * `SourceNotFound` / `TargetNotFound` if either path is not a regular file.
    /// * `Parse` if the source is not well-formed.
    /// * `NoCandidates` if filtering leaves nothing to copy.
    /// * `Domain` if the target lacks a defs section or insertion point.
    #[instrument(skip(self))]
    pub fn copy_annotations(
        &self,
        source: &Path,
        target: &Path,
        options: &TransferOptions,
    ) -> AnnotationResult<TransferReport> {
        self.ensure_file(source, AnnotationError::SourceNotFound)?;
        self.ensure_file(target, AnnotationError::TargetNotFound)?;
        let src_text = self.read(source)?;
        let dest_text = self.read(target)?;
        let document = Self::parse(source, &src_text)?;

        let candidates = apply_filters(discover_candidates(&document, &self.convention), options);
        if candidates.is_empty() {
            return Err(AnnotationError::NoCandidates);
        }
        debug!(
            "copy_annotations: {} groups after filtering",
            candidates.len()
        );

        let definitions = collect_definitions(&src_text, &candidates);
        let (new_text, mut report) = merge_fragments(
            dest_text,
            &definitions,
            &candidates,
            self.convention.root_id(),
        )?;

        if !report.is_unchanged() && !options.dry_run {
            self.fs
                .write(target, &new_text)
                .with_path_context("write target SVG", target)?;
            report.written = true;
        }
        info!(
            "copy_annotations: groups={:?}, definitions={:?}, written={}",
            report.copied, report.definitions, report.written
        );
        Ok(report)
    }
}

/// Apply `include` then `exclude`; empty lists do not filter.
fn apply_filters<'a, 'input>(
    candidates: Vec<CandidateGroup<'a, 'input>>,
    options: &TransferOptions,
) -> Vec<CandidateGroup<'a, 'input>> {
    let include: HashSet<&str> = options.include.iter().map(String::as_str).collect();
    let exclude: HashSet<&str> = options.exclude.iter().map(String::as_str).collect();
    candidates
        .into_iter()
        .filter(|cand| include.is_empty() || include.contains(cand.id.as_str()))
        .filter(|cand| !exclude.contains(cand.id.as_str()))
        .collect()
}

/// Extract every definition referenced by `candidates`, once each, ordered by source offset.
///
/// References that cannot be located in the source are skipped.
fn collect_definitions<'input>(
    src_text: &'input str,
    candidates: &[CandidateGroup<'_, 'input>],
) -> Vec<DefinitionFragment<'input>> {
    let mut seen: HashSet<String> = HashSet::new();
    let mut definitions = Vec::new();

    for cand in candidates {
        for reference in collect_references(cand.node) {
            if seen.contains(&reference) {
                continue;
            }
            let Some(span) = locate_single_tag(src_text, &reference) else {
                warn!("{}: referenced definition '{}' not found", cand.id, reference);
                continue;
            };
            definitions.push(DefinitionFragment {
                snippet: span.slice(src_text),
                start: span.start,
                id: reference.clone(),
            });
            seen.insert(reference);
        }
    }

    definitions.sort_by_key(|def| def.start);
    definitions
}

/// Merge definitions, then groups, into `dest_text`.
fn merge_fragments(
    dest_text: String,
    definitions: &[DefinitionFragment<'_>],
    candidates: &[CandidateGroup<'_, '_>],
    root_id: &str,
) -> AnnotationResult<(String, TransferReport)> {
    let mut text = dest_text;
    let mut report = TransferReport::default();

    for def in definitions {
        let outcome = insert_or_replace(
            &text,
            &def.id,
            def.snippet,
            FragmentClass::Definition,
            root_id,
        )?;
        if outcome.changed {
            report.definitions.push(def.id.clone());
        }
        text = outcome.text;
    }

    for cand in candidates {
        let outcome =
            insert_or_replace(&text, &cand.id, cand.snippet, FragmentClass::Group, root_id)?;
        if outcome.changed {
            report.copied.push(cand.id.clone());
        }
        text = outcome.text;
    }

    Ok((text, report))
}
