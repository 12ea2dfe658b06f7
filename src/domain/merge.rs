//! Merging extracted fragments into a target document's raw text
//!
//! Existing copies (matched by `id`) are replaced in place; new fragments
//! are inserted at a fixed location. Nothing outside the matched span or
//! insertion point is touched.

use crate::domain::classify::GROUP_TAG;
use crate::domain::error::DomainError;
use crate::domain::span::{locate_block, locate_single_tag, opening_tag_has_id, TagSpan};

/// Close marker of a defs section.
pub const DEFS_CLOSE: &str = "</defs>";

/// Close marker of the document root.
pub const DOCUMENT_CLOSE: &str = "</svg>";

const GROUP_CLOSE: &str = "</g>";

const DEFS_OPEN: &str = "<defs";

/// Placement rules differ between referenced definitions and overlay groups.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FragmentClass {
    Definition,
    Group,
}

/// Result of merging one fragment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MergeOutcome {
    pub text: String,
    /// False when the merge reproduced the input byte-for-byte
    pub changed: bool,
}

fn ensure_trailing_newline(snippet: &str) -> String {
    format!("{}\n", snippet.trim_end_matches('\n'))
}

/// Existing copy of the fragment in `dest`, padded to whole lines.
fn find_existing(dest: &str, element_id: &str, class: FragmentClass) -> Option<TagSpan> {
    let span = match class {
        FragmentClass::Definition => locate_single_tag(dest, element_id)?,
        FragmentClass::Group => locate_block(dest, element_id, GROUP_TAG)
            .filter(|span| opening_tag_has_id(dest, span, element_id))?,
    };
    Some(span.with_line_padding(dest))
}

/// Start of the line holding the root group's close tag, if a defs section follows it.
fn overlay_slot(dest: &str, root_id: &str) -> Option<usize> {
    let root = locate_block(dest, root_id, GROUP_TAG)
        .filter(|span| opening_tag_has_id(dest, span, root_id))?;
    let block = root.slice(dest);
    if !block.ends_with(GROUP_CLOSE) {
        return None;
    }
    if !dest[root.end..].trim_start().starts_with(DEFS_OPEN) {
        return None;
    }
    let close = root.end - GROUP_CLOSE.len();
    let line = dest[..close].trim_end_matches([' ', '\t']);
    Some(if line.ends_with('\n') {
        line.len() - 1
    } else {
        close
    })
}

/// Byte offset where a fragment not yet present in `dest` is inserted.
fn insertion_point(
    dest: &str,
    class: FragmentClass,
    root_id: &str,
) -> Result<usize, DomainError> {
    match class {
        FragmentClass::Definition => dest.find(DEFS_CLOSE).ok_or(DomainError::MissingDefs),
        FragmentClass::Group => overlay_slot(dest, root_id)
            .or_else(|| dest.rfind(DOCUMENT_CLOSE))
            .ok_or(DomainError::NoInsertionPoint),
    }
}

/// Replace the fragment identified by `element_id` in `dest`, or insert it.
///
/// Definitions go before the first `</defs>`; groups go before the close of
/// the `root_id` group when it is directly followed by a defs section,
/// otherwise before the last `</svg>`.
///
/// # Errors
/// * `MissingDefs` if a new definition has no defs section to go into.
/// * `NoInsertionPoint` if a new group has neither insertion marker.
pub fn insert_or_replace(
    dest: &str,
    element_id: &str,
    snippet: &str,
    class: FragmentClass,
    root_id: &str,
) -> Result<MergeOutcome, DomainError> {
    let prepared = ensure_trailing_newline(snippet);

    if let Some(span) = find_existing(dest, element_id, class) {
        let text = [&dest[..span.start], prepared.as_str(), &dest[span.end..]].concat();
        let changed = text != dest;
        return Ok(MergeOutcome { text, changed });
    }

    let at = insertion_point(dest, class, root_id)?;
    let lead = if at > 0 && !dest[..at].ends_with('\n') {
        "\n"
    } else {
        ""
    };
    let text = [&dest[..at], lead, prepared.as_str(), &dest[at..]].concat();
    Ok(MergeOutcome {
        text,
        changed: true,
    })
}
