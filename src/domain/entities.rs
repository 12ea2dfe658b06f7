//! Domain entities: fragments discovered in a source document

use roxmltree::Node;

use crate::domain::span::TagSpan;

/// A manually authored overlay group found in a source document.
///
/// `snippet` is always `text[span.start..span.end]` and is balanced with
/// respect to `<g>` tags.
#[derive(Debug, Clone)]
pub struct CandidateGroup<'a, 'input> {
    /// Value of the group's `id` attribute
    pub id: String,
    /// The group element in the parsed tree
    pub node: Node<'a, 'input>,
    /// Byte-exact source text of the group
    pub snippet: &'input str,
    /// Location of `snippet` in the source text
    pub span: TagSpan,
}

impl CandidateGroup<'_, '_> {
    pub fn start(&self) -> usize {
        self.span.start
    }

    pub fn end(&self) -> usize {
        self.span.end
    }
}

/// A referenced element (marker, filter, clip path, path effect) pulled out
/// of the source as a single tag.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DefinitionFragment<'input> {
    pub id: String,
    pub snippet: &'input str,
    /// Byte offset of `snippet` in the source text
    pub start: usize,
}
