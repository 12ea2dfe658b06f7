//! Parsed SVG document: raw text plus a read-only structural tree

use roxmltree::{Document, ParsingOptions};

/// Two read-only views over one SVG source.
///
/// The tree answers relational questions (ancestors, attribute sets) while
/// the text stays the only thing ever copied into another document.
pub struct SvgDocument<'input> {
    text: &'input str,
    tree: Document<'input>,
}

impl<'input> SvgDocument<'input> {
    /// Parse `text`, allowing the DOCTYPE declaration plotting back-ends emit.
    pub fn parse(text: &'input str) -> Result<Self, roxmltree::Error> {
        let options = ParsingOptions {
            allow_dtd: true,
            ..ParsingOptions::default()
        };
        let tree = Document::parse_with_options(text, options)?;
        Ok(Self { text, tree })
    }

    pub fn text(&self) -> &'input str {
        self.text
    }

    pub fn tree(&self) -> &Document<'input> {
        &self.tree
    }
}

impl std::fmt::Debug for SvgDocument<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SvgDocument")
            .field("len", &self.text.len())
            .field("root", &self.tree.root_element().tag_name().name())
            .finish()
    }
}
