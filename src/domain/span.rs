//! Raw-text tag location
//!
//! Finds the byte range of a tag carrying a given `id` without going through
//! a tree parser, so the matched text can be copied byte-for-byte.

use regex::Regex;

/// Half-open byte range `[start, end)` into a document's raw text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TagSpan {
    pub start: usize,
    pub end: usize,
}

impl TagSpan {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    /// The text covered by this span.
    pub fn slice<'t>(&self, text: &'t str) -> &'t str {
        &text[self.start..self.end]
    }

    /// True if `self` lies entirely within `other`.
    pub fn is_within(&self, other: &TagSpan) -> bool {
        self.start >= other.start && self.end <= other.end
    }

    /// Grow the span to swallow the indentation before it and one line break after it.
    pub fn with_line_padding(&self, text: &str) -> TagSpan {
        let indent = text[..self.start]
            .bytes()
            .rev()
            .take_while(|b| *b == b' ' || *b == b'\t')
            .count();
        let newline = usize::from(text[self.end..].starts_with('\n'));
        TagSpan::new(self.start - indent, self.end + newline)
    }
}

/// Pattern matching an opening tag of any name that carries `id="<element_id>"`.
///
/// Group 1 is the tag name.
fn id_open_tag_pattern(element_id: &str) -> Option<Regex> {
    Regex::new(&format!(
        r#"<([\w:-]+)[^>]*\sid="{}"[^>]*>"#,
        regex::escape(element_id)
    ))
    .ok()
}

/// Pattern matching the attribute occurrence `id="<element_id>"`.
fn id_attribute_pattern(element_id: &str) -> Option<Regex> {
    Regex::new(&format!(r#"\sid="{}""#, regex::escape(element_id))).ok()
}

/// Locate the first tag of any name that carries `element_id`.
///
/// Matches either a self-closing tag or an open tag together with the first
/// close tag of the same name after it. Content is not depth-tracked, so
/// this is meant for definition elements (markers, filters, clip paths).
pub fn locate_single_tag(text: &str, element_id: &str) -> Option<TagSpan> {
    let pattern = id_open_tag_pattern(element_id)?;
    for caps in pattern.captures_iter(text) {
        let open = caps.get(0)?;
        if open.as_str().ends_with("/>") {
            return Some(TagSpan::new(open.start(), open.end()));
        }
        let name = caps.get(1)?.as_str();
        let close = format!("</{name}>");
        if let Some(offset) = text[open.end()..].find(&close) {
            return Some(TagSpan::new(open.start(), open.end() + offset + close.len()));
        }
    }
    None
}

/// Locate the balanced `<tag>...</tag>` block enclosing the first occurrence of `element_id`.
///
/// Scans backward from the `id` attribute to the nearest opening `tag`, then
/// walks forward counting nested open and close tags of that kind until the
/// depth returns to zero. Self-closing tags of the kind do not change depth.
pub fn locate_block(text: &str, element_id: &str, tag: &str) -> Option<TagSpan> {
    let id_pos = id_attribute_pattern(element_id)?.find(text)?.start();

    let tag = regex::escape(tag);
    let open_start = Regex::new(&format!(r"<{tag}\b"))
        .ok()?
        .find_iter(&text[..id_pos])
        .last()
        .map(|m| m.start())?;

    let tag_pattern = Regex::new(&format!(r"<(/?){tag}\b[^>]*>")).ok()?;
    let mut depth: usize = 0;
    for caps in tag_pattern.captures_iter(&text[open_start..]) {
        let token = caps.get(0)?;
        let is_close = caps.get(1).is_some_and(|m| !m.as_str().is_empty());
        let is_self_closing = token.as_str().ends_with("/>");

        if is_close {
            depth = depth.checked_sub(1)?;
            if depth == 0 {
                return Some(TagSpan::new(open_start, open_start + token.end()));
            }
        } else if is_self_closing {
            if depth == 0 {
                return Some(TagSpan::new(open_start, open_start + token.end()));
            }
        } else {
            depth += 1;
        }
    }
    None
}

/// Byte offset of the `>` ending the opening tag that starts at `span.start`.
fn opening_tag_end(text: &str, span: &TagSpan) -> Option<usize> {
    text[span.start..span.end].find('>').map(|i| span.start + i + 1)
}

/// True if the opening tag of `span` itself carries `id="<element_id>"`.
pub fn opening_tag_has_id(text: &str, span: &TagSpan, element_id: &str) -> bool {
    let Some(end) = opening_tag_end(text, span) else {
        return false;
    };
    id_attribute_pattern(element_id)
        .map(|p| p.is_match(&text[span.start..end]))
        .unwrap_or(false)
}
