//! Candidate classification: manual overlays vs. generated plot content
//!
//! Generated content is recognised by naming convention. A group is an
//! overlay candidate when neither it nor any ancestor carries a generated
//! or root-container identifier, and it has attributes beyond its `id`.

use std::collections::HashSet;

use roxmltree::NodeId;
use tracing::{debug, trace, warn};

use crate::domain::document::SvgDocument;
use crate::domain::entities::CandidateGroup;
use crate::domain::span::locate_block;

/// Element name of the group container.
pub const GROUP_TAG: &str = "g";

/// Identifier of matplotlib's top-level content group.
pub const DEFAULT_ROOT_ID: &str = "figure_1";

/// Identifier prefixes matplotlib uses for the structures it renders.
pub const MATPLOTLIB_PREFIXES: &[&str] = &[
    "figure_",
    "axes_",
    "patch_",
    "legend_",
    "line",
    "xtick_",
    "ytick_",
    "matplotlib.axis_",
    "polycollection_",
    "pathcollection_",
    "streamplot_",
    "quiver_",
    "table_",
    "text_",
    "image_",
    "spine_",
    "pane_",
    "eventplot_",
    "barcontainer_",
    "mpl_toolkits",
];

/// Naming rules that mark content as generated rather than hand-drawn.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NamingConvention {
    root_id: String,
    /// Lower-cased; matched case-insensitively
    generated_prefixes: Vec<String>,
}

impl NamingConvention {
    pub fn new<I, S>(root_id: impl Into<String>, generated_prefixes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            root_id: root_id.into(),
            generated_prefixes: generated_prefixes
                .into_iter()
                .map(|p| p.as_ref().to_lowercase())
                .collect(),
        }
    }

    /// The matplotlib convention: `figure_1` root and its prefix family.
    pub fn matplotlib() -> Self {
        Self::new(DEFAULT_ROOT_ID, MATPLOTLIB_PREFIXES)
    }

    pub fn root_id(&self) -> &str {
        &self.root_id
    }

    pub fn generated_prefixes(&self) -> &[String] {
        &self.generated_prefixes
    }

    /// True if `id` starts with one of the generated prefixes, ignoring case.
    pub fn looks_generated(&self, id: &str) -> bool {
        let lid = id.to_lowercase();
        self.generated_prefixes.iter().any(|p| lid.starts_with(p))
    }

    /// True for the root container and anything that looks generated.
    pub fn is_excluded(&self, id: &str) -> bool {
        id == self.root_id || self.looks_generated(id)
    }
}

impl Default for NamingConvention {
    fn default() -> Self {
        Self::matplotlib()
    }
}

/// Find the overlay groups of `document`, ordered by source position.
///
/// Nested qualifying groups are pruned so that only the outermost of any
/// containment chain survives.
pub fn discover_candidates<'a, 'input>(
    document: &'a SvgDocument<'input>,
    convention: &NamingConvention,
) -> Vec<CandidateGroup<'a, 'input>> {
    let text = document.text();
    let root_marker = format!(r#"id="{}""#, convention.root_id());

    // Elements that are excluded themselves or sit below an excluded element.
    // Document order visits parents first, so one lookup per node suffices.
    let mut excluded: HashSet<NodeId> = HashSet::new();
    let mut raw: Vec<CandidateGroup<'a, 'input>> = Vec::new();

    for node in document.tree().root_element().descendants() {
        if !node.is_element() {
            continue;
        }
        let id = node.attribute("id").filter(|id| !id.is_empty());
        let inherited = node
            .parent_element()
            .is_some_and(|parent| excluded.contains(&parent.id()));
        if inherited || id.is_some_and(|id| convention.is_excluded(id)) {
            excluded.insert(node.id());
        }

        if node.tag_name().name() != GROUP_TAG {
            continue;
        }
        let Some(id) = id else {
            continue;
        };
        if excluded.contains(&node.id()) {
            trace!("skip {id}: generated content");
            continue;
        }
        if node.attributes().count() == 1 {
            trace!("skip {id}: bare wrapper");
            continue;
        }

        let Some(span) = locate_block(text, id, GROUP_TAG) else {
            warn!("skip {id}: cannot extract a balanced group");
            continue;
        };
        let snippet = span.slice(text);
        if snippet.contains(&root_marker) {
            debug!("skip {id}: would capture {}", convention.root_id());
            continue;
        }
        raw.push(CandidateGroup {
            id: id.to_string(),
            node,
            snippet,
            span,
        });
    }

    raw.sort_by_key(|cand| cand.start());

    let mut candidates: Vec<CandidateGroup<'a, 'input>> = Vec::with_capacity(raw.len());
    for cand in raw {
        if candidates.iter().any(|kept| cand.span.is_within(&kept.span)) {
            trace!("skip {}: nested in an earlier candidate", cand.id);
            continue;
        }
        candidates.push(cand);
    }
    debug!("discover_candidates: {} candidates", candidates.len());
    candidates
}
