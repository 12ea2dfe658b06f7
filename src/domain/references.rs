//! Reference discovery for overlay groups
//!
//! An overlay only renders the same in another document if the markers,
//! clip paths, filters and path effects it points at travel with it.

use std::sync::OnceLock;

use itertools::Itertools;
use regex::Regex;
use roxmltree::Node;

/// Attributes whose plain `#id` value is a reference.
const REFERENCE_ATTRIBUTES: &[&str] = &[
    "marker-start",
    "marker-mid",
    "marker-end",
    "filter",
    "clip-path",
];

fn re_url_reference() -> &'static Regex {
    static ONCE: OnceLock<Regex> = OnceLock::new();
    ONCE.get_or_init(|| Regex::new(r"url\(#([^)]+)\)").unwrap())
}

fn is_reference_attribute(name: &str) -> bool {
    name.contains("path-effect") || REFERENCE_ATTRIBUTES.contains(&name)
}

/// Identifiers referenced by one attribute, in order of appearance.
fn attribute_references(name: &str, value: &str) -> Vec<String> {
    let mut refs: Vec<String> = re_url_reference()
        .captures_iter(value)
        .filter_map(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .collect();
    if is_reference_attribute(name) {
        if let Some(direct) = value.strip_prefix('#') {
            refs.push(direct.to_string());
        }
    }
    refs
}

/// Every identifier referenced from `node` or its descendants.
///
/// Ordered by first encounter in document order, without duplicates.
pub fn collect_references(node: Node<'_, '_>) -> Vec<String> {
    node.descendants()
        .filter(|n| n.is_element())
        .flat_map(|n| {
            n.attributes()
                .flat_map(|attr| attribute_references(attr.name(), attr.value()))
                .collect::<Vec<_>>()
        })
        .unique()
        .collect()
}
