//! Domain layer: documents, fragments and the text algorithms over them
//!
//! This layer is independent of external concerns (no I/O, no CLI, no config loading).

pub mod classify;
pub mod document;
pub mod entities;
pub mod error;
pub mod expression;
pub mod merge;
pub mod references;
pub mod span;

pub use classify::{
    discover_candidates, NamingConvention, DEFAULT_ROOT_ID, GROUP_TAG, MATPLOTLIB_PREFIXES,
};
pub use document::SvgDocument;
pub use entities::{CandidateGroup, DefinitionFragment};
pub use error::DomainError;
pub use expression::{is_expression, parse_expression};
pub use merge::{insert_or_replace, FragmentClass, MergeOutcome};
pub use references::collect_references;
pub use span::{locate_block, locate_single_tag, TagSpan};
