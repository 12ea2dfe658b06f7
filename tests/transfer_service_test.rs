//! Tests for TransferService
//!
//! Fixtures are a matplotlib rendering with hand-drawn overlays
//! (`annotated.svg`) and a fresh rendering of the same plot (`generated.svg`).

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use rstest::rstest;
use tempfile::TempDir;

use annotransfer::application::services::{TransferOptions, TransferService};
use annotransfer::application::AnnotationError;
use annotransfer::config::Settings;
use annotransfer::domain::{DomainError, NamingConvention, SvgDocument};
use annotransfer::infrastructure::traits::{FileSystem, RealFileSystem};
use annotransfer::infrastructure::ServiceContainer;
use annotransfer::util::testing::init_test_setup;

const ANNOTATED: &str = include_str!("fixtures/annotated.svg");
const GENERATED: &str = include_str!("fixtures/generated.svg");

/// Filesystem that counts writes and forwards everything to the real one.
#[derive(Default)]
struct RecordingFileSystem {
    inner: RealFileSystem,
    writes: AtomicUsize,
}

impl RecordingFileSystem {
    fn write_count(&self) -> usize {
        self.writes.load(Ordering::SeqCst)
    }
}

impl FileSystem for RecordingFileSystem {
    fn read_to_string(&self, path: &Path) -> std::io::Result<String> {
        self.inner.read_to_string(path)
    }

    fn write(&self, path: &Path, content: &str) -> std::io::Result<()> {
        self.writes.fetch_add(1, Ordering::SeqCst);
        self.inner.write(path, content)
    }

    fn is_file(&self, path: &Path) -> bool {
        self.inner.is_file(path)
    }
}

fn service() -> TransferService {
    TransferService::new(Arc::new(RealFileSystem), NamingConvention::matplotlib())
}

/// Write source and target fixtures into `temp`.
fn setup_pair(temp: &TempDir, source: &str, target: &str) -> (PathBuf, PathBuf) {
    let source_path = temp.path().join("annotated.svg");
    let target_path = temp.path().join("generated.svg");
    std::fs::write(&source_path, source).unwrap();
    std::fs::write(&target_path, target).unwrap();
    (source_path, target_path)
}

fn strings(items: &[&str]) -> Vec<String> {
    items.iter().map(|s| s.to_string()).collect()
}

// ============================================================
// list_overlay_groups() tests
// ============================================================

#[test]
fn given_annotated_plot_when_listing_then_returns_outer_overlays_in_source_order() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let (source, _) = setup_pair(&temp, ANNOTATED, GENERATED);

    // Act
    let ids = service().list_overlay_groups(&source).unwrap();

    // Assert
    assert_eq!(ids, strings(&["annotation_1", "highlight"]));
}

#[test]
fn given_fresh_plot_when_listing_then_returns_empty() {
    let temp = TempDir::new().unwrap();
    let (_, target) = setup_pair(&temp, ANNOTATED, GENERATED);

    let ids = service().list_overlay_groups(&target).unwrap();

    assert!(ids.is_empty());
}

#[test]
fn given_missing_file_when_listing_then_returns_source_not_found() {
    let temp = TempDir::new().unwrap();
    let missing = temp.path().join("nope.svg");

    let result = service().list_overlay_groups(&missing);

    assert!(matches!(result, Err(AnnotationError::SourceNotFound(p)) if p == missing));
}

#[test]
fn given_malformed_file_when_listing_then_returns_parse_error() {
    let temp = TempDir::new().unwrap();
    let (source, _) = setup_pair(&temp, "<svg><g id=\"a\" class=\"c\"></svg>", GENERATED);

    let result = service().list_overlay_groups(&source);

    assert!(matches!(result, Err(AnnotationError::Parse { .. })));
}

// ============================================================
// copy_annotations() tests
// ============================================================

#[test]
fn given_fresh_target_when_copying_then_inserts_groups_and_referenced_definitions() {
    // Arrange
    init_test_setup();
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);

    // Act
    let report = service()
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    // Assert
    assert_eq!(report.copied, strings(&["annotation_1", "highlight"]));
    assert_eq!(report.definitions, strings(&["arrow1", "glow"]));
    assert!(report.written);

    let out = std::fs::read_to_string(&target).unwrap();
    assert!(out.contains(
        r#"<marker id="arrow1" refX="0" refY="0" orient="auto" style="overflow:visible"/>"#
    ));
    assert!(out.contains(r#"<filter id="glow"><feGaussianBlur stdDeviation="2"/></filter>"#));
    assert!(out.contains(r#"<g id="annotation_1" style="stroke: #d62728; stroke-width: 1.5">"#));
    assert!(out.contains(r#"<g id="highlight" transform="translate(60 20)">"#));

    // definitions land in the first defs section, before any group
    let marker_at = out.find(r#"id="arrow1""#).unwrap();
    let first_defs_close = out.find("</defs>").unwrap();
    assert!(marker_at < first_defs_close);
    assert!(out.find(r#"id="annotation_1""#).unwrap() < out.find(r#"id="highlight""#).unwrap());

    // generated content and non-overlays stay as they were
    assert!(out.contains(r#"<path d="M 10 80 L 50 40 L 90 35""#));
    assert!(!out.contains("callout_in_text"));
    assert!(!out.contains(r#"id="wrapper""#));
    assert_eq!(out.matches(r#"id="p1""#).count(), 1);
    assert!(out.starts_with(r#"<?xml version="1.0" encoding="utf-8" standalone="no"?>"#));
    assert!(out.ends_with("</svg>\n"));

    // and the result is still well-formed
    assert!(SvgDocument::parse(&out).is_ok());
}

#[test]
fn given_copied_target_when_copying_again_then_nothing_changes() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let svc = service();
    svc.copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();
    let after_first = std::fs::read_to_string(&target).unwrap();

    // Act
    let report = svc
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    // Assert
    assert!(report.copied.is_empty());
    assert!(report.is_unchanged());
    assert!(!report.written);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), after_first);
}

#[test]
fn given_stale_group_in_target_when_copying_then_replaces_it_in_place() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let svc = service();
    svc.copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();
    let fresh = std::fs::read_to_string(&target).unwrap();
    let stale = fresh.replace("M 20 20 L 45 48", "M 0 0 L 1 1");
    std::fs::write(&target, &stale).unwrap();

    // Act
    let second = svc
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();
    let third = svc
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    // Assert
    assert_eq!(second.copied, strings(&["annotation_1"]));
    assert!(second.definitions.is_empty());
    assert!(third.copied.is_empty());
    let out = std::fs::read_to_string(&target).unwrap();
    assert_eq!(out, fresh);
    assert_eq!(out.matches(r#"id="annotation_1""#).count(), 1);
}

#[test]
fn given_stale_definition_only_when_copying_then_writes_without_copied_groups() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let svc = service();
    svc.copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();
    let fresh = std::fs::read_to_string(&target).unwrap();
    std::fs::write(
        &target,
        fresh.replace(r#"refX="0" refY="0" orient="auto""#, r#"refX="5" refY="0" orient="auto""#),
    )
    .unwrap();

    // Act
    let report = svc
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    // Assert
    assert!(report.copied.is_empty());
    assert_eq!(report.definitions, strings(&["arrow1"]));
    assert!(report.written);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), fresh);
}

#[test]
fn given_dry_run_when_copying_then_reports_changes_without_writing() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let fs = Arc::new(RecordingFileSystem::default());
    let svc = TransferService::new(fs.clone(), NamingConvention::matplotlib());
    let options = TransferOptions {
        dry_run: true,
        ..Default::default()
    };

    // Act
    let report = svc.copy_annotations(&source, &target, &options).unwrap();

    // Assert
    assert_eq!(report.copied, strings(&["annotation_1", "highlight"]));
    assert!(!report.written);
    assert_eq!(fs.write_count(), 0);
    assert_eq!(std::fs::read_to_string(&target).unwrap(), GENERATED);
}

#[test]
fn given_changes_when_copying_then_writes_target_exactly_once() {
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let fs = Arc::new(RecordingFileSystem::default());
    let svc = TransferService::new(fs.clone(), NamingConvention::matplotlib());

    svc.copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();
    svc.copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    assert_eq!(fs.write_count(), 1);
}

#[rstest]
#[case::include_only(&["highlight"], &[], &["highlight"], &["glow"])]
#[case::exclude_only(&[], &["highlight"], &["annotation_1"], &["arrow1"])]
#[case::include_then_exclude(&["annotation_1", "highlight"], &["annotation_1"], &["highlight"], &["glow"])]
#[case::unknown_include_ignored(&["highlight", "no_such_group"], &[], &["highlight"], &["glow"])]
fn given_filters_when_copying_then_only_selected_groups_travel(
    #[case] include: &[&str],
    #[case] exclude: &[&str],
    #[case] expected_groups: &[&str],
    #[case] expected_definitions: &[&str],
) {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let options = TransferOptions {
        include: strings(include),
        exclude: strings(exclude),
        dry_run: false,
    };

    // Act
    let report = service()
        .copy_annotations(&source, &target, &options)
        .unwrap();

    // Assert
    assert_eq!(report.copied, strings(expected_groups));
    assert_eq!(report.definitions, strings(expected_definitions));
}

#[rstest]
#[case::include_and_exclude_same(&["highlight"], &["highlight"])]
#[case::include_unknown(&["no_such_group"], &[])]
#[case::exclude_everything(&[], &["annotation_1", "highlight"])]
fn given_filters_leaving_nothing_when_copying_then_returns_no_candidates(
    #[case] include: &[&str],
    #[case] exclude: &[&str],
) {
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let options = TransferOptions {
        include: strings(include),
        exclude: strings(exclude),
        dry_run: false,
    };

    let result = service().copy_annotations(&source, &target, &options);

    assert!(matches!(result, Err(AnnotationError::NoCandidates)));
    assert_eq!(std::fs::read_to_string(&target).unwrap(), GENERATED);
}

#[test]
fn given_listed_groups_when_copying_then_each_id_is_in_target() {
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let svc = service();

    let ids = svc.list_overlay_groups(&source).unwrap();
    svc.copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    let out = std::fs::read_to_string(&target).unwrap();
    for id in ids {
        assert!(out.contains(&format!(r#"<g id="{id}""#)), "{id} missing");
    }
}

#[test]
fn given_arrow_scenario_when_copying_then_target_gains_marker_and_group() {
    // Arrange
    let source_svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
 <defs>
  <marker id="arrow1" orient="auto"/>
 </defs>
 <g id="figure_1" class="fig">
  <g id="axes_1"><path d="M 0 0"/></g>
 </g>
 <g id="annotation_1" style="stroke: red">
  <path d="M 1 1 L 2 2" marker-end="url(#arrow1)"/>
 </g>
</svg>
"#;
    let target_svg = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n <defs>\n </defs>\n <g id=\"figure_1\" class=\"fig\">\n  <g id=\"axes_1\"><path d=\"M 0 1\"/></g>\n </g>\n</svg>\n";
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, source_svg, target_svg);

    // Act
    let report = service()
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    // Assert
    assert_eq!(report.copied, strings(&["annotation_1"]));
    let out = std::fs::read_to_string(&target).unwrap();
    assert!(out.contains("<defs>\n \n<marker id=\"arrow1\" orient=\"auto\"/>\n</defs>"));
    assert!(out.contains("</g>\n </g>\n<g id=\"annotation_1\" style=\"stroke: red\">"));
    assert!(out.ends_with(" </g>\n</svg>\n"));
}

#[test]
fn given_root_group_with_attributes_when_copying_then_it_is_never_a_candidate() {
    let source_svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><defs/><g id="figure_1" class="fig" transform="scale(2)"><path/></g></svg>"#;
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, source_svg, GENERATED);
    let svc = service();

    assert!(svc.list_overlay_groups(&source).unwrap().is_empty());
    let result = svc.copy_annotations(&source, &target, &TransferOptions::default());
    assert!(matches!(result, Err(AnnotationError::NoCandidates)));
}

// ============================================================
// copy_annotations() failure tests
// ============================================================

#[test]
fn given_missing_source_when_copying_then_returns_source_not_found() {
    let temp = TempDir::new().unwrap();
    let (_, target) = setup_pair(&temp, ANNOTATED, GENERATED);
    let missing = temp.path().join("gone.svg");

    let result = service().copy_annotations(&missing, &target, &TransferOptions::default());

    assert!(matches!(result, Err(AnnotationError::SourceNotFound(p)) if p == missing));
}

#[test]
fn given_both_missing_when_copying_then_source_is_reported_first() {
    let temp = TempDir::new().unwrap();
    let source = temp.path().join("a.svg");
    let target = temp.path().join("b.svg");

    let result = service().copy_annotations(&source, &target, &TransferOptions::default());

    assert!(matches!(result, Err(AnnotationError::SourceNotFound(_))));
}

#[test]
fn given_missing_target_when_copying_then_returns_target_not_found() {
    let temp = TempDir::new().unwrap();
    let (source, _) = setup_pair(&temp, ANNOTATED, GENERATED);
    let missing = temp.path().join("gone.svg");

    let result = service().copy_annotations(&source, &missing, &TransferOptions::default());

    assert!(matches!(result, Err(AnnotationError::TargetNotFound(p)) if p == missing));
    assert!(!missing.exists());
}

#[test]
fn given_directory_as_target_when_copying_then_returns_target_not_found() {
    // Arrange
    let temp = TempDir::new().unwrap();
    let (source, _) = setup_pair(&temp, ANNOTATED, GENERATED);
    let dir_target = temp.path().join("plots");
    std::fs::create_dir(&dir_target).unwrap();

    // Act
    let result = service().copy_annotations(&source, &dir_target, &TransferOptions::default());

    // Assert
    assert!(matches!(result, Err(AnnotationError::TargetNotFound(p)) if p == dir_target));
}

#[test]
fn given_directory_when_listing_then_returns_source_not_found() {
    let temp = TempDir::new().unwrap();

    let result = service().list_overlay_groups(temp.path());

    assert!(matches!(result, Err(AnnotationError::SourceNotFound(_))));
}

#[test]
fn given_malformed_source_when_copying_then_returns_parse_error() {
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, "<svg><g id=\"a\">", GENERATED);

    let result = service().copy_annotations(&source, &target, &TransferOptions::default());

    let err = result.unwrap_err();
    assert!(matches!(err, AnnotationError::Parse { .. }));
    assert!(err.to_string().starts_with("could not parse "));
}

#[test]
fn given_target_without_defs_when_copying_then_fails_and_leaves_target() {
    let target_svg = "<svg xmlns=\"http://www.w3.org/2000/svg\">\n</svg>\n";
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, ANNOTATED, target_svg);

    let result = service().copy_annotations(&source, &target, &TransferOptions::default());

    let err = result.unwrap_err();
    assert!(matches!(err, AnnotationError::Domain(DomainError::MissingDefs)));
    assert_eq!(
        err.to_string(),
        "destination SVG missing </defs> tag for annotation defs"
    );
    assert_eq!(std::fs::read_to_string(&target).unwrap(), target_svg);
}

#[test]
fn given_group_without_references_and_no_markers_when_copying_then_no_insertion_point() {
    let source_svg = r#"<svg xmlns="http://www.w3.org/2000/svg"><g id="note" class="n"><rect/></g></svg>"#;
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, source_svg, "<html></html>");

    let result = service().copy_annotations(&source, &target, &TransferOptions::default());

    assert!(matches!(
        result,
        Err(AnnotationError::Domain(DomainError::NoInsertionPoint))
    ));
}

#[test]
fn given_unresolvable_reference_when_copying_then_group_still_travels() {
    let source_svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
 <g id="note" class="n"><path filter="url(#missing)"/></g>
</svg>
"#;
    let temp = TempDir::new().unwrap();
    let (source, target) = setup_pair(&temp, source_svg, GENERATED);

    let report = service()
        .copy_annotations(&source, &target, &TransferOptions::default())
        .unwrap();

    assert_eq!(report.copied, strings(&["note"]));
    assert!(report.definitions.is_empty());
}

// ============================================================
// Wiring
// ============================================================

#[test]
fn given_default_settings_when_building_container_then_uses_matplotlib_convention() {
    let fs: Arc<dyn FileSystem> = Arc::new(RecordingFileSystem::default());

    let container = ServiceContainer::with_deps(Settings::default(), fs);

    assert_eq!(container.transfer.convention(), &NamingConvention::matplotlib());
    assert_eq!(container.settings.conventions.root_id, "figure_1");
}

#[test]
fn given_custom_convention_when_copying_then_generated_prefixes_follow_it() {
    let source_svg = r#"<svg xmlns="http://www.w3.org/2000/svg">
 <defs/>
 <g id="canvas" class="c"><g id="note_inner" class="n"/></g>
 <g id="auto_3" class="a"/>
 <g id="axes_1" class="manual"/>
</svg>
"#;
    let temp = TempDir::new().unwrap();
    let (source, _) = setup_pair(&temp, source_svg, GENERATED);
    let mut settings = Settings::default();
    settings.conventions.root_id = "canvas".into();
    settings.conventions.generated_prefixes = strings(&["auto_"]);

    let container = ServiceContainer::with_deps(settings, Arc::new(RealFileSystem));
    let ids = container.transfer.list_overlay_groups(&source).unwrap();

    assert_eq!(ids, strings(&["axes_1"]));
}
