mod common;

use covgate::cli::{cmd_changed, ChangedOptions, ExitStatus};
use covgate::model::EmptyDenominator;
use covgate::threshold::Thresholds;

fn opts(thresholds: Thresholds) -> ChangedOptions {
    ChangedOptions {
        src_root: "backend/src/main/java".to_string(),
        source_ext: ".java".to_string(),
        thresholds,
        empty: EmptyDenominator::Uncovered,
        fail_if_no_data: false,
    }
}

/// End-to-end: the documented gating scenario. A changed file with LINE
/// counter 8/2 and one matching class with INSTRUCTION 15/5 yields
/// LINE 80.00%, INSTRUCTION 75.00%, one analyzed file.
#[test]
fn changed_scope_end_to_end() {
    let dir = tempfile::tempdir().unwrap();
    let report = common::write_file(
        &dir,
        "jacoco.xml",
        include_bytes!("fixtures/sample_jacoco.xml"),
    );
    let changed = common::write_changed_list(&dir, &["backend/src/main/java/com/acme/Foo.java"]);

    let outcome = cmd_changed(
        &report,
        &changed,
        &opts(Thresholds {
            line: 80.0,
            instruction: 75.0,
            ..Thresholds::default()
        }),
    )
    .unwrap();

    assert_eq!(outcome.status, ExitStatus::Success);
    assert_eq!(outcome.summary.analyzed_files, Some(1));

    let line = outcome
        .summary
        .rows
        .iter()
        .find(|r| r.metric == "LINE")
        .unwrap();
    assert_eq!(line.covered, 8);
    assert_eq!(line.missed, 2);
    assert!((line.percent - 80.0).abs() < 1e-9);

    let instruction = outcome
        .summary
        .rows
        .iter()
        .find(|r| r.metric == "INSTRUCTION")
        .unwrap();
    assert!((instruction.percent - 75.0).abs() < 1e-9);
}

/// LINE and BRANCH derive from per-line records when the sourcefile has
/// no direct counters; INSTRUCTION/METHOD/CLASS still come from classes.
#[test]
fn changed_scope_derivation_fallbacks() {
    let dir = tempfile::tempdir().unwrap();
    let report = common::write_file(
        &dir,
        "jacoco.xml",
        include_bytes!("fixtures/derived_only.xml"),
    );
    let changed = common::write_changed_list(&dir, &["backend/src/main/java/com/acme/Foo.java"]);

    let outcome = cmd_changed(&report, &changed, &opts(Thresholds::default())).unwrap();

    assert_eq!(outcome.status, ExitStatus::Success);
    let row = |name: &str| {
        outcome
            .summary
            .rows
            .iter()
            .find(|r| r.metric == name)
            .unwrap()
    };
    // Lines 4 and 6 covered, line 3 missed, line 5 not instrumentable.
    assert_eq!((row("LINE").missed, row("LINE").covered), (1, 2));
    // Raw mb/cb sums: 1 missed, 3 covered.
    assert_eq!((row("BRANCH").missed, row("BRANCH").covered), (1, 3));
    assert_eq!(
        (row("INSTRUCTION").missed, row("INSTRUCTION").covered),
        (2, 8)
    );
}

/// Changed files absent from the report leave the analyzed count at zero
/// and yield the no-data outcome, which is success unless configured
/// otherwise — even with thresholds disabled at zero.
#[test]
fn changed_scope_no_data() {
    let dir = tempfile::tempdir().unwrap();
    let report = common::write_file(
        &dir,
        "jacoco.xml",
        include_bytes!("fixtures/sample_jacoco.xml"),
    );
    let changed = common::write_changed_list(
        &dir,
        &[
            "backend/src/main/java/com/acme/Untested.java",
            "docs/notes.md",
            "",
        ],
    );

    let outcome = cmd_changed(&report, &changed, &opts(Thresholds::default())).unwrap();
    assert_eq!(outcome.status, ExitStatus::Success);
    assert_eq!(outcome.summary.analyzed_files, Some(0));
    assert!(!outcome.summary.has_data);
    assert!(outcome.summary.failures.is_empty());

    let mut failing = opts(Thresholds::default());
    failing.fail_if_no_data = true;
    let outcome = cmd_changed(&report, &changed, &failing).unwrap();
    assert_eq!(outcome.status, ExitStatus::NoCoverageData);
}

/// A file found only through the package-fallback scan contributes its
/// counters exactly once and reports the matched package.
#[test]
fn changed_scope_fallback_package() {
    let dir = tempfile::tempdir().unwrap();
    let report = common::write_file(
        &dir,
        "jacoco.xml",
        include_bytes!("fixtures/sample_jacoco.xml"),
    );
    // The derived package is com/acme but Shaded.java only exists under
    // com/other in the report.
    let changed = common::write_changed_list(&dir, &["backend/src/main/java/com/acme/Shaded.java"]);

    let outcome = cmd_changed(&report, &changed, &opts(Thresholds::default())).unwrap();

    assert_eq!(outcome.summary.analyzed_files, Some(1));
    let line = outcome
        .summary
        .rows
        .iter()
        .find(|r| r.metric == "LINE")
        .unwrap();
    assert_eq!((line.missed, line.covered), (1, 3));
}

/// Malformed XML aborts with an error before any analysis.
#[test]
fn changed_scope_unreadable_report() {
    let dir = tempfile::tempdir().unwrap();
    let report = common::write_file(
        &dir,
        "jacoco.xml",
        include_bytes!("fixtures/malformed_jacoco.xml"),
    );
    let changed = common::write_changed_list(&dir, &["backend/src/main/java/com/acme/Foo.java"]);

    let result = cmd_changed(&report, &changed, &opts(Thresholds::default()));
    assert!(result.is_err());
    let err = result.unwrap_err();
    assert!(
        err.downcast_ref::<covgate::error::CovgateError>().is_some(),
        "error should carry the library error for exit-code mapping"
    );
}
