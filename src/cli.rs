//! Command handler functions for the covgate CLI.
//!
//! Each `cmd_*` function returns a [`GateOutcome`] holding the structured
//! summary and the exit status, making the handlers easy to test without
//! capturing stdout. Diagnostics go to stderr as they happen.

use std::path::Path;

use anyhow::{Context, Result};
use clap::ValueEnum;

use crate::aggregate::{self, ChangedCoverage};
use crate::index::ReportIndex;
use crate::jacoco;
use crate::model::{EmptyDenominator, Metric};
use crate::overall;
use crate::render::{self, GateSummary, Scope};
use crate::threshold::{self, Thresholds};

/// Output style for the summary printed to stdout.
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum Style {
    Text,
    Markdown,
    Json,
}

/// Process-level status; the exit code is the authoritative pass/fail
/// signal for automation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExitStatus {
    Success,
    ChangedBelowThreshold,
    OverallBelowThreshold,
    ReportUnreadable,
    NoCoverageData,
}

impl ExitStatus {
    #[must_use]
    pub fn code(self) -> i32 {
        match self {
            ExitStatus::Success => 0,
            ExitStatus::ChangedBelowThreshold => 1,
            ExitStatus::OverallBelowThreshold => 2,
            ExitStatus::ReportUnreadable => 3,
            ExitStatus::NoCoverageData => 4,
        }
    }
}

/// The result of one gate check.
#[derive(Debug)]
pub struct GateOutcome {
    pub summary: GateSummary,
    pub status: ExitStatus,
}

/// Options for the changed-files scope.
#[derive(Debug)]
pub struct ChangedOptions {
    /// Prefix to strip from changed paths, e.g. `backend/src/main/java`.
    pub src_root: String,
    /// Extension of files that participate in coverage, e.g. `.java`.
    pub source_ext: String,
    pub thresholds: Thresholds,
    pub empty: EmptyDenominator,
    /// Exit non-zero when no changed file matched any coverage data.
    pub fail_if_no_data: bool,
}

/// Check coverage restricted to a changed-file set.
pub fn cmd_changed(
    report_path: &Path,
    changed_path: &Path,
    opts: &ChangedOptions,
) -> Result<GateOutcome> {
    let report = jacoco::parse_file(report_path)
        .with_context(|| format!("Failed to load report '{}'", report_path.display()))?;
    let index = ReportIndex::build(report);

    let changed = read_changed_files(changed_path)?;
    let ext = normalize_ext(&opts.source_ext);
    let coverage = aggregate::aggregate_changed(&index, &changed, &opts.src_root, &ext);
    log_file_breakdown(&coverage);

    let failures = threshold::evaluate(&coverage.totals, &opts.thresholds, opts.empty);
    let summary = render::build_summary(
        Scope::Changed,
        &coverage.totals,
        &opts.thresholds,
        &failures,
        Some(coverage.analyzed),
        opts.empty,
    );

    let status = if !coverage.has_data() {
        if opts.fail_if_no_data {
            ExitStatus::NoCoverageData
        } else {
            ExitStatus::Success
        }
    } else if failures.is_empty() {
        ExitStatus::Success
    } else {
        ExitStatus::ChangedBelowThreshold
    };

    Ok(GateOutcome { summary, status })
}

/// Check overall repository coverage from the report totals.
pub fn cmd_overall(
    report_path: &Path,
    thresholds: &Thresholds,
    empty: EmptyDenominator,
) -> Result<GateOutcome> {
    let report = jacoco::parse_file(report_path)
        .with_context(|| format!("Failed to load report '{}'", report_path.display()))?;
    let index = ReportIndex::build(report);
    let totals = overall::overall_totals(&index)?;

    let failures = threshold::evaluate(&totals, thresholds, empty);
    let summary = render::build_summary(Scope::Overall, &totals, thresholds, &failures, None, empty);

    let status = if failures.is_empty() {
        ExitStatus::Success
    } else {
        ExitStatus::OverallBelowThreshold
    };

    Ok(GateOutcome { summary, status })
}

/// Read a newline-separated changed-file list; blank lines ignored.
pub fn read_changed_files(path: &Path) -> Result<Vec<String>> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read changed-files list '{}'", path.display()))?;
    Ok(content
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(String::from)
        .collect())
}

/// Ensure the extension filter starts with a dot.
fn normalize_ext(ext: &str) -> String {
    if ext.starts_with('.') {
        ext.to_string()
    } else {
        format!(".{ext}")
    }
}

/// Per-file resolution lines to stderr, including an explicit note when a
/// file was matched through the package-fallback scan.
fn log_file_breakdown(coverage: &ChangedCoverage) {
    for file in &coverage.files {
        let line = file.totals.get(Metric::Line);
        let branch = file.totals.get(Metric::Branch);
        let instruction = file.totals.get(Metric::Instruction);
        let method = file.totals.get(Metric::Method);
        let class = file.totals.get(Metric::Class);
        eprintln!(
            "coverage for {} -> LINE {}/{}, BR {}/{}, INS {}/{}, METH {}/{}, CLASS {}/{}",
            file.path,
            line.covered,
            line.missed,
            branch.covered,
            branch.missed,
            instruction.covered,
            instruction.missed,
            method.covered,
            method.missed,
            class.covered,
            class.missed,
        );
        if let Some(pkg) = &file.fallback_package {
            eprintln!("note: {} matched via fallback package '{pkg}'", file.path);
        }
    }
}
