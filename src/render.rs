//! Output formatting for gate summaries.
//!
//! The same `GateSummary` renders as an aligned console table, as the
//! markdown step-summary table CI surfaces expect, or as JSON for
//! machine consumers.

use std::fmt::Write;

use serde::Serialize;

use crate::model::{CoverageTotals, EmptyDenominator, Metric};
use crate::threshold::{ThresholdFailure, Thresholds};

/// Which aggregation scope a summary describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Overall,
    Changed,
}

/// One metric row of the summary table.
#[derive(Debug, Serialize)]
pub struct MetricRow {
    pub metric: &'static str,
    pub percent: f64,
    pub covered: u64,
    pub missed: u64,
    pub total: u64,
    pub minimum: f64,
}

/// One metric below its minimum.
#[derive(Debug, Serialize)]
pub struct FailureRow {
    pub metric: &'static str,
    pub actual: f64,
    pub required: f64,
}

/// Everything the renderers need, independent of output style.
#[derive(Debug, Serialize)]
pub struct GateSummary {
    pub scope: Scope,
    pub rows: Vec<MetricRow>,
    pub failures: Vec<FailureRow>,
    /// Changed scope only: files that contributed non-zero data.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub analyzed_files: Option<usize>,
    pub has_data: bool,
}

/// Assemble a summary from totals, thresholds, and evaluation results.
#[must_use]
pub fn build_summary(
    scope: Scope,
    totals: &CoverageTotals,
    thresholds: &Thresholds,
    failures: &[ThresholdFailure],
    analyzed_files: Option<usize>,
    empty: EmptyDenominator,
) -> GateSummary {
    let rows: Vec<MetricRow> = Metric::ALL
        .iter()
        .map(|&metric| {
            let counter = totals.get(metric);
            MetricRow {
                metric: metric.as_str(),
                percent: counter.percent(empty),
                covered: counter.covered,
                missed: counter.missed,
                total: counter.total(),
                minimum: thresholds.get(metric),
            }
        })
        .collect();

    let has_data = rows.iter().any(|r| r.total > 0);
    GateSummary {
        scope,
        rows,
        failures: failures
            .iter()
            .map(|f| FailureRow {
                metric: f.metric.as_str(),
                actual: f.actual,
                required: f.required,
            })
            .collect(),
        analyzed_files,
        has_data,
    }
}

/// Trait for formatting gate summaries.
pub trait SummaryFormatter {
    /// Format the summary to a string.
    fn format(&self, summary: &GateSummary) -> String;
}

/// Plain text formatter for console output.
pub struct TextFormatter;

impl SummaryFormatter for TextFormatter {
    fn format(&self, summary: &GateSummary) -> String {
        let mut out = String::new();
        let title = match summary.scope {
            Scope::Overall => "== Coverage Summary: overall ==",
            Scope::Changed => "== Coverage Summary: changed files ==",
        };
        writeln!(out, "{title}").unwrap();

        for row in &summary.rows {
            writeln!(
                out,
                "{:<11} covered={:>6} missed={:>6} pct={:>6.2}%  (min={:.2}%)",
                row.metric, row.covered, row.missed, row.percent, row.minimum
            )
            .unwrap();
        }
        if let Some(analyzed) = summary.analyzed_files {
            writeln!(out, "Analyzed changed files: {analyzed}").unwrap();
        }

        out.push('\n');
        if !summary.has_data {
            writeln!(out, "No coverage data available for this scope.").unwrap();
        } else if summary.failures.is_empty() {
            writeln!(out, "[OK] All coverage thresholds met.").unwrap();
        } else {
            writeln!(out, "[FAIL] Coverage below thresholds:").unwrap();
            for f in &summary.failures {
                writeln!(out, " - {} {:.2}% < {:.2}%", f.metric, f.actual, f.required).unwrap();
            }
        }
        out
    }
}

/// Markdown formatter for CI step summaries. The two scopes keep their
/// historical table layouts.
pub struct MarkdownFormatter;

impl SummaryFormatter for MarkdownFormatter {
    fn format(&self, summary: &GateSummary) -> String {
        let mut md = String::new();
        match summary.scope {
            Scope::Changed => {
                md.push_str("### 📊 Changed Files Coverage\n\n");
                if !summary.has_data {
                    md.push_str("ℹ️ No coverage data available for changed files\n\n");
                    return md;
                }
                md.push_str("| Metric | % | Covered | Missed | Total | Min % |\n");
                md.push_str("|---|---:|---:|---:|---:|---:|\n");
                for row in &summary.rows {
                    writeln!(
                        md,
                        "| {} | {:.2}% | {} | {} | {} | {:.2}% |",
                        row.metric, row.percent, row.covered, row.missed, row.total, row.minimum
                    )
                    .unwrap();
                }
                md.push('\n');
                if summary.failures.is_empty() {
                    md.push_str("✅ Changed-files coverage meets configured thresholds\n");
                } else {
                    md.push_str("❌ **Build Failed: Changed-files coverage below thresholds**\n");
                    for f in &summary.failures {
                        writeln!(md, "- {} {:.2}% < {:.2}%", f.metric, f.actual, f.required)
                            .unwrap();
                    }
                }
            }
            Scope::Overall => {
                md.push_str("### 📊 Code Coverage Report\n\n");
                md.push_str("| Counter | Covered | Missed | % | Min % |\n");
                md.push_str("|---|---:|---:|---:|---:|\n");
                for row in &summary.rows {
                    writeln!(
                        md,
                        "| {} | {} | {} | {:.2}% | {:.2}% |",
                        row.metric, row.covered, row.missed, row.percent, row.minimum
                    )
                    .unwrap();
                }
                md.push('\n');
                if summary.failures.is_empty() {
                    md.push_str("✅ Coverage meets all configured thresholds\n");
                } else {
                    md.push_str("❌ **Build Failed: Coverage below thresholds**\n");
                    for f in &summary.failures {
                        writeln!(md, "- {} {:.2}% < {:.2}%", f.metric, f.actual, f.required)
                            .unwrap();
                    }
                }
            }
        }
        md
    }
}

/// JSON formatter for machine consumers.
pub struct JsonFormatter;

impl SummaryFormatter for JsonFormatter {
    fn format(&self, summary: &GateSummary) -> String {
        let mut out = serde_json::to_string_pretty(summary).unwrap_or_default();
        out.push('\n');
        out
    }
}
