//! Changed-file coverage aggregation.
//!
//! Maps each changed path to a package and file name, resolves per-file
//! counters through the index, and accumulates a grand total. A file with
//! no data anywhere in the report contributes nothing and is excluded from
//! the analyzed count: "no data" is not "no coverage".

use crate::index::{PackageIndex, ReportIndex};
use crate::model::{CoverageTotals, Metric};
use crate::resolve;

/// Per-file resolution outcome, kept for diagnostic output.
#[derive(Debug)]
pub struct FileReport {
    /// Path relative to the source root.
    pub path: String,
    pub totals: CoverageTotals,
    /// Set when the file was matched via the package-fallback scan,
    /// naming the package that matched.
    pub fallback_package: Option<String>,
}

/// Aggregated changed-files coverage.
#[derive(Debug, Default)]
pub struct ChangedCoverage {
    pub totals: CoverageTotals,
    /// Files that contributed non-zero data to the totals.
    pub analyzed: usize,
    pub files: Vec<FileReport>,
}

impl ChangedCoverage {
    /// Whether any changed file contributed data at all.
    #[must_use]
    pub fn has_data(&self) -> bool {
        !self.totals.is_empty()
    }
}

/// Aggregate coverage over the changed-file list. Paths without the
/// `source_ext` extension or the `src_root` prefix are skipped silently.
/// Per-metric addition is independent, so processing order does not
/// affect the totals.
#[must_use]
pub fn aggregate_changed(
    index: &ReportIndex,
    changed: &[String],
    src_root: &str,
    source_ext: &str,
) -> ChangedCoverage {
    let prefix = normalize_root(src_root);
    let mut out = ChangedCoverage::default();

    for path in changed {
        if !path.ends_with(source_ext) {
            continue;
        }
        let Some(rel) = path.strip_prefix(&prefix) else {
            continue;
        };
        if rel.is_empty() {
            continue;
        }
        let (package, file_name) = split_package(rel);

        let (totals, fallback_package) = resolve_file(index, package, file_name);
        if !totals.is_empty() {
            out.analyzed += 1;
            out.totals.merge(&totals);
        }
        out.files.push(FileReport {
            path: rel.to_string(),
            totals,
            fallback_package,
        });
    }

    out
}

/// Normalize the source root to end with exactly one separator.
fn normalize_root(root: &str) -> String {
    format!("{}/", root.trim_end_matches('/'))
}

/// Split a root-relative path into (package path, file name).
fn split_package(rel: &str) -> (&str, &str) {
    match rel.rfind('/') {
        Some(i) => (&rel[..i], &rel[i + 1..]),
        None => ("", rel),
    }
}

/// Resolve one file's totals: exact package first, then the fallback scan
/// over every package in report declaration order. The first resolution
/// with non-all-zero totals wins; each candidate starts from fresh totals
/// so counters are never counted twice.
fn resolve_file(
    index: &ReportIndex,
    package: &str,
    file_name: &str,
) -> (CoverageTotals, Option<String>) {
    if let Some(pkg) = index.package(package) {
        if let Some(totals) = resolve_in_package(pkg, file_name) {
            if !totals.is_empty() {
                return (totals, None);
            }
        }
    }

    // Fallback for reports whose package granularity does not match the
    // derived path. Ambiguous when the same file name recurs in unrelated
    // packages; the first declared match wins (known limitation).
    for pkg in index.packages() {
        if pkg.name() == package {
            continue;
        }
        if let Some(totals) = resolve_in_package(pkg, file_name) {
            if !totals.is_empty() {
                return (totals, Some(pkg.name().to_string()));
            }
        }
    }

    (CoverageTotals::new(), None)
}

/// Totals for a file within one candidate package: LINE/BRANCH from the
/// sourcefile entry, INSTRUCTION/METHOD/CLASS from matching classes.
/// `None` when the package has no sourcefile entry of that name.
fn resolve_in_package(pkg: &PackageIndex, file_name: &str) -> Option<CoverageTotals> {
    let sf = pkg.source_file(file_name)?;
    let mut totals = CoverageTotals::new();
    totals.add(Metric::Line, resolve::line_coverage(sf).counter);
    totals.add(Metric::Branch, resolve::branch_coverage(sf).counter);
    totals.merge(&resolve::class_counters(pkg.classes(), file_name));
    Some(totals)
}
