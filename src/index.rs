//! Fast-lookup structures over a parsed report.
//!
//! Built once per run, read-only afterwards. The report tree is consumed
//! during the build; only the index survives. Packages keep their report
//! declaration order so the aggregator's fallback scan is deterministic.

use std::collections::HashMap;

use crate::jacoco::{Class, Report, SourceFile};
use crate::model::{Counter, Metric};

/// One package's lookup state: sourcefiles by name, classes in order.
#[derive(Debug, Default)]
pub struct PackageIndex {
    name: String,
    counters: Vec<(Metric, Counter)>,
    files: HashMap<String, SourceFile>,
    classes: Vec<Class>,
}

impl PackageIndex {
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Package-level counters, used by the overall scope.
    #[must_use]
    pub fn counters(&self) -> &[(Metric, Counter)] {
        &self.counters
    }

    #[must_use]
    pub fn source_file(&self, file_name: &str) -> Option<&SourceFile> {
        self.files.get(file_name)
    }

    #[must_use]
    pub fn classes(&self) -> &[Class] {
        &self.classes
    }
}

/// The two mappings the aggregator needs, plus the report/package-level
/// counters the overall scope needs.
#[derive(Debug, Default)]
pub struct ReportIndex {
    report_counters: Vec<(Metric, Counter)>,
    packages: Vec<PackageIndex>,
    by_name: HashMap<String, usize>,
    has_counters: bool,
}

impl ReportIndex {
    /// Consume a parsed report and build the index. Every package is
    /// registered even when empty, so lookups never need existence checks
    /// on the package key. Sourcefiles without a name are skipped.
    #[must_use]
    pub fn build(report: Report) -> Self {
        let mut index = ReportIndex {
            has_counters: !report.counters.is_empty(),
            report_counters: report.counters,
            ..ReportIndex::default()
        };

        for package in report.packages {
            index.has_counters |= !package.counters.is_empty();
            for sf in &package.source_files {
                index.has_counters |= !sf.counters.is_empty();
            }
            for cls in &package.classes {
                index.has_counters |= !cls.counters.is_empty();
            }

            let slot = match index.by_name.get(&package.name) {
                Some(&i) => &mut index.packages[i],
                None => {
                    index
                        .by_name
                        .insert(package.name.clone(), index.packages.len());
                    index.packages.push(PackageIndex {
                        name: package.name,
                        ..PackageIndex::default()
                    });
                    index.packages.last_mut().unwrap()
                }
            };
            slot.counters.extend(package.counters);
            for sf in package.source_files {
                if let Some(name) = sf.name.clone() {
                    slot.files.insert(name, sf);
                }
            }
            slot.classes.extend(package.classes);
        }

        index
    }

    #[must_use]
    pub fn package(&self, name: &str) -> Option<&PackageIndex> {
        self.by_name.get(name).map(|&i| &self.packages[i])
    }

    /// All packages, in report declaration order.
    #[must_use]
    pub fn packages(&self) -> &[PackageIndex] {
        &self.packages
    }

    /// Counters that were direct children of the report root.
    #[must_use]
    pub fn report_counters(&self) -> &[(Metric, Counter)] {
        &self.report_counters
    }

    /// Whether any recognized counter exists anywhere in the document.
    #[must_use]
    pub fn has_counters(&self) -> bool {
        self.has_counters
    }
}
