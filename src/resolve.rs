//! Per-metric counter resolution with strict source selection.
//!
//! Each metric has exactly one legitimate source per file: LINE and BRANCH
//! come from the sourcefile node (direct counter, else derived from line
//! records), INSTRUCTION/METHOD/CLASS exclusively from class counters.
//! Mixing two sources for the same metric would double-count, since every
//! level of a JaCoCo report is an independently complete counting system.

use crate::jacoco::{Class, SourceFile};
use crate::model::{Counter, CoverageTotals, Metric};

/// Where a resolved counter came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ResolutionSource {
    /// A `<counter>` directly on the node.
    DirectCounter,
    /// Derived from per-line `mi`/`ci`/`mb`/`cb` records.
    LineRecords,
    /// Summed from class-level counters.
    ClassCounters,
}

/// A counter together with the source it was resolved from.
#[derive(Debug, Clone, Copy)]
pub struct Resolved {
    pub counter: Counter,
    pub source: ResolutionSource,
}

/// Sum of all direct counters of the given metric on a node. Absent
/// counters resolve to (0, 0).
#[must_use]
pub fn direct_counter(counters: &[(Metric, Counter)], metric: Metric) -> Counter {
    counters
        .iter()
        .filter(|(m, _)| *m == metric)
        .fold(Counter::default(), |acc, (_, c)| acc.add(*c))
}

/// LINE coverage for a sourcefile: the direct counter when present,
/// otherwise derived from line records. A line is covered if any of its
/// instructions executed (`ci > 0`), missed if none did but instructions
/// exist (`mi > 0`); lines with neither are not instrumentable (comments,
/// blanks) and contribute to neither side.
#[must_use]
pub fn line_coverage(sf: &SourceFile) -> Resolved {
    let direct = direct_counter(&sf.counters, Metric::Line);
    if !direct.is_zero() {
        return Resolved {
            counter: direct,
            source: ResolutionSource::DirectCounter,
        };
    }

    let mut counter = Counter::default();
    for line in &sf.lines {
        if line.ci > 0 {
            counter.covered += 1;
        } else if line.mi > 0 {
            counter.missed += 1;
        }
    }
    Resolved {
        counter,
        source: ResolutionSource::LineRecords,
    }
}

/// BRANCH coverage for a sourcefile: the direct counter when present,
/// otherwise the raw `mb`/`cb` sums across line records (not a per-line
/// covered/missed classification).
#[must_use]
pub fn branch_coverage(sf: &SourceFile) -> Resolved {
    let direct = direct_counter(&sf.counters, Metric::Branch);
    if !direct.is_zero() {
        return Resolved {
            counter: direct,
            source: ResolutionSource::DirectCounter,
        };
    }

    let mut counter = Counter::default();
    for line in &sf.lines {
        counter.missed += line.mb;
        counter.covered += line.cb;
    }
    Resolved {
        counter,
        source: ResolutionSource::LineRecords,
    }
}

/// INSTRUCTION/METHOD/CLASS totals for one declaring file, summed over
/// every class whose `sourcefilename` matches (nested/inner types share a
/// file and must be summed, not replaced).
#[must_use]
pub fn class_counters(classes: &[Class], file_name: &str) -> CoverageTotals {
    let mut totals = CoverageTotals::new();
    for class in classes
        .iter()
        .filter(|c| c.source_file_name.as_deref() == Some(file_name))
    {
        for metric in [Metric::Instruction, Metric::Method, Metric::Class] {
            totals.add(metric, direct_counter(&class.counters, metric));
        }
    }
    totals
}
