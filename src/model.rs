//! Uniform in-memory representation of coverage counters, independent of
//! the XML report they came from. The aggregator and evaluator only ever
//! see these types.

use std::fmt;

/// The five JaCoCo counter types this tool consumes. COMPLEXITY and any
/// future types are ignored at parse time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Metric {
    Line,
    Branch,
    Instruction,
    Method,
    Class,
}

impl Metric {
    /// Fixed evaluation and display order.
    pub const ALL: [Metric; 5] = [
        Metric::Line,
        Metric::Branch,
        Metric::Instruction,
        Metric::Method,
        Metric::Class,
    ];

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Metric::Line => "LINE",
            Metric::Branch => "BRANCH",
            Metric::Instruction => "INSTRUCTION",
            Metric::Method => "METHOD",
            Metric::Class => "CLASS",
        }
    }

    /// Map a `type` attribute value to a metric, if it is one we consume.
    pub fn from_name(name: &str) -> Option<Metric> {
        match name {
            "LINE" => Some(Metric::Line),
            "BRANCH" => Some(Metric::Branch),
            "INSTRUCTION" => Some(Metric::Instruction),
            "METHOD" => Some(Metric::Method),
            "CLASS" => Some(Metric::Class),
            _ => None,
        }
    }

    fn index(self) -> usize {
        match self {
            Metric::Line => 0,
            Metric::Branch => 1,
            Metric::Instruction => 2,
            Metric::Method => 3,
            Metric::Class => 4,
        }
    }
}

impl fmt::Display for Metric {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// What a percentage means when a metric has no measurable units at all
/// (covered + missed == 0). The overall scope historically reports such
/// metrics as fully covered, the changed-files scope as uncovered; the
/// policy is explicit so each scope names its convention.
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum EmptyDenominator {
    /// 0/0 renders as 100%.
    FullyCovered,
    /// 0/0 renders as 0%.
    Uncovered,
}

/// A (missed, covered) pair for one metric on one scope.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Counter {
    pub missed: u64,
    pub covered: u64,
}

impl Counter {
    #[must_use]
    pub fn new(missed: u64, covered: u64) -> Self {
        Self { missed, covered }
    }

    #[must_use]
    pub fn total(self) -> u64 {
        self.missed + self.covered
    }

    #[must_use]
    pub fn is_zero(self) -> bool {
        self.missed == 0 && self.covered == 0
    }

    #[must_use]
    pub fn add(self, other: Counter) -> Counter {
        Counter {
            missed: self.missed + other.missed,
            covered: self.covered + other.covered,
        }
    }

    /// Coverage percentage, with the zero-denominator value chosen by `empty`.
    #[must_use]
    pub fn percent(self, empty: EmptyDenominator) -> f64 {
        let total = self.total();
        if total == 0 {
            match empty {
                EmptyDenominator::FullyCovered => 100.0,
                EmptyDenominator::Uncovered => 0.0,
            }
        } else {
            self.covered as f64 * 100.0 / total as f64
        }
    }
}

/// Per-metric counters for one aggregation scope. Mutated only by
/// addition, so merging is associative and commutative.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CoverageTotals {
    counters: [Counter; 5],
}

impl CoverageTotals {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, metric: Metric) -> Counter {
        self.counters[metric.index()]
    }

    pub fn add(&mut self, metric: Metric, counter: Counter) {
        let slot = &mut self.counters[metric.index()];
        *slot = slot.add(counter);
    }

    pub fn merge(&mut self, other: &CoverageTotals) {
        for metric in Metric::ALL {
            self.add(metric, other.get(metric));
        }
    }

    /// True when every metric is (0, 0).
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.counters.iter().all(|c| c.is_zero())
    }
}
