//! Minimum-percentage gating over aggregated totals.

use crate::model::{CoverageTotals, EmptyDenominator, Metric};

/// Guards float rounding at exact threshold equality.
pub const EPSILON: f64 = 1e-9;

/// Minimum percentages per metric; 0 disables that metric's check.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct Thresholds {
    pub line: f64,
    pub branch: f64,
    pub instruction: f64,
    pub method: f64,
    pub class: f64,
}

impl Thresholds {
    #[must_use]
    pub fn get(&self, metric: Metric) -> f64 {
        match metric {
            Metric::Line => self.line,
            Metric::Branch => self.branch,
            Metric::Instruction => self.instruction,
            Metric::Method => self.method,
            Metric::Class => self.class,
        }
    }
}

/// One metric below its configured minimum.
#[derive(Debug, Clone, PartialEq)]
pub struct ThresholdFailure {
    pub metric: Metric,
    pub actual: f64,
    pub required: f64,
}

/// Epsilon-guarded comparison: an actual within `EPSILON` of the required
/// minimum passes.
#[must_use]
pub fn meets(actual: f64, required: f64) -> bool {
    actual + EPSILON >= required
}

/// Check totals against thresholds, in fixed metric order. A metric fails
/// only if its threshold is non-zero AND it has measurable units AND its
/// percentage is below the minimum. The zero-denominator guard means the
/// `empty` display policy can never flip a verdict.
#[must_use]
pub fn evaluate(
    totals: &CoverageTotals,
    thresholds: &Thresholds,
    empty: EmptyDenominator,
) -> Vec<ThresholdFailure> {
    let mut failures = Vec::new();
    for metric in Metric::ALL {
        let required = thresholds.get(metric);
        let counter = totals.get(metric);
        if required <= 0.0 || counter.total() == 0 {
            continue;
        }
        let actual = counter.percent(empty);
        if !meets(actual, required) {
            failures.push(ThresholdFailure {
                metric,
                actual,
                required,
            });
        }
    }
    failures
}
