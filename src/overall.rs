//! Overall-scope totals without double counting.
//!
//! Strategy: if report-level counters exist, use ONLY those; otherwise sum
//! ONLY package-level counters. A document with no recognized counters at
//! any level has nothing to check and is rejected.

use crate::error::{CovgateError, Result};
use crate::index::ReportIndex;
use crate::model::CoverageTotals;

pub fn overall_totals(index: &ReportIndex) -> Result<CoverageTotals> {
    let mut totals = CoverageTotals::new();

    if !index.report_counters().is_empty() {
        for &(metric, counter) in index.report_counters() {
            totals.add(metric, counter);
        }
        return Ok(totals);
    }

    for pkg in index.packages() {
        for &(metric, counter) in pkg.counters() {
            totals.add(metric, counter);
        }
    }

    if totals.is_empty() && !index.has_counters() {
        return Err(CovgateError::NoUsableCounters);
    }
    Ok(totals)
}
