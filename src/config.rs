//! Threshold configuration with documented precedence:
//! explicit CLI flag > `MIN_<METRIC>` environment variable > 0 (disabled).
//!
//! Resolution is split into a pure function over the raw values so tests
//! never touch process environment; only [`resolve_thresholds`] reads it.
//! The core components accept the resolved [`Thresholds`] struct only.

use crate::model::Metric;
use crate::threshold::Thresholds;

/// Unresolved per-metric minimums as they arrive from the CLI.
#[derive(Debug, Clone, Copy, Default)]
pub struct ThresholdOverrides {
    pub line: Option<f64>,
    pub branch: Option<f64>,
    pub instruction: Option<f64>,
    pub method: Option<f64>,
    pub class: Option<f64>,
}

impl ThresholdOverrides {
    fn get(&self, metric: Metric) -> Option<f64> {
        match metric {
            Metric::Line => self.line,
            Metric::Branch => self.branch,
            Metric::Instruction => self.instruction,
            Metric::Method => self.method,
            Metric::Class => self.class,
        }
    }
}

/// Environment variable consulted when no explicit flag is given.
#[must_use]
pub fn env_var_name(metric: Metric) -> String {
    format!("MIN_{}", metric.as_str())
}

/// Resolve one threshold from an explicit value and a raw environment
/// value. Invalid or empty environment values disable the check with a
/// warning, they never abort.
#[must_use]
pub fn resolve_threshold(explicit: Option<f64>, env_value: Option<&str>, var: &str) -> f64 {
    if let Some(value) = explicit {
        return value;
    }
    if let Some(raw) = env_value {
        if !raw.is_empty() {
            match raw.parse::<f64>() {
                Ok(value) => return value,
                Err(_) => {
                    eprintln!("[WARN] Invalid {var} value '{raw}', defaulting to 0");
                }
            }
        }
    }
    0.0
}

/// Resolve all five thresholds, consulting the process environment for
/// metrics without an explicit flag.
#[must_use]
pub fn resolve_thresholds(overrides: &ThresholdOverrides) -> Thresholds {
    let resolve = |metric: Metric| {
        let var = env_var_name(metric);
        let env_value = std::env::var(&var).ok();
        resolve_threshold(overrides.get(metric), env_value.as_deref(), &var)
    };
    Thresholds {
        line: resolve(Metric::Line),
        branch: resolve(Metric::Branch),
        instruction: resolve(Metric::Instruction),
        method: resolve(Metric::Method),
        class: resolve(Metric::Class),
    }
}
