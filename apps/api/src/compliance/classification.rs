use std::fmt;

use serde::{Deserialize, Serialize};

/// Band a compliance rate falls into. Lower bounds are inclusive.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum ComplianceBand {
    FullyCompliant,
    MostlyCompliant,
    AtRisk,
    NonCompliant,
}

impl ComplianceBand {
    pub fn label(self) -> &'static str {
        match self {
            ComplianceBand::FullyCompliant => "Fully Compliant",
            ComplianceBand::MostlyCompliant => "Mostly Compliant",
            ComplianceBand::AtRisk => "At Risk",
            ComplianceBand::NonCompliant => "Non-Compliant",
        }
    }
}

impl fmt::Display for ComplianceBand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classifies a rate in percent.
pub fn classify_rate(rate: f64) -> ComplianceBand {
    match rate {
        r if r >= 100.0 => ComplianceBand::FullyCompliant,
        r if r >= 80.0 => ComplianceBand::MostlyCompliant,
        r if r >= 50.0 => ComplianceBand::AtRisk,
        _ => ComplianceBand::NonCompliant,
    }
}

/// How many values sit at or below a threshold.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ThresholdEvaluation {
    pub threshold: f64,
    pub within: usize,
    pub total: usize,
    /// Percentage of values within the threshold; 0 for an empty input.
    pub rate: f64,
    pub band: ComplianceBand,
}

/// The evaluator shared by every threshold-based regime.
pub fn evaluate_threshold<I>(values: I, threshold: f64) -> ThresholdEvaluation
where
    I: IntoIterator<Item = f64>,
{
    let (within, total) = values.into_iter().fold((0usize, 0usize), |(w, t), v| {
        (w + usize::from(v <= threshold), t + 1)
    });
    let rate = if total > 0 {
        within as f64 * 100.0 / total as f64
    } else {
        0.0
    };
    ThresholdEvaluation {
        threshold,
        within,
        total,
        rate,
        band: classify_rate(rate),
    }
}
