use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::compliance::classification::ComplianceBand;
use crate::ingestion::models::NormalizedRecord;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum SimulationError {
    #[error("Blend percentage must be between 0 and 100, got {0}")]
    BlendOutOfRange(i64),

    #[error("Threshold must be a finite, non-negative number, got {0}")]
    InvalidThreshold(f64),

    #[error("Cannot simulate an empty record set")]
    EmptyDataset,

    #[error("Record {index} is invalid: {reason}")]
    InvalidRecord { index: usize, reason: String },
}

/// Share of emissions displaced by the alternative fuel, 0–100 inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct BlendPercent(u8);

impl BlendPercent {
    pub const ZERO: BlendPercent = BlendPercent(0);
    pub const FULL: BlendPercent = BlendPercent(100);

    /// Out-of-range values are a caller bug and are rejected, never clamped.
    pub fn new(value: i64) -> Result<Self, SimulationError> {
        if (0..=100).contains(&value) {
            Ok(Self(value as u8))
        } else {
            Err(SimulationError::BlendOutOfRange(value))
        }
    }

    pub fn value(self) -> u8 {
        self.0
    }

    /// Multiplier applied to emissions: `1 - b/100`.
    pub fn retained_fraction(self) -> f64 {
        1.0 - f64::from(self.0) / 100.0
    }
}

impl TryFrom<i64> for BlendPercent {
    type Error = SimulationError;

    fn try_from(value: i64) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

/// A record recomputed under a blend. `record` carries the new emissions and intensity.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulatedRecord {
    #[serde(flatten)]
    pub record: NormalizedRecord,
    pub original_emissions: f64,
    pub emissions_reduction: f64,
}

/// Compliance of a record set at one blend against one threshold.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComplianceResult {
    /// Both the mean and the peak intensity are within the threshold.
    pub is_compliant: bool,
    /// Percentage of months at or below the threshold.
    pub compliance_rate: f64,
    /// Unweighted mean over months, not weighted by generation.
    pub average_intensity: f64,
    pub max_intensity: f64,
    pub min_intensity: f64,
    pub compliant_months: usize,
    pub total_months: usize,
    pub min_blend_for_compliance: u8,
    pub threshold: f64,
    pub status: ComplianceBand,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EmissionsSummary {
    pub total_original_emissions: f64,
    pub total_simulated_emissions: f64,
    pub emissions_saved: f64,
    /// 0 when the original total is 0.
    pub reduction_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SimulationOutput {
    pub blend_percent: u8,
    pub simulated_records: Vec<SimulatedRecord>,
    pub compliance: ComplianceResult,
    pub emissions: EmissionsSummary,
}
