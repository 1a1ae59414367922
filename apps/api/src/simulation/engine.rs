//! Compliance simulation.
//!
//! Every call recomputes from scratch: `(records, blend, threshold) -> SimulationOutput`.
//! Nothing is cached between calls and the input records are never modified.
//!
//! The minimum-blend search is a binary search over `0..=100`. It relies on
//! `is_compliant_at` being monotonic in the blend, which holds because emissions scale
//! linearly down with it and never go negative.

use tracing::debug;

use crate::compliance::classification::evaluate_threshold;
use crate::ingestion::models::NormalizedRecord;
use crate::simulation::blend::{apply_blend, new_intensity};
use crate::simulation::models::{
    BlendPercent, ComplianceResult, EmissionsSummary, SimulatedRecord, SimulationError,
    SimulationOutput,
};

/// Mean / peak / floor of a set of intensities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct IntensityStats {
    pub average: f64,
    pub max: f64,
    pub min: f64,
}

/// `None` for an empty input.
pub fn intensity_stats<I>(intensities: I) -> Option<IntensityStats>
where
    I: IntoIterator<Item = f64>,
{
    let mut count = 0usize;
    let mut sum = 0.0;
    let mut max = f64::NEG_INFINITY;
    let mut min = f64::INFINITY;
    for v in intensities {
        count += 1;
        sum += v;
        max = max.max(v);
        min = min.min(v);
    }
    (count > 0).then(|| IntensityStats {
        average: sum / count as f64,
        max,
        min,
    })
}

/// Compliance means both the unweighted mean and the peak are within the threshold.
/// An empty set is never compliant.
pub fn is_compliant_at(records: &[NormalizedRecord], blend: BlendPercent, threshold: f64) -> bool {
    intensity_stats(records.iter().map(|r| new_intensity(r, blend)))
        .map_or(false, |s| s.average <= threshold && s.max <= threshold)
}

/// Smallest blend in `0..=100` at which the records become compliant.
/// Falls back to 100, where all emissions and therefore all intensities are zero.
pub fn find_min_blend_for_compliance(records: &[NormalizedRecord], threshold: f64) -> u8 {
    let mut left: i64 = 0;
    let mut right: i64 = 100;
    let mut best: u8 = 100;
    let mut iterations = 0u32;

    while left <= right {
        iterations += 1;
        let mid = (left + right) / 2;
        // mid stays within 0..=100 for the whole loop
        let blend = BlendPercent::new(mid).unwrap_or(BlendPercent::FULL);
        if is_compliant_at(records, blend, threshold) {
            best = blend.value();
            right = mid - 1;
        } else {
            left = mid + 1;
        }
    }

    debug!(best, iterations, threshold, "Minimum blend search finished");
    best
}

fn validate_inputs(records: &[NormalizedRecord], threshold: f64) -> Result<(), SimulationError> {
    if !threshold.is_finite() || threshold < 0.0 {
        return Err(SimulationError::InvalidThreshold(threshold));
    }
    if records.is_empty() {
        return Err(SimulationError::EmptyDataset);
    }
    records
        .iter()
        .enumerate()
        .try_for_each(|(index, record)| validate_record(index, record))
}

/// Records posted by clients skip ingestion cleaning, so the quantity invariants are
/// checked again here. Negative emissions would break the monotonic blend search.
fn validate_record(index: usize, record: &NormalizedRecord) -> Result<(), SimulationError> {
    for (name, value) in [
        ("generation_mw", record.generation_mw),
        ("gas_consumption_m3", record.gas_consumption_m3),
        ("co2_emissions_tonnes", record.co2_emissions_tonnes),
        ("carbon_intensity", record.carbon_intensity),
    ] {
        if !value.is_finite() || value < 0.0 {
            return Err(SimulationError::InvalidRecord {
                index,
                reason: format!("{name} must be a finite, non-negative number, got {value}"),
            });
        }
    }
    Ok(())
}

/// Runs one simulation at `blend` against `threshold`.
pub fn simulate(
    records: &[NormalizedRecord],
    blend: BlendPercent,
    threshold: f64,
) -> Result<SimulationOutput, SimulationError> {
    validate_inputs(records, threshold)?;

    let simulated_records: Vec<SimulatedRecord> =
        records.iter().map(|r| apply_blend(r, blend)).collect();

    let compliance = compliance_for(&simulated_records, records, threshold)?;
    let emissions = emissions_summary(&simulated_records);

    debug!(
        blend = blend.value(),
        compliant = compliance.is_compliant,
        rate = compliance.compliance_rate,
        "Simulation complete"
    );

    Ok(SimulationOutput {
        blend_percent: blend.value(),
        simulated_records,
        compliance,
        emissions,
    })
}

/// Compliance of the source records as uploaded, i.e. at a zero blend.
pub fn assess_baseline(
    records: &[NormalizedRecord],
    threshold: f64,
) -> Result<ComplianceResult, SimulationError> {
    simulate(records, BlendPercent::ZERO, threshold).map(|out| out.compliance)
}

fn compliance_for(
    simulated: &[SimulatedRecord],
    source: &[NormalizedRecord],
    threshold: f64,
) -> Result<ComplianceResult, SimulationError> {
    let intensities = || simulated.iter().map(|s| s.record.carbon_intensity);
    let stats = intensity_stats(intensities()).ok_or(SimulationError::EmptyDataset)?;
    let evaluation = evaluate_threshold(intensities(), threshold);

    Ok(ComplianceResult {
        is_compliant: stats.average <= threshold && stats.max <= threshold,
        compliance_rate: evaluation.rate,
        average_intensity: stats.average,
        max_intensity: stats.max,
        min_intensity: stats.min,
        compliant_months: evaluation.within,
        total_months: evaluation.total,
        min_blend_for_compliance: find_min_blend_for_compliance(source, threshold),
        threshold,
        status: evaluation.band,
    })
}

fn emissions_summary(simulated: &[SimulatedRecord]) -> EmissionsSummary {
    let total_original: f64 = simulated.iter().map(|s| s.original_emissions).sum();
    let total_simulated: f64 = simulated.iter().map(|s| s.record.co2_emissions_tonnes).sum();
    let saved = total_original - total_simulated;
    EmissionsSummary {
        total_original_emissions: total_original,
        total_simulated_emissions: total_simulated,
        emissions_saved: saved,
        reduction_percentage: if total_original > 0.0 {
            saved * 100.0 / total_original
        } else {
            0.0
        },
    }
}
