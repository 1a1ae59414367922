//! Compliance report assembly.
//!
//! The report only repackages what the simulation and the regime evaluator produce;
//! rendering it as a document is left to the client.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::compliance::regimes::{Regime, RegimeAssessment, RegimeKind, RegimeStatus};
use crate::ingestion::models::NormalizedRecord;
use crate::simulation::models::{ComplianceResult, SimulationOutput};

pub const DEFAULT_FACILITY: &str = "Power Plant Facility";

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum Priority {
    High,
    Medium,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Recommendation {
    pub priority: Priority,
    pub category: String,
    pub action: String,
    pub impact: String,
    pub timeline: String,
}

/// Headline figures over the simulated records.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportMetrics {
    pub total_generation: f64,
    pub total_emissions: f64,
    pub average_intensity: f64,
    pub data_points: usize,
    pub year_range: String,
    /// Mean generation per month (MW).
    pub monthly_generation: f64,
    /// Mean emissions per month (tonnes).
    pub monthly_emissions: f64,
    /// MW generated per tonne emitted. 0 when nothing was emitted.
    pub efficiency_ratio: f64,
    pub blend_percent: u8,
    pub emissions_reduction: f64,
    pub reduction_percentage: f64,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComplianceReport {
    pub report_id: Uuid,
    pub title: String,
    pub facility: String,
    pub generated_at: DateTime<Utc>,
    pub metrics: ReportMetrics,
    pub compliance: ComplianceResult,
    pub regimes: Vec<RegimeAssessment>,
    pub recommendations: Vec<Recommendation>,
}

pub fn build_report(
    facility: &str,
    source: &[NormalizedRecord],
    output: &SimulationOutput,
    regimes: &[Regime],
) -> ComplianceReport {
    let evaluated: Vec<NormalizedRecord> = output
        .simulated_records
        .iter()
        .map(|s| s.record.clone())
        .collect();

    let total_generation: f64 = evaluated.iter().map(|r| r.generation_mw).sum();
    let total_emissions = output.emissions.total_simulated_emissions;
    let metrics = ReportMetrics {
        total_generation,
        total_emissions,
        average_intensity: output.compliance.average_intensity,
        data_points: evaluated.len(),
        year_range: year_range(&evaluated),
        monthly_generation: per_month(total_generation, evaluated.len()),
        monthly_emissions: per_month(total_emissions, evaluated.len()),
        efficiency_ratio: efficiency_ratio(total_generation, total_emissions),
        blend_percent: output.blend_percent,
        emissions_reduction: output.emissions.emissions_saved,
        reduction_percentage: output.emissions.reduction_percentage,
    };

    let assessments: Vec<RegimeAssessment> = regimes
        .iter()
        .map(|regime| regime.assess(&evaluated, source))
        .collect();

    let recommendations = recommendations(&metrics, &output.compliance, &assessments);
    let generated_at = Utc::now();

    ComplianceReport {
        report_id: Uuid::new_v4(),
        title: format!(
            "{facility} Compliance Report - {}",
            generated_at.format("%Y-%m-%d")
        ),
        facility: facility.to_string(),
        generated_at,
        metrics,
        compliance: output.compliance.clone(),
        regimes: assessments,
        recommendations,
    }
}

/// `"2020-2023"`, a single year, or `"N/A"` when there are no records.
pub fn year_range(records: &[NormalizedRecord]) -> String {
    let years: BTreeSet<i32> = records.iter().map(|r| r.year).collect();
    match (years.first(), years.last()) {
        (Some(first), Some(last)) if first != last => format!("{first}-{last}"),
        (Some(only), _) => only.to_string(),
        _ => "N/A".to_string(),
    }
}

fn per_month(total: f64, months: usize) -> f64 {
    if months == 0 {
        0.0
    } else {
        total / months as f64
    }
}

/// Generation per tonne of emissions; 0 when emissions are zero (e.g. a full blend).
pub fn efficiency_ratio(total_generation: f64, total_emissions: f64) -> f64 {
    if total_emissions > 0.0 {
        total_generation / total_emissions
    } else {
        0.0
    }
}

fn find_assessment(assessments: &[RegimeAssessment], kind: RegimeKind) -> Option<&RegimeAssessment> {
    assessments.iter().find(|a| a.regime == kind)
}

fn recommendations(
    metrics: &ReportMetrics,
    compliance: &ComplianceResult,
    assessments: &[RegimeAssessment],
) -> Vec<Recommendation> {
    let mut out = Vec::new();

    if let Some(eu) = find_assessment(assessments, RegimeKind::EuEts) {
        if eu.status == RegimeStatus::NonCompliant {
            out.push(Recommendation {
                priority: Priority::High,
                category: "EU ETS Compliance".to_string(),
                action: format!(
                    "Increase hydrogen blend to {}% to achieve compliance",
                    compliance.min_blend_for_compliance
                ),
                impact: format!(
                    "Will improve compliance rate from {:.1}% to 100%",
                    eu.rate
                ),
                timeline: "6-12 months".to_string(),
            });
        }
    }

    if let Some(csrd) = find_assessment(assessments, RegimeKind::Csrd) {
        if csrd.status == RegimeStatus::NonCompliant {
            out.push(Recommendation {
                priority: Priority::Medium,
                category: "CSRD Compliance".to_string(),
                action: "Implement additional efficiency measures beyond hydrogen blending"
                    .to_string(),
                impact: "Will improve sustainability reporting compliance".to_string(),
                timeline: "12-18 months".to_string(),
            });
        }
    }

    if metrics.blend_percent > 0 {
        out.push(Recommendation {
            priority: Priority::High,
            category: "Hydrogen Integration".to_string(),
            action: format!(
                "Current {}% hydrogen blend is reducing emissions by {:.1}%",
                metrics.blend_percent, metrics.reduction_percentage
            ),
            impact: format!(
                "Annual CO2 savings: {:.0} tonnes",
                metrics.emissions_reduction
            ),
            timeline: "Ongoing".to_string(),
        });
    }

    if let Some(mrv) = find_assessment(assessments, RegimeKind::Mrv) {
        if mrv.status == RegimeStatus::NonCompliant {
            out.push(Recommendation {
                priority: Priority::Medium,
                category: "Data Quality".to_string(),
                action: "Improve data collection and reporting processes".to_string(),
                impact: "Will ensure complete MRV compliance".to_string(),
                timeline: "3-6 months".to_string(),
            });
        }
    }

    out
}
