use serde::{Deserialize, Serialize};

use crate::compliance::classification::{
    classify_rate, evaluate_threshold, ComplianceBand, ThresholdEvaluation,
};
use crate::ingestion::models::NormalizedRecord;

pub const EU_ETS_THRESHOLD: f64 = 350.0;
pub const CSRD_THRESHOLD: f64 = 300.0;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegimeKind {
    /// EU Emissions Trading System, primary intensity threshold.
    EuEts,
    /// Corporate Sustainability Reporting Directive, stricter intensity threshold.
    Csrd,
    /// Monitoring, Reporting, Verification: data completeness.
    Mrv,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum RegimeStatus {
    Compliant,
    NonCompliant,
}

/// A regulatory rule evaluated independently against a record set.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Regime {
    pub kind: RegimeKind,
    /// kgCO2/MWh for intensity regimes; required completeness percentage for MRV.
    pub threshold: f64,
}

impl Regime {
    pub fn eu_ets(threshold: f64) -> Self {
        Self {
            kind: RegimeKind::EuEts,
            threshold,
        }
    }

    pub fn csrd(threshold: f64) -> Self {
        Self {
            kind: RegimeKind::Csrd,
            threshold,
        }
    }

    pub fn mrv() -> Self {
        Self {
            kind: RegimeKind::Mrv,
            threshold: 100.0,
        }
    }

    pub fn name(&self) -> &'static str {
        match self.kind {
            RegimeKind::EuEts => "EU ETS",
            RegimeKind::Csrd => "CSRD",
            RegimeKind::Mrv => "MRV",
        }
    }

    pub fn description(&self) -> &'static str {
        match self.kind {
            RegimeKind::EuEts => "EU Emissions Trading System",
            RegimeKind::Csrd => "Corporate Sustainability Reporting Directive",
            RegimeKind::Mrv => "Monitoring, Reporting, Verification",
        }
    }

    /// Rate at which the regime reports a pass.
    pub fn pass_rate(&self) -> f64 {
        match self.kind {
            RegimeKind::EuEts | RegimeKind::Csrd => 80.0,
            RegimeKind::Mrv => 100.0,
        }
    }

    /// Intensity regimes read `evaluated` (possibly simulated records). MRV reads `source`,
    /// since completeness is a property of what was uploaded.
    pub fn assess(
        &self,
        evaluated: &[NormalizedRecord],
        source: &[NormalizedRecord],
    ) -> RegimeAssessment {
        let evaluation = match self.kind {
            RegimeKind::EuEts | RegimeKind::Csrd => {
                evaluate_threshold(evaluated.iter().map(|r| r.carbon_intensity), self.threshold)
            }
            RegimeKind::Mrv => completeness_evaluation(source),
        };

        let status = if evaluation.rate >= self.pass_rate() {
            RegimeStatus::Compliant
        } else {
            RegimeStatus::NonCompliant
        };

        RegimeAssessment {
            regime: self.kind,
            name: self.name().to_string(),
            description: self.description().to_string(),
            threshold: self.threshold,
            rate: evaluation.rate,
            compliant_months: evaluation.within,
            total_months: evaluation.total,
            band: evaluation.band,
            status,
        }
    }
}

/// EU ETS, CSRD and MRV with the given intensity thresholds.
pub fn default_regimes(eu_ets_threshold: f64, csrd_threshold: f64) -> Vec<Regime> {
    vec![
        Regime::eu_ets(eu_ets_threshold),
        Regime::csrd(csrd_threshold),
        Regime::mrv(),
    ]
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct RegimeAssessment {
    pub regime: RegimeKind,
    pub name: String,
    pub description: String,
    pub threshold: f64,
    pub rate: f64,
    pub compliant_months: usize,
    pub total_months: usize,
    pub band: ComplianceBand,
    pub status: RegimeStatus,
}

/// Month, year, generation and emissions all carry a value. Zero counts as absent,
/// because cleaning cannot tell an empty cell from a real zero.
pub fn is_record_complete(record: &NormalizedRecord) -> bool {
    !record.month.trim().is_empty()
        && record.year != 0
        && record.generation_mw != 0.0
        && record.co2_emissions_tonnes != 0.0
}

/// All-or-nothing: 100% when every record is complete, otherwise 0%.
fn completeness_evaluation(records: &[NormalizedRecord]) -> ThresholdEvaluation {
    let complete = !records.is_empty() && records.iter().all(is_record_complete);
    let rate = if complete { 100.0 } else { 0.0 };
    ThresholdEvaluation {
        threshold: 100.0,
        within: records.iter().filter(|r| is_record_complete(r)).count(),
        total: records.len(),
        rate,
        band: classify_rate(rate),
    }
}
