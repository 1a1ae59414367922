//! Axum route handlers for the Compliance API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::compliance::report::{build_report, ComplianceReport, DEFAULT_FACILITY};
use crate::errors::AppError;
use crate::ingestion::models::NormalizedRecord;
use crate::simulation::engine::{assess_baseline, simulate};
use crate::simulation::models::{BlendPercent, ComplianceResult};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct StatusRequest {
    pub records: Vec<NormalizedRecord>,
    pub threshold: Option<f64>,
}

#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub records: Vec<NormalizedRecord>,
    #[serde(default)]
    pub blend_percent: i64,
    pub facility: Option<String>,
}

/// POST /api/v1/compliance/status
///
/// Compliance of the records as uploaded (zero blend).
pub async fn handle_status(
    State(state): State<AppState>,
    Json(request): Json<StatusRequest>,
) -> Result<Json<ComplianceResult>, AppError> {
    let threshold = request.threshold.unwrap_or(state.config.eu_ets_threshold);
    let records = request.records;

    let result = tokio::task::spawn_blocking(move || assess_baseline(&records, threshold))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in compliance status: {e}"))
        })??;

    Ok(Json(result))
}

/// POST /api/v1/compliance/report
///
/// Simulates at the requested blend and evaluates every configured regime.
pub async fn handle_report(
    State(state): State<AppState>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ComplianceReport>, AppError> {
    let blend = BlendPercent::new(request.blend_percent)?;
    let threshold = state.config.eu_ets_threshold;
    let regimes = state.regimes.clone();
    let facility = request
        .facility
        .filter(|f| !f.trim().is_empty())
        .unwrap_or_else(|| DEFAULT_FACILITY.to_string());
    let records = request.records;

    let report = tokio::task::spawn_blocking(move || {
        simulate(&records, blend, threshold)
            .map(|output| build_report(&facility, &records, &output, &regimes))
    })
    .await
    .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in report: {e}")))??;

    Ok(Json(report))
}
