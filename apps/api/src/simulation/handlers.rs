//! Axum route handlers for the Simulation API.

use axum::{extract::State, Json};
use serde::Deserialize;

use crate::errors::AppError;
use crate::ingestion::models::NormalizedRecord;
use crate::simulation::engine::simulate;
use crate::simulation::models::{BlendPercent, SimulationOutput};
use crate::state::AppState;

#[derive(Debug, Deserialize)]
pub struct SimulateRequest {
    pub records: Vec<NormalizedRecord>,
    pub blend_percent: i64,
    /// Defaults to the configured EU ETS threshold.
    pub threshold: Option<f64>,
}

/// POST /api/v1/simulation
///
/// Stateless: the client sends the current records with every blend change and the
/// whole simulation is recomputed.
pub async fn handle_simulate(
    State(state): State<AppState>,
    Json(request): Json<SimulateRequest>,
) -> Result<Json<SimulationOutput>, AppError> {
    let blend = BlendPercent::new(request.blend_percent)?;
    let threshold = request.threshold.unwrap_or(state.config.eu_ets_threshold);
    let records = request.records;

    let output = tokio::task::spawn_blocking(move || simulate(&records, blend, threshold))
        .await
        .map_err(|e| {
            AppError::Internal(anyhow::anyhow!("spawn_blocking failed in simulation: {e}"))
        })??;

    Ok(Json(output))
}
