use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde_json::{json, Value};
use thiserror::Error;

use crate::ingestion::models::IngestionError;
use crate::simulation::models::SimulationError;

/// Application-level error type.
/// Implements `IntoResponse` so Axum handlers can return `Result<T, AppError>`.
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error(transparent)]
    Ingestion(#[from] IngestionError),

    #[error(transparent)]
    Simulation(#[from] SimulationError),

    #[error("Internal server error: {0}")]
    Internal(#[from] anyhow::Error),
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        let mut details: Option<Value> = None;

        let (status, code, message) = match &self {
            AppError::NotFound(msg) => (StatusCode::NOT_FOUND, "NOT_FOUND", msg.clone()),
            AppError::Validation(msg) => (StatusCode::BAD_REQUEST, "VALIDATION_ERROR", msg.clone()),
            AppError::Ingestion(e) => match e {
                IngestionError::UnsupportedFileType(_) => (
                    StatusCode::UNSUPPORTED_MEDIA_TYPE,
                    "UNSUPPORTED_FILE_TYPE",
                    e.to_string(),
                ),
                IngestionError::EmptyOrInvalidFile => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_OR_INVALID_FILE",
                    e.to_string(),
                ),
                IngestionError::MissingColumns {
                    missing,
                    expected,
                    found,
                } => {
                    details = Some(json!({
                        "missing": missing,
                        "expected": expected,
                        "found": found,
                    }));
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "MISSING_COLUMNS",
                        e.to_string(),
                    )
                }
            },
            AppError::Simulation(e) => match e {
                SimulationError::BlendOutOfRange(_) => {
                    (StatusCode::BAD_REQUEST, "BLEND_OUT_OF_RANGE", e.to_string())
                }
                SimulationError::InvalidThreshold(_) => {
                    (StatusCode::BAD_REQUEST, "INVALID_THRESHOLD", e.to_string())
                }
                SimulationError::EmptyDataset => (
                    StatusCode::UNPROCESSABLE_ENTITY,
                    "EMPTY_DATASET",
                    e.to_string(),
                ),
                SimulationError::InvalidRecord { index, .. } => {
                    details = Some(json!({ "index": index }));
                    (
                        StatusCode::UNPROCESSABLE_ENTITY,
                        "INVALID_RECORD",
                        e.to_string(),
                    )
                }
            },
            AppError::Internal(e) => {
                tracing::error!("Internal error: {e:?}");
                (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    "INTERNAL_ERROR",
                    "An internal server error occurred".to_string(),
                )
            }
        };

        let mut error = json!({
            "code": code,
            "message": message
        });
        if let Some(details) = details {
            error["details"] = details;
        }

        (status, Json(json!({ "error": error }))).into_response()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes() {
        let cases = [
            (
                AppError::from(IngestionError::UnsupportedFileType("a.pdf".into())),
                StatusCode::UNSUPPORTED_MEDIA_TYPE,
            ),
            (
                AppError::from(IngestionError::EmptyOrInvalidFile),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(SimulationError::BlendOutOfRange(150)),
                StatusCode::BAD_REQUEST,
            ),
            (
                AppError::from(SimulationError::EmptyDataset),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::from(SimulationError::InvalidRecord {
                    index: 2,
                    reason: "co2_emissions_tonnes must be a finite, non-negative number, got -1"
                        .into(),
                }),
                StatusCode::UNPROCESSABLE_ENTITY,
            ),
            (
                AppError::Internal(anyhow::anyhow!("boom")),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];
        for (err, expected) in cases {
            assert_eq!(err.into_response().status(), expected);
        }
    }
}
