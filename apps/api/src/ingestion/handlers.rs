//! Axum route handlers for the Dataset API.

use axum::{extract::Multipart, Json};
use bytes::Bytes;
use tracing::info;

use crate::errors::AppError;
use crate::ingestion::demo::generate_demo_dataset;
use crate::ingestion::models::Dataset;
use crate::ingestion::pipeline::{ingest, ingest_upload};

/// Multipart field carrying the uploaded export.
const FILE_FIELD: &str = "file";

/// POST /api/v1/datasets/ingest
///
/// Reads the whole `file` field into memory, then parses it on the blocking pool.
/// Nothing is stored; the client keeps the returned dataset for later simulation calls.
pub async fn handle_ingest(mut multipart: Multipart) -> Result<Json<Dataset>, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Invalid multipart body: {e}")))?
    {
        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let filename = field.file_name().unwrap_or("upload").to_string();
        let content_type = field.content_type().map(String::from);
        let bytes: Bytes = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Failed to read upload: {e}")))?;

        info!(filename = %filename, size = bytes.len(), "Received dataset upload");

        let dataset = tokio::task::spawn_blocking(move || match content_type.as_deref() {
            Some(ct) => ingest_upload(&bytes, &filename, Some(ct)),
            None => ingest(&bytes, &filename),
        })
        .await
        .map_err(|e| AppError::Internal(anyhow::anyhow!("spawn_blocking failed in ingestion: {e}")))??;

        return Ok(Json(dataset));
    }

    Err(AppError::Validation(format!(
        "Multipart body has no '{FILE_FIELD}' field"
    )))
}

/// GET /api/v1/datasets/demo
pub async fn handle_demo() -> Json<Dataset> {
    Json(generate_demo_dataset())
}
