use std::borrow::Cow;

use tracing::{info, warn};

use crate::ingestion::cleaning::{normalize_row, RawRow};
use crate::ingestion::columns::{expected_positions, validate_columns};
use crate::ingestion::models::{Dataset, IngestionError};
use crate::ingestion::parser::{parse_table, ColumnMapping, LiveRow, ParsedTable};

const SUPPORTED_EXTENSIONS: &[&str] = &["csv", "tsv"];

const SUPPORTED_CONTENT_TYPES: &[&str] = &[
    "text/csv",
    "application/csv",
    "text/tab-separated-values",
];

/// Ingests an upload identified only by its file name.
pub fn ingest(bytes: &[u8], filename: &str) -> Result<Dataset, IngestionError> {
    ingest_upload(bytes, filename, None)
}

/// Full ingestion pipeline: type check, decode, ordered parse, column validation, cleaning.
///
/// A column-validation failure ends ingestion even if another delimiter might have
/// produced different headers; every strategy reads the same header line.
pub fn ingest_upload(
    bytes: &[u8],
    filename: &str,
    content_type: Option<&str>,
) -> Result<Dataset, IngestionError> {
    ensure_supported(filename, content_type)?;

    let text = decode_text(bytes);
    let non_blank_lines = text.lines().filter(|l| !l.trim().is_empty()).count();
    if non_blank_lines < 2 {
        return Err(IngestionError::EmptyOrInvalidFile);
    }

    let table = parse_table(&text)?;
    validate_columns(&table.headers)?;
    if table.rows.is_empty() {
        return Err(IngestionError::EmptyOrInvalidFile);
    }

    let dataset = normalize_table(table, filename);
    info!(
        source = %dataset.source_name,
        strategy = ?dataset.strategy,
        rows = dataset.row_count,
        dropped = dataset.dropped_rows,
        "Dataset ingested"
    );
    Ok(dataset)
}

/// Accepts a known tabular-text extension or content type.
pub fn ensure_supported(filename: &str, content_type: Option<&str>) -> Result<(), IngestionError> {
    let extension_ok = filename
        .rsplit_once('.')
        .map(|(_, ext)| {
            SUPPORTED_EXTENSIONS
                .iter()
                .any(|s| s.eq_ignore_ascii_case(ext.trim()))
        })
        .unwrap_or(false);

    let content_type_ok = content_type
        .map(|ct| {
            let essence = ct.split(';').next().unwrap_or("").trim();
            SUPPORTED_CONTENT_TYPES
                .iter()
                .any(|s| s.eq_ignore_ascii_case(essence))
        })
        .unwrap_or(false);

    if extension_ok || content_type_ok {
        Ok(())
    } else {
        Err(IngestionError::UnsupportedFileType(filename.to_string()))
    }
}

/// UTF-8 when valid (minus a leading BOM), otherwise Windows-1252 as Excel exports it.
pub fn decode_text(bytes: &[u8]) -> Cow<'_, str> {
    match std::str::from_utf8(bytes) {
        Ok(s) => Cow::Borrowed(s.strip_prefix('\u{feff}').unwrap_or(s)),
        Err(_) => {
            let (decoded, _, _) = encoding_rs::WINDOWS_1252.decode(bytes);
            decoded
        }
    }
}

fn normalize_table(table: ParsedTable, source_name: &str) -> Dataset {
    let positions = match table.mapping {
        ColumnMapping::ByHeader => expected_positions(&table.headers),
        ColumnMapping::ByPosition => [Some(0), Some(1), Some(2), Some(3), Some(4)],
    };

    let mut dropped = 0usize;
    for rejected in &table.rejected {
        warn!(row = rejected.row, reason = %rejected.reason, "Dropping unreadable row");
        dropped += 1;
    }

    let mut records = Vec::with_capacity(table.rows.len());
    for row in &table.rows {
        match normalize_row(row.index, &raw_row(row, &positions)) {
            Ok(record) => records.push(record),
            Err(e) => {
                warn!(row = e.row, reason = %e.reason, "Dropping row that failed normalization");
                dropped += 1;
            }
        }
    }

    Dataset::new(records, source_name, dropped, table.strategy)
}

fn raw_row(row: &LiveRow, positions: &[Option<usize>; 5]) -> RawRow {
    RawRow::from_cells([
        cell(row, positions[0]),
        cell(row, positions[1]),
        cell(row, positions[2]),
        cell(row, positions[3]),
        cell(row, positions[4]),
    ])
}

fn cell(row: &LiveRow, position: Option<usize>) -> &str {
    position
        .and_then(|i| row.cells.get(i))
        .map(String::as_str)
        .unwrap_or("")
}
