use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Source columns every upload must carry, in canonical order.
pub const EXPECTED_COLUMNS: [&str; 5] = [
    "Month",
    "Year",
    "Generation_MW",
    "Gas_Consumption_m3",
    "CO2_Emissions_tonns",
];

/// Derived column appended to every dataset.
pub const INTENSITY_COLUMN: &str = "Carbon_Intensity_kgCO2_MWh";

/// One calendar month of facility telemetry after cleaning.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NormalizedRecord {
    pub month: String,
    pub year: i32,
    pub generation_mw: f64,
    pub gas_consumption_m3: f64,
    pub co2_emissions_tonnes: f64,
    /// kgCO2/MWh. Never read from the source; always derived.
    pub carbon_intensity: f64,
}

impl NormalizedRecord {
    pub fn new(
        month: impl Into<String>,
        year: i32,
        generation_mw: f64,
        gas_consumption_m3: f64,
        co2_emissions_tonnes: f64,
    ) -> Self {
        Self {
            month: month.into(),
            year,
            generation_mw,
            gas_consumption_m3,
            co2_emissions_tonnes,
            carbon_intensity: carbon_intensity(co2_emissions_tonnes, generation_mw),
        }
    }
}

/// kgCO2 per MWh. Zero generation floors the intensity at zero instead of dividing by it.
pub fn carbon_intensity(co2_emissions_tonnes: f64, generation_mw: f64) -> f64 {
    if generation_mw > 0.0 {
        co2_emissions_tonnes * 1000.0 / generation_mw
    } else {
        0.0
    }
}

/// Which parse strategy produced a dataset.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ParseStrategy {
    Semicolon,
    Comma,
    Tab,
    AutoDetect,
    ManualSemicolon,
    Generated,
}

/// A normalized upload. Record order is source row order.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Dataset {
    pub records: Vec<NormalizedRecord>,
    pub columns: Vec<String>,
    pub source_name: String,
    pub row_count: usize,
    /// Live rows that could not be normalized and were left out.
    pub dropped_rows: usize,
    pub strategy: ParseStrategy,
}

impl Dataset {
    pub fn new(
        records: Vec<NormalizedRecord>,
        source_name: impl Into<String>,
        dropped_rows: usize,
        strategy: ParseStrategy,
    ) -> Self {
        Self {
            row_count: records.len(),
            records,
            columns: output_columns(),
            source_name: source_name.into(),
            dropped_rows,
            strategy,
        }
    }
}

/// Expected columns followed by the derived intensity column.
pub fn output_columns() -> Vec<String> {
    EXPECTED_COLUMNS
        .iter()
        .copied()
        .chain(std::iter::once(INTENSITY_COLUMN))
        .map(String::from)
        .collect()
}

/// Fatal ingestion failures. Row-level problems never surface here.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum IngestionError {
    #[error("Unsupported file type '{0}': upload a .csv or .tsv file")]
    UnsupportedFileType(String),

    #[error("File appears to be empty or invalid")]
    EmptyOrInvalidFile,

    #[error(
        "Missing required columns: {}. Expected columns: {}. Found columns: {}",
        .missing.join(", "),
        .expected.join(", "),
        .found.join(", ")
    )]
    MissingColumns {
        missing: Vec<String>,
        expected: Vec<String>,
        found: Vec<String>,
    },
}

/// A single live row that could not be normalized. Absorbed by the pipeline.
#[derive(Debug, Clone, PartialEq, Error)]
#[error("Row {row}: {reason}")]
pub struct RowProcessingError {
    pub row: usize,
    pub reason: String,
}

/// Internal signal that a delimiter candidate did not apply. Never leaves the parser.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ParseDelimiterFailure {
    #[error("no columns detected")]
    NoColumns,
    #[error("no live rows")]
    NoLiveRows,
    #[error("reader error: {0}")]
    Reader(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intensity_zero_generation_is_zero() {
        assert_eq!(carbon_intensity(1234.0, 0.0), 0.0);
        assert_eq!(NormalizedRecord::new("May", 2021, 0.0, 10.0, 99.0).carbon_intensity, 0.0);
    }

    #[test]
    fn test_intensity_scales_to_kg_per_mwh() {
        let r = NormalizedRecord::new("January", 2022, 1000.0, 0.0, 400.0);
        assert!((r.carbon_intensity - 400.0).abs() < 1e-9);
    }

    #[test]
    fn test_output_columns_appends_intensity() {
        let cols = output_columns();
        assert_eq!(cols.len(), 6);
        assert_eq!(cols[0], "Month");
        assert_eq!(cols[5], INTENSITY_COLUMN);
    }

    #[test]
    fn test_missing_columns_message_lists_everything() {
        let err = IngestionError::MissingColumns {
            missing: vec!["Year".into()],
            expected: vec!["Month".into(), "Year".into()],
            found: vec!["Month".into()],
        };
        assert_eq!(
            err.to_string(),
            "Missing required columns: Year. Expected columns: Month, Year. Found columns: Month"
        );
    }
}
