//! Delimited-text parsing with an ordered fallback.
//!
//! Strategies are tried in `DELIMITER_CANDIDATES` order with one success predicate:
//! the header splits into columns and at least one live row follows. When no candidate
//! applies, `parse_manual` splits on semicolons by hand. It is the last resort and never
//! loops back into the candidate list.

use tracing::debug;

use crate::ingestion::models::{
    IngestionError, ParseDelimiterFailure, ParseStrategy, RowProcessingError,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DelimiterCandidate {
    Fixed(u8),
    AutoDetect,
}

pub const DELIMITER_CANDIDATES: [(ParseStrategy, DelimiterCandidate); 4] = [
    (ParseStrategy::Semicolon, DelimiterCandidate::Fixed(b';')),
    (ParseStrategy::Comma, DelimiterCandidate::Fixed(b',')),
    (ParseStrategy::Tab, DelimiterCandidate::Fixed(b'\t')),
    (ParseStrategy::AutoDetect, DelimiterCandidate::AutoDetect),
];

/// Delimiters considered by auto-detection, including the ASCII record/unit separators.
const SNIFF_CANDIDATES: [u8; 6] = [b',', b'\t', b'|', b';', 0x1E, 0x1F];

/// How data cells line up with the expected columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColumnMapping {
    /// Cells are looked up through the header row.
    ByHeader,
    /// Cell `i` belongs to expected column `i`, whatever the header says.
    ByPosition,
}

/// A data row with at least one non-blank cell.
#[derive(Debug, Clone, PartialEq)]
pub struct LiveRow {
    /// 1-based data row number, header excluded.
    pub index: usize,
    pub cells: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct ParsedTable {
    pub strategy: ParseStrategy,
    pub headers: Vec<String>,
    pub rows: Vec<LiveRow>,
    pub mapping: ColumnMapping,
    /// Rows the reader itself could not decode.
    pub rejected: Vec<RowProcessingError>,
}

fn is_live<'a>(mut cells: impl Iterator<Item = &'a str>) -> bool {
    cells.any(|c| !c.trim().is_empty())
}

/// Runs every delimiter candidate in order, then the manual parser.
pub fn parse_table(text: &str) -> Result<ParsedTable, IngestionError> {
    for (strategy, candidate) in DELIMITER_CANDIDATES {
        let attempt = match candidate {
            DelimiterCandidate::Fixed(delimiter) => parse_delimited(text, delimiter, strategy),
            DelimiterCandidate::AutoDetect => sniff_delimiter(text)
                .ok_or(ParseDelimiterFailure::NoColumns)
                .and_then(|delimiter| parse_delimited(text, delimiter, strategy)),
        };

        match attempt {
            Ok(table) => {
                debug!(
                    ?strategy,
                    columns = table.headers.len(),
                    rows = table.rows.len(),
                    "Parse strategy succeeded"
                );
                return Ok(table);
            }
            Err(failure) => {
                debug!(?strategy, %failure, "Parse strategy did not apply, trying next");
            }
        }
    }

    debug!("All delimiter strategies failed, falling back to manual semicolon split");
    parse_manual(text)
}

/// One delimiter attempt. A header that does not split into at least two named columns
/// means the delimiter is absent from the header line, and counts as no columns.
pub fn parse_delimited(
    text: &str,
    delimiter: u8,
    strategy: ParseStrategy,
) -> Result<ParsedTable, ParseDelimiterFailure> {
    let mut reader = csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(true)
        .flexible(true)
        .from_reader(text.as_bytes());

    let headers: Vec<String> = reader
        .headers()
        .map_err(|e| ParseDelimiterFailure::Reader(e.to_string()))?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    if headers.iter().filter(|h| !h.is_empty()).count() < 2 {
        return Err(ParseDelimiterFailure::NoColumns);
    }

    let mut rows = Vec::new();
    let mut rejected = Vec::new();
    for (i, result) in reader.records().enumerate() {
        match result {
            Ok(record) => {
                if is_live(record.iter()) {
                    rows.push(LiveRow {
                        index: i + 1,
                        cells: record.iter().map(String::from).collect(),
                    });
                }
            }
            Err(e) => rejected.push(RowProcessingError {
                row: i + 1,
                reason: e.to_string(),
            }),
        }
    }

    if rows.is_empty() {
        return Err(ParseDelimiterFailure::NoLiveRows);
    }

    Ok(ParsedTable {
        strategy,
        headers,
        rows,
        mapping: ColumnMapping::ByHeader,
        rejected,
    })
}

/// Picks the delimiter giving the most consistent multi-field split over the first lines.
/// Returns `None` when no candidate splits the first line.
pub fn sniff_delimiter(text: &str) -> Option<u8> {
    let sample: Vec<&str> = text
        .lines()
        .filter(|l| !l.trim().is_empty())
        .take(10)
        .collect();
    let first = sample.first()?;

    let mut best: Option<(u8, usize)> = None;
    for &delimiter in &SNIFF_CANDIDATES {
        let target = field_count(first, delimiter);
        if target <= 1 {
            continue;
        }
        let consistent = sample
            .iter()
            .filter(|line| field_count(line, delimiter) == target)
            .count();
        let score = consistent * target;
        if best.map_or(true, |(_, s)| score > s) {
            best = Some((delimiter, score));
        }
    }
    best.map(|(d, _)| d)
}

fn field_count(line: &str, delimiter: u8) -> usize {
    csv::ReaderBuilder::new()
        .delimiter(delimiter)
        .has_headers(false)
        .flexible(true)
        .from_reader(line.as_bytes())
        .records()
        .next()
        .and_then(|r| r.ok())
        .map(|r| r.len())
        .unwrap_or(1)
}

/// Last-resort parser: split lines on `\n`, fields on `;`, no quoting.
pub fn parse_manual(text: &str) -> Result<ParsedTable, IngestionError> {
    let lines: Vec<&str> = text.split('\n').filter(|l| !l.trim().is_empty()).collect();
    if lines.len() < 2 {
        return Err(IngestionError::EmptyOrInvalidFile);
    }

    let headers = lines[0].split(';').map(|h| h.trim().to_string()).collect();
    let rows = lines[1..]
        .iter()
        .enumerate()
        .filter(|(_, line)| is_live(line.split(';')))
        .map(|(i, line)| LiveRow {
            index: i + 1,
            cells: line.split(';').map(|v| v.trim().to_string()).collect(),
        })
        .collect();

    Ok(ParsedTable {
        strategy: ParseStrategy::ManualSemicolon,
        headers,
        rows,
        mapping: ColumnMapping::ByPosition,
        rejected: Vec::new(),
    })
}
