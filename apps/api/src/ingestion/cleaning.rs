//! Per-field cleaning for live rows.
//!
//! Policy: a numeric cell that is empty or cannot be parsed becomes `0.0`. This keeps
//! every live row in the dataset at the cost of not distinguishing "absent" from a
//! genuine zero.

use crate::ingestion::models::{NormalizedRecord, RowProcessingError};

/// Strips all whitespace, turns the first decimal comma into a point, and parses the
/// longest numeric prefix, so unit suffixes such as `"400 t"` still read as `400`.
/// Grouping separators are not handled: `"1.250,5"` reads as `1.25`.
pub fn parse_numeric_or_zero(raw: &str) -> f64 {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    let decimal = compact.replacen(',', ".", 1);
    match decimal[..numeric_prefix_len(&decimal)].parse::<f64>() {
        Ok(v) if v.is_finite() => v,
        _ => 0.0,
    }
}

/// Byte length of the leading `[+-]digits[.digits][e[+-]digits]` run. An exponent
/// marker without digits after it is left out of the prefix.
fn numeric_prefix_len(s: &str) -> usize {
    let bytes = s.as_bytes();
    let digits_from = |mut i: usize| {
        while i < bytes.len() && bytes[i].is_ascii_digit() {
            i += 1;
        }
        i
    };

    let mut end = 0;
    if matches!(bytes.first(), Some(b'+' | b'-')) {
        end = 1;
    }
    let int_end = digits_from(end);
    let mut mantissa_end = int_end;
    if bytes.get(int_end) == Some(&b'.') {
        mantissa_end = digits_from(int_end + 1);
    }
    if mantissa_end == end || (mantissa_end == end + 1 && bytes.get(end) == Some(&b'.')) {
        return 0;
    }

    end = mantissa_end;
    if matches!(bytes.get(end), Some(b'e' | b'E')) {
        let mut exp = end + 1;
        if matches!(bytes.get(exp), Some(b'+' | b'-')) {
            exp += 1;
        }
        let exp_end = digits_from(exp);
        if exp_end > exp {
            end = exp_end;
        }
    }
    end
}

/// Integer year from a cell. Fractional input is truncated; anything else is `0`.
pub fn parse_year_or_zero(raw: &str) -> i32 {
    let compact: String = raw.chars().filter(|c| !c.is_whitespace()).collect();
    if let Ok(year) = compact.parse::<i32>() {
        return year;
    }
    let value = parse_numeric_or_zero(&compact);
    if value.abs() < i32::MAX as f64 {
        value.trunc() as i32
    } else {
        0
    }
}

/// Month label with surrounding whitespace and embedded control whitespace removed.
pub fn clean_month(raw: &str) -> String {
    raw.trim()
        .chars()
        .filter(|c| !matches!(c, '\t' | '\n' | '\r'))
        .collect()
}

/// Raw cells for one live row, in `EXPECTED_COLUMNS` order. Absent cells are `""`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RawRow {
    pub month: String,
    pub year: String,
    pub generation_mw: String,
    pub gas_consumption_m3: String,
    pub co2_emissions_tonns: String,
}

impl RawRow {
    pub fn from_cells(cells: [&str; 5]) -> Self {
        let [month, year, generation_mw, gas_consumption_m3, co2_emissions_tonns] = cells;
        Self {
            month: month.to_string(),
            year: year.to_string(),
            generation_mw: generation_mw.to_string(),
            gas_consumption_m3: gas_consumption_m3.to_string(),
            co2_emissions_tonns: co2_emissions_tonns.to_string(),
        }
    }
}

/// Cleans one row and derives its carbon intensity from its own cleaned values.
///
/// Negative quantities are not physical and would break the monotonic blend search,
/// so they reject the row instead of defaulting.
pub fn normalize_row(index: usize, raw: &RawRow) -> Result<NormalizedRecord, RowProcessingError> {
    let generation_mw = parse_numeric_or_zero(&raw.generation_mw);
    let gas_consumption_m3 = parse_numeric_or_zero(&raw.gas_consumption_m3);
    let co2_emissions_tonnes = parse_numeric_or_zero(&raw.co2_emissions_tonns);

    for (name, value) in [
        ("Generation_MW", generation_mw),
        ("Gas_Consumption_m3", gas_consumption_m3),
        ("CO2_Emissions_tonns", co2_emissions_tonnes),
    ] {
        if value < 0.0 {
            return Err(RowProcessingError {
                row: index,
                reason: format!("{name} is negative ({value})"),
            });
        }
    }

    Ok(NormalizedRecord::new(
        clean_month(&raw.month),
        parse_year_or_zero(&raw.year),
        generation_mw,
        gas_consumption_m3,
        co2_emissions_tonnes,
    ))
}
