use crate::ingestion::models::{IngestionError, EXPECTED_COLUMNS};

/// Canonical form used for header comparison: trimmed, lowercased, with every run of
/// whitespace, hyphens or underscores collapsed into a single underscore.
pub fn canonicalize(name: &str) -> String {
    let mut out = String::with_capacity(name.len());
    let mut in_separator = false;
    for c in name.trim().chars() {
        if c.is_whitespace() || c == '-' || c == '_' {
            if !in_separator {
                out.push('_');
                in_separator = true;
            }
        } else {
            out.extend(c.to_lowercase());
            in_separator = false;
        }
    }
    out
}

/// Checks that every expected column is present after canonicalization.
/// Either all are present or the error names every missing one.
pub fn validate_columns(found: &[String]) -> Result<(), IngestionError> {
    let canonical_found: Vec<String> = found.iter().map(|c| canonicalize(c)).collect();

    let missing: Vec<String> = EXPECTED_COLUMNS
        .iter()
        .filter(|expected| {
            let wanted = canonicalize(expected);
            !canonical_found.iter().any(|c| *c == wanted)
        })
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        return Ok(());
    }

    Err(IngestionError::MissingColumns {
        missing,
        expected: EXPECTED_COLUMNS.iter().map(|c| c.to_string()).collect(),
        found: found.to_vec(),
    })
}

/// Position of each expected column within `headers`, in `EXPECTED_COLUMNS` order.
/// Only meaningful after `validate_columns` succeeded; unmatched entries are `None`.
pub fn expected_positions(headers: &[String]) -> [Option<usize>; 5] {
    let canonical: Vec<String> = headers.iter().map(|h| canonicalize(h)).collect();
    let mut positions = [None; 5];
    for (slot, expected) in positions.iter_mut().zip(EXPECTED_COLUMNS.iter()) {
        let wanted = canonicalize(expected);
        *slot = canonical.iter().position(|c| *c == wanted);
    }
    positions
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(names: &[&str]) -> Vec<String> {
        names.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_canonicalize_collapses_separators() {
        assert_eq!(canonicalize("  Generation - MW "), "generation_mw");
        assert_eq!(canonicalize("CO2__Emissions  tonns"), "co2_emissions_tonns");
        assert_eq!(canonicalize("Gas\tConsumption_m3"), "gas_consumption_m3");
    }

    #[test]
    fn test_validate_accepts_case_and_spacing_variants() {
        let found = headers(&[
            "month",
            " YEAR ",
            "generation mw",
            "Gas-Consumption-m3",
            "co2 emissions tonns",
        ]);
        assert!(validate_columns(&found).is_ok());
    }

    #[test]
    fn test_validate_missing_year() {
        let found = headers(&[
            "Month",
            "Generation_MW",
            "Gas_Consumption_m3",
            "CO2_Emissions_tonns",
        ]);
        match validate_columns(&found) {
            Err(IngestionError::MissingColumns {
                missing,
                expected,
                found: reported,
            }) => {
                assert_eq!(missing, vec!["Year".to_string()]);
                assert_eq!(expected.len(), 5);
                assert_eq!(reported, found);
            }
            other => panic!("expected MissingColumns, got {other:?}"),
        }
    }

    #[test]
    fn test_validate_reports_every_missing_column() {
        let found = headers(&["Month"]);
        let Err(IngestionError::MissingColumns { missing, .. }) = validate_columns(&found) else {
            panic!("expected MissingColumns");
        };
        assert_eq!(
            missing,
            vec![
                "Year",
                "Generation_MW",
                "Gas_Consumption_m3",
                "CO2_Emissions_tonns"
            ]
        );
    }

    #[test]
    fn test_expected_positions_follow_header_order() {
        let found = headers(&[
            "CO2_Emissions_tonns",
            "Year",
            "Extra",
            "Month",
            "Gas_Consumption_m3",
            "Generation_MW",
        ]);
        assert_eq!(
            expected_positions(&found),
            [Some(3), Some(1), Some(5), Some(4), Some(0)]
        );
    }
}
