//! Built-in sample dataset: a gas-fired plant over 2020–2023.
//!
//! Values follow the same shape as real uploads (seasonal generation, winter emissions
//! uplift) but are deterministic so repeated requests return identical data.

use std::f64::consts::PI;

use crate::ingestion::models::{Dataset, NormalizedRecord, ParseStrategy};

pub const DEMO_SOURCE_NAME: &str = "demo_power_plant_data.csv";

const MONTHS: [&str; 12] = [
    "January",
    "February",
    "March",
    "April",
    "May",
    "June",
    "July",
    "August",
    "September",
    "October",
    "November",
    "December",
];

const YEARS: [i32; 4] = [2020, 2021, 2022, 2023];

/// m3 of gas burned per MW generated.
const GAS_PER_MW: f64 = 250.0;
/// Tonnes CO2 per m3 of gas.
const CO2_PER_M3: f64 = 0.002;

/// Deterministic value in `[0, 1)` for sample `i` and salt `k`.
fn jitter(i: usize, k: usize) -> f64 {
    ((i * 37 + k * 53 + 11) % 100) as f64 / 100.0
}

pub fn generate_demo_dataset() -> Dataset {
    let mut records = Vec::with_capacity(YEARS.len() * MONTHS.len());

    for (year_idx, &year) in YEARS.iter().enumerate() {
        for (month_idx, &month) in MONTHS.iter().enumerate() {
            let i = year_idx * MONTHS.len() + month_idx;

            let seasonal = 1.0 + 0.3 * ((month_idx as f64 + 1.0) * PI / 6.0).sin();
            let generation = ((45_000.0 + 10_000.0 * jitter(i, 0)) * seasonal).round();
            let gas = (generation * GAS_PER_MW + 5_000.0 * jitter(i, 1)).round();

            let winter = if month_idx >= 10 || month_idx <= 2 { 1.2 } else { 1.0 };
            let emissions = (gas * CO2_PER_M3 * winter * (1.0 + 0.1 * jitter(i, 2))).round();

            records.push(NormalizedRecord::new(month, year, generation, gas, emissions));
        }
    }

    Dataset::new(records, DEMO_SOURCE_NAME, 0, ParseStrategy::Generated)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_demo_has_48_months_in_order() {
        let dataset = generate_demo_dataset();
        assert_eq!(dataset.row_count, 48);
        assert_eq!(dataset.records[0].month, "January");
        assert_eq!(dataset.records[0].year, 2020);
        assert_eq!(dataset.records[47].month, "December");
        assert_eq!(dataset.records[47].year, 2023);
    }

    #[test]
    fn test_demo_is_deterministic() {
        assert_eq!(
            generate_demo_dataset().records,
            generate_demo_dataset().records
        );
    }

    #[test]
    fn test_demo_starts_out_of_compliance() {
        let dataset = generate_demo_dataset();
        assert!(dataset.records.iter().all(|r| r.generation_mw > 0.0));
        assert!(dataset.records.iter().all(|r| r.carbon_intensity > 350.0));
    }
}
