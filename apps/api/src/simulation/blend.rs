//! Blend application. Pure per-record functions, monotonic non-increasing in the blend
//! for any record with non-negative emissions.

use crate::ingestion::models::{carbon_intensity, NormalizedRecord};
use crate::simulation::models::{BlendPercent, SimulatedRecord};

pub fn new_emissions(record: &NormalizedRecord, blend: BlendPercent) -> f64 {
    record.co2_emissions_tonnes * blend.retained_fraction()
}

pub fn new_intensity(record: &NormalizedRecord, blend: BlendPercent) -> f64 {
    carbon_intensity(new_emissions(record, blend), record.generation_mw)
}

/// A fresh simulated copy of `record`; the input is never touched.
pub fn apply_blend(record: &NormalizedRecord, blend: BlendPercent) -> SimulatedRecord {
    let original = record.co2_emissions_tonnes;
    let emissions = new_emissions(record, blend);
    SimulatedRecord {
        record: NormalizedRecord {
            co2_emissions_tonnes: emissions,
            carbon_intensity: carbon_intensity(emissions, record.generation_mw),
            ..record.clone()
        },
        original_emissions: original,
        emissions_reduction: original - emissions,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blend(b: i64) -> BlendPercent {
        BlendPercent::new(b).unwrap()
    }

    #[test]
    fn test_monotonic_in_blend() {
        let records = [
            NormalizedRecord::new("Jan", 2020, 1000.0, 0.0, 400.0),
            NormalizedRecord::new("Feb", 2020, 0.0, 0.0, 250.0),
            NormalizedRecord::new("Mar", 2020, 37.5, 0.0, 0.0),
            NormalizedRecord::new("Apr", 2020, 12345.6, 0.0, 98765.4),
        ];
        for r in &records {
            for b in 0..100 {
                let (lo, hi) = (blend(b), blend(b + 1));
                assert!(new_emissions(r, hi) <= new_emissions(r, lo));
                assert!(new_intensity(r, hi) <= new_intensity(r, lo));
            }
        }
    }

    #[test]
    fn test_full_blend_zeroes_everything() {
        let r = NormalizedRecord::new("Jan", 2020, 1000.0, 0.0, 400.0);
        assert_eq!(new_emissions(&r, BlendPercent::FULL), 0.0);
        assert_eq!(new_intensity(&r, BlendPercent::FULL), 0.0);
    }

    #[test]
    fn test_apply_blend_keeps_original_and_delta() {
        let r = NormalizedRecord::new("Jan", 2020, 1000.0, 5000.0, 400.0);
        let sim = apply_blend(&r, blend(25));
        assert_eq!(sim.original_emissions, 400.0);
        assert!((sim.record.co2_emissions_tonnes - 300.0).abs() < 1e-9);
        assert!((sim.emissions_reduction - 100.0).abs() < 1e-9);
        assert!((sim.record.carbon_intensity - 300.0).abs() < 1e-9);
        assert_eq!(sim.record.gas_consumption_m3, 5000.0);
        assert_eq!(r.co2_emissions_tonnes, 400.0);
    }

    #[test]
    fn test_zero_generation_floor() {
        let r = NormalizedRecord::new("Jan", 2020, 0.0, 0.0, 400.0);
        assert_eq!(apply_blend(&r, blend(10)).record.carbon_intensity, 0.0);
    }
}
