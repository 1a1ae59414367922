// Compliance Simulation Engine
// (records, blend, threshold) -> simulated records + ComplianceResult, recomputed per call.
// Depends on the NormalizedRecord shape only, not on how it was parsed.

pub mod blend;
pub mod engine;
pub mod handlers;
pub mod models;
