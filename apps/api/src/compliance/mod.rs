// Threshold classification and regulatory regimes
// One evaluator, parameterized by threshold, shared by EU ETS, CSRD and the MRV completeness check.

pub mod classification;
pub mod handlers;
pub mod regimes;
pub mod report;
