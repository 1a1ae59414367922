// Ingestion & Normalization
// Raw upload bytes -> Dataset. Pure and synchronous; handlers move it onto the blocking pool.
// No dependency on the simulation engine.

pub mod cleaning;
pub mod columns;
pub mod demo;
pub mod handlers;
pub mod models;
pub mod parser;
pub mod pipeline;
