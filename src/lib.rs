//! Job-board workflow core: job post lifecycle, candidate pipeline,
//! reference-data consolidation, and agency invoice math.

pub mod config;
pub mod error;
pub mod infra;
pub mod telemetry;
pub mod workflows;
