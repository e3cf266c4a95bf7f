pub mod applications;
pub mod billing;
pub mod consolidation;
pub mod jobs;
pub mod types;
