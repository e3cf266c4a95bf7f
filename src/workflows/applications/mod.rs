//! Candidate pipeline: direct applications, agency applicants, and the
//! bulk placement transition.

pub mod domain;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    AgencyApplicant, AgencyResume, AppliedJob, ApplicationStatus, ApplyOutcome, PlacementStatus,
};
pub use repository::{ApplicationStore, JobPostDirectory, PlacementUpdate, StoreError};
pub use router::application_router;
pub use service::{ApplicationTracker, TrackerError};
