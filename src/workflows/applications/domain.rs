use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::types::{AgencyApplicantId, AgencyResumeId, ApplicationId, EntityId, JobPostId, UserId};

/// Pipeline status shared by direct and agency applications.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ApplicationStatus {
    Pending,
    Shortlisted,
    Selected,
    Rejected,
    Process,
    Hired,
}

impl ApplicationStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Pending => "Pending",
            Self::Shortlisted => "Shortlisted",
            Self::Selected => "Selected",
            Self::Rejected => "Rejected",
            Self::Process => "Process",
            Self::Hired => "Hired",
        }
    }
}

/// Authoritative placement state of an agency candidate. Candidate search
/// consults this, so it must never lag behind a hire.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlacementStatus {
    Available,
    Pending,
    Hired,
}

/// A job seeker's direct application. One row per (user, job_post).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppliedJob {
    pub id: ApplicationId,
    pub user: UserId,
    pub job_post: JobPostId,
    pub status: ApplicationStatus,
    pub applied_on: DateTime<Utc>,
}

/// An agency-owned candidate profile.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyResume {
    pub id: AgencyResumeId,
    pub uploaded_by: UserId,
    pub status: PlacementStatus,
    pub skills: BTreeSet<EntityId>,
}

/// Per-job application record for an agency resume. One row per
/// (applicant, job_post).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AgencyApplicant {
    pub id: AgencyApplicantId,
    pub applicant: AgencyResumeId,
    pub job_post: JobPostId,
    pub status: ApplicationStatus,
}

/// Outcome of `apply`, distinguishing a fresh row from the idempotent hit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplyOutcome {
    pub application: AppliedJob,
    pub created: bool,
}
