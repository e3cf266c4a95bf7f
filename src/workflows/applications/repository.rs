use super::domain::{AgencyApplicant, AgencyResume, AppliedJob, ApplicationStatus, PlacementStatus};
use crate::workflows::types::{AgencyApplicantId, AgencyResumeId, ApplicationId, JobPostId, UserId};

/// Storage abstraction for the candidate pipeline.
pub trait ApplicationStore: Send + Sync {
    fn find_direct(
        &self,
        user: UserId,
        job_post: JobPostId,
    ) -> Result<Option<AppliedJob>, StoreError>;
    /// Insert a direct application; the (user, job_post) pair is unique.
    fn insert_direct(&self, application: AppliedJob) -> Result<AppliedJob, StoreError>;
    fn fetch_direct(&self, id: ApplicationId) -> Result<Option<AppliedJob>, StoreError>;
    fn update_direct(&self, application: AppliedJob) -> Result<(), StoreError>;
    fn agency_applicants(&self, job_post: JobPostId) -> Result<Vec<AgencyApplicant>, StoreError>;
    fn fetch_resume(&self, id: AgencyResumeId) -> Result<Option<AgencyResume>, StoreError>;
    /// Apply a bulk placement update as one atomic write: either every named
    /// applicant and resume is updated, or none is.
    fn apply_placement(&self, update: PlacementUpdate) -> Result<(), StoreError>;
}

/// The full write set of a bulk agency transition, precomputed by the tracker
/// so the store can apply it in one shot.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlacementUpdate {
    pub applicants: Vec<(AgencyApplicantId, ApplicationStatus)>,
    pub resumes: Vec<(AgencyResumeId, PlacementStatus)>,
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("record already exists")]
    Conflict,
    #[error("record not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Minimal view of the job-post table the tracker needs: existence and
/// ownership. Implemented by the job post repository.
pub trait JobPostDirectory: Send + Sync {
    fn job_post_owner(&self, id: JobPostId) -> Result<Option<UserId>, StoreError>;
}
