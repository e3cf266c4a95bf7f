use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{
    AppliedJob, ApplicationStatus, ApplyOutcome, PlacementStatus,
};
use super::repository::{ApplicationStore, JobPostDirectory, PlacementUpdate, StoreError};
use crate::workflows::jobs::events::{DomainEvent, OutboxPublisher};
use crate::workflows::types::{Actor, AgencyApplicantId, ApplicationId, JobPostId, UserId};

/// Errors raised by the candidate pipeline.
#[derive(Debug, thiserror::Error)]
pub enum TrackerError {
    #[error("job post {0:?} not found")]
    UnknownJobPost(JobPostId),
    #[error("application {0:?} not found")]
    UnknownApplication(ApplicationId),
    #[error("actor {0:?} lacks permission for this operation")]
    PermissionDenied(UserId),
    #[error("direct applications cannot be marked hired; use the agency pipeline")]
    DirectHireNotAllowed,
    #[error("applicant {applicant:?} does not belong to job post {job_post:?}")]
    ForeignApplicant {
        applicant: AgencyApplicantId,
        job_post: JobPostId,
    },
    #[error("no applicants selected")]
    EmptySelection,
    #[error(transparent)]
    Store(#[from] StoreError),
}

static APPLICATION_SEQUENCE: AtomicU64 = AtomicU64::new(1);

fn next_application_id() -> ApplicationId {
    ApplicationId(APPLICATION_SEQUENCE.fetch_add(1, Ordering::Relaxed))
}

/// Tracks direct and agency applications against job posts.
pub struct ApplicationTracker<S, D, P> {
    store: Arc<S>,
    directory: Arc<D>,
    outbox: Arc<P>,
}

impl<S, D, P> ApplicationTracker<S, D, P>
where
    S: ApplicationStore + 'static,
    D: JobPostDirectory + 'static,
    P: OutboxPublisher + 'static,
{
    pub fn new(store: Arc<S>, directory: Arc<D>, outbox: Arc<P>) -> Self {
        Self {
            store,
            directory,
            outbox,
        }
    }

    /// Idempotent apply: a repeat (user, job_post) pair returns the existing
    /// row and never creates a second one.
    pub fn apply(
        &self,
        job_seeker: UserId,
        job_post: JobPostId,
    ) -> Result<ApplyOutcome, TrackerError> {
        if self.directory.job_post_owner(job_post)?.is_none() {
            return Err(TrackerError::UnknownJobPost(job_post));
        }

        if let Some(existing) = self.store.find_direct(job_seeker, job_post)? {
            return Ok(ApplyOutcome {
                application: existing,
                created: false,
            });
        }

        let application = AppliedJob {
            id: next_application_id(),
            user: job_seeker,
            job_post,
            status: ApplicationStatus::Pending,
            applied_on: Utc::now(),
        };
        match self.store.insert_direct(application) {
            Ok(stored) => Ok(ApplyOutcome {
                application: stored,
                created: true,
            }),
            // Lost the race against a concurrent apply for the same pair;
            // surface the row that won.
            Err(StoreError::Conflict) => {
                let existing = self
                    .store
                    .find_direct(job_seeker, job_post)?
                    .ok_or(StoreError::NotFound)?;
                Ok(ApplyOutcome {
                    application: existing,
                    created: false,
                })
            }
            Err(err) => Err(err.into()),
        }
    }

    /// Local status update for a direct application. Hired is reserved for
    /// the agency pipeline, where it carries placement consequences.
    pub fn change_application_status(
        &self,
        id: ApplicationId,
        new_status: ApplicationStatus,
    ) -> Result<AppliedJob, TrackerError> {
        if new_status == ApplicationStatus::Hired {
            return Err(TrackerError::DirectHireNotAllowed);
        }

        let mut application = self
            .store
            .fetch_direct(id)?
            .ok_or(TrackerError::UnknownApplication(id))?;
        application.status = new_status;
        self.store.update_direct(application.clone())?;
        Ok(application)
    }

    /// Bulk transition of agency applicants on one job post.
    ///
    /// Every named applicant must belong to the post; a foreign id fails the
    /// whole call before any write. The referenced resumes move to the
    /// interim Pending placement state, or to Hired when the transition is a
    /// hire — the resume status is authoritative for candidate availability
    /// and must never lag an applicant marked Hired.
    pub fn bulk_transition_agency_applicants(
        &self,
        job_post: JobPostId,
        applicant_ids: &[AgencyApplicantId],
        new_status: ApplicationStatus,
        actor: &Actor,
    ) -> Result<usize, TrackerError> {
        let owner = self
            .directory
            .job_post_owner(job_post)?
            .ok_or(TrackerError::UnknownJobPost(job_post))?;
        if !actor.can_manage(owner) {
            return Err(TrackerError::PermissionDenied(actor.id));
        }
        if applicant_ids.is_empty() {
            return Err(TrackerError::EmptySelection);
        }

        let on_post: BTreeMap<AgencyApplicantId, _> = self
            .store
            .agency_applicants(job_post)?
            .into_iter()
            .map(|applicant| (applicant.id, applicant))
            .collect();

        let mut resumes = Vec::with_capacity(applicant_ids.len());
        for id in applicant_ids {
            let applicant = on_post.get(id).ok_or(TrackerError::ForeignApplicant {
                applicant: *id,
                job_post,
            })?;
            resumes.push(applicant.applicant);
        }

        let placement = if new_status == ApplicationStatus::Hired {
            PlacementStatus::Hired
        } else {
            PlacementStatus::Pending
        };
        let update = PlacementUpdate {
            applicants: applicant_ids
                .iter()
                .map(|id| (*id, new_status))
                .collect(),
            resumes: resumes.iter().map(|id| (*id, placement)).collect(),
        };
        self.store.apply_placement(update)?;

        info!(
            job_post = job_post.0,
            count = applicant_ids.len(),
            status = new_status.label(),
            "agency applicants transitioned"
        );

        if new_status == ApplicationStatus::Hired {
            if let Err(err) = self.outbox.enqueue(DomainEvent::ApplicantHired {
                job_post,
                recruiter: owner,
                resumes,
            }) {
                warn!(%err, "outbox enqueue failed");
            }
        }

        Ok(applicant_ids.len())
    }
}
