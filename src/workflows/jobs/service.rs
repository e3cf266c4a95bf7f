use std::sync::Arc;

use chrono::Utc;
use tracing::{info, warn};

use super::domain::{JobAction, JobPost, JobStatus, StatusChangeOutcome, TransitionRecord};
use super::events::{DomainEvent, OutboxPublisher, SyndicationService};
use super::repository::{JobPostRepository, RepositoryError};
use crate::workflows::billing::{invoice_breakdown, BillingError, InvoiceBreakdown};
use crate::workflows::types::{Actor, JobPostId, UserId};

/// Errors raised by job post lifecycle operations.
#[derive(Debug, thiserror::Error)]
pub enum WorkflowError {
    #[error("job post {0:?} not found")]
    NotFound(JobPostId),
    #[error("actor {0:?} lacks permission for this operation")]
    PermissionDenied(UserId),
    #[error("cannot {action} a job post in status {from:?}")]
    InvalidTransition {
        from: JobStatus,
        action: &'static str,
    },
    #[error(transparent)]
    Billing(#[from] BillingError),
    #[error(transparent)]
    Repository(#[from] RepositoryError),
}

/// Lifecycle controller for job posts.
///
/// Every transition checks authorization before touching state, uses an
/// optimistic expected-status precondition on the repository, appends a
/// transition record, retracts stale syndication copies synchronously where
/// visibility drops, and enqueues outbox events for fire-and-forget side
/// effects.
pub struct JobWorkflowService<R, S, P> {
    repository: Arc<R>,
    syndication: Arc<S>,
    outbox: Arc<P>,
}

impl<R, S, P> JobWorkflowService<R, S, P>
where
    R: JobPostRepository + 'static,
    S: SyndicationService + 'static,
    P: OutboxPublisher + 'static,
{
    pub fn new(repository: Arc<R>, syndication: Arc<S>, outbox: Arc<P>) -> Self {
        Self {
            repository,
            syndication,
            outbox,
        }
    }

    /// Dispatch entry point behind the status-change API.
    pub fn change_status(
        &self,
        id: JobPostId,
        action: JobAction,
        actor: &Actor,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        match action {
            JobAction::Submit => self.submit(id, actor),
            JobAction::TogglePublish => self.toggle_publish(id, actor),
            JobAction::Approve => self.approve(id, actor),
            JobAction::ToggleLiveExpired => self.toggle_live_expired(id, actor),
            JobAction::MarkHired { message } => self.mark_hired(id, message, actor),
        }
    }

    /// Draft → Pending (owner or admin).
    pub fn submit(&self, id: JobPostId, actor: &Actor) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.can_manage(post.user) {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        if post.status != JobStatus::Draft {
            return Err(WorkflowError::InvalidTransition {
                from: post.status,
                action: "submit",
            });
        }
        self.transition(post, JobStatus::Pending, actor, TransitionEffects::default())
    }

    /// Pending ↔ Published (admin moderation). Entering Pending retracts any
    /// syndicated copies first; entering Published enqueues re-syndication.
    pub fn toggle_publish(
        &self,
        id: JobPostId,
        actor: &Actor,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.is_admin() {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        match post.status {
            JobStatus::Pending => {
                let effects = TransitionEffects {
                    announce_publication: true,
                    ..TransitionEffects::default()
                };
                self.transition(post, JobStatus::Published, actor, effects)
            }
            JobStatus::Published => {
                // A rolled-back post must never outlive its syndicated copies.
                self.retract_syndication(&post);
                self.transition(post, JobStatus::Pending, actor, TransitionEffects::default())
            }
            other => Err(WorkflowError::InvalidTransition {
                from: other,
                action: "toggle_publish",
            }),
        }
    }

    /// Published → Live (admin); notifies the owning recruiter.
    pub fn approve(
        &self,
        id: JobPostId,
        actor: &Actor,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.is_admin() {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        if post.status != JobStatus::Published {
            return Err(WorkflowError::InvalidTransition {
                from: post.status,
                action: "approve",
            });
        }
        let effects = TransitionEffects {
            notify_recruiter: true,
            ..TransitionEffects::default()
        };
        self.transition(post, JobStatus::Live, actor, effects)
    }

    /// Live ↔ Expired (owner or admin); the owning recruiter is notified
    /// either way.
    pub fn toggle_live_expired(
        &self,
        id: JobPostId,
        actor: &Actor,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.can_manage(post.user) {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        let target = match post.status {
            JobStatus::Live => JobStatus::Expired,
            JobStatus::Expired => JobStatus::Live,
            other => {
                return Err(WorkflowError::InvalidTransition {
                    from: other,
                    action: "toggle_live_expired",
                })
            }
        };
        if target == JobStatus::Expired {
            // Expired posts must not linger on external platforms.
            self.retract_syndication(&post);
        }
        let effects = TransitionEffects {
            notify_recruiter: true,
            ..TransitionEffects::default()
        };
        self.transition(post, target, actor, effects)
    }

    /// Any state → Disabled, capturing the pre-call status so `enable` can
    /// restore it. Syndicated copies are torn down synchronously.
    pub fn deactivate(
        &self,
        id: JobPostId,
        actor: &Actor,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.can_manage(post.user) {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        if post.status == JobStatus::Disabled {
            return Err(WorkflowError::InvalidTransition {
                from: post.status,
                action: "deactivate",
            });
        }

        self.retract_syndication(&post);

        let expected = post.status;
        let mut updated = post;
        updated.previous_status = Some(updated.status);
        updated.status = JobStatus::Disabled;
        updated.closed_on = Some(Utc::now());
        let stored = self.repository.update_if_status(updated, expected)?;
        self.record(&stored, expected, actor);
        self.enqueue(DomainEvent::JobDisabled { job_post: stored.id });

        Ok(StatusChangeOutcome {
            status: stored.status,
            previous_status: stored.previous_status,
        })
    }

    /// Disabled → recorded previous status (Draft when none). Re-enqueues
    /// syndication when the restored status is externally visible.
    pub fn enable(&self, id: JobPostId, actor: &Actor) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.can_manage(post.user) {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        if post.status != JobStatus::Disabled {
            return Err(WorkflowError::InvalidTransition {
                from: post.status,
                action: "enable",
            });
        }

        let restored = post.previous_status.unwrap_or(JobStatus::Draft);
        let expected = post.status;
        let mut updated = post;
        updated.status = restored;
        updated.previous_status = None;
        updated.closed_on = None;
        let stored = self.repository.update_if_status(updated, expected)?;
        self.record(&stored, expected, actor);

        if stored.status.is_externally_visible() && !stored.syndicate_to.is_empty() {
            self.enqueue(DomainEvent::JobPublished {
                job_post: stored.id,
                platforms: stored.syndicate_to.clone(),
            });
        }

        Ok(StatusChangeOutcome {
            status: stored.status,
            previous_status: stored.previous_status,
        })
    }

    /// Live → Hired, recording the hire message on the agency-side record.
    pub fn mark_hired(
        &self,
        id: JobPostId,
        message: String,
        actor: &Actor,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.can_manage(post.user) {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }
        if post.status != JobStatus::Live {
            return Err(WorkflowError::InvalidTransition {
                from: post.status,
                action: "mark_hired",
            });
        }

        let outcome = self.transition(post, JobStatus::Hired, actor, TransitionEffects::default())?;
        self.repository.record_hire_message(id, message)?;
        Ok(outcome)
    }

    /// Admin-only permanent removal. Syndicated copies are retracted before
    /// the row disappears; there is no previous_status to come back to.
    pub fn hard_delete(&self, id: JobPostId, actor: &Actor) -> Result<(), WorkflowError> {
        let post = self.fetch(id)?;
        if !actor.is_admin() {
            return Err(WorkflowError::PermissionDenied(actor.id));
        }

        self.retract_syndication(&post);
        self.repository.remove(id)?;
        info!(job_post = id.0, actor = actor.id.0, "job post permanently deleted");
        Ok(())
    }

    /// Invoice breakdown for an agency post; missing agency fields fail
    /// closed with a field-scoped error.
    pub fn invoice(&self, id: JobPostId) -> Result<InvoiceBreakdown, WorkflowError> {
        let post = self.fetch(id)?;
        let amount = post.agency_amount.ok_or(BillingError::MissingAgencyAmount)?;
        let category = post
            .agency_category
            .as_ref()
            .ok_or(BillingError::MissingAgencyCategory)?;
        Ok(invoice_breakdown(amount, category.percentage)?)
    }

    pub fn transitions(&self, id: JobPostId) -> Result<Vec<TransitionRecord>, WorkflowError> {
        Ok(self.repository.transitions(id)?)
    }

    pub fn fetch_post(&self, id: JobPostId) -> Result<JobPost, WorkflowError> {
        self.fetch(id)
    }

    fn fetch(&self, id: JobPostId) -> Result<JobPost, WorkflowError> {
        self.repository
            .fetch(id)?
            .ok_or(WorkflowError::NotFound(id))
    }

    /// Shared path for simple status swaps that keep previous_status intact.
    fn transition(
        &self,
        post: JobPost,
        target: JobStatus,
        actor: &Actor,
        effects: TransitionEffects,
    ) -> Result<StatusChangeOutcome, WorkflowError> {
        let expected = post.status;
        let mut updated = post;
        updated.status = target;
        let stored = self.repository.update_if_status(updated, expected)?;
        self.record(&stored, expected, actor);

        if effects.announce_publication && !stored.syndicate_to.is_empty() {
            self.enqueue(DomainEvent::JobPublished {
                job_post: stored.id,
                platforms: stored.syndicate_to.clone(),
            });
        }
        if effects.notify_recruiter {
            let event = match stored.status {
                JobStatus::Expired => DomainEvent::JobExpired {
                    job_post: stored.id,
                    recruiter: stored.user,
                },
                _ => DomainEvent::JobLive {
                    job_post: stored.id,
                    recruiter: stored.user,
                },
            };
            self.enqueue(event);
        }

        Ok(StatusChangeOutcome {
            status: stored.status,
            previous_status: stored.previous_status,
        })
    }

    fn record(&self, stored: &JobPost, from: JobStatus, actor: &Actor) {
        let record = TransitionRecord {
            at: Utc::now(),
            from,
            to: stored.status,
            actor: actor.id,
        };
        if let Err(err) = self.repository.append_transition(stored.id, record) {
            warn!(job_post = stored.id.0, %err, "failed to append transition record");
        }
    }

    /// Synchronous teardown of external copies. Transport failures are logged
    /// and swallowed; they never abort the primary transition.
    fn retract_syndication(&self, post: &JobPost) {
        for platform in &post.syndicate_to {
            if let Err(err) = self.syndication.retract(post.id, *platform) {
                warn!(
                    job_post = post.id.0,
                    platform = platform.label(),
                    %err,
                    "syndication retract failed"
                );
            }
        }
    }

    fn enqueue(&self, event: DomainEvent) {
        if let Err(err) = self.outbox.enqueue(event) {
            warn!(%err, "outbox enqueue failed");
        }
    }
}

#[derive(Debug, Default, Clone, Copy)]
struct TransitionEffects {
    announce_publication: bool,
    notify_recruiter: bool,
}
