use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use super::domain::Platform;
use crate::workflows::types::{AgencyResumeId, JobPostId, UserId};

/// External syndication collaborator (job boards, social platforms).
/// At-most-once, no retry contract assumed.
pub trait SyndicationService: Send + Sync {
    fn publish(&self, job_post: JobPostId, platform: Platform) -> Result<(), SyndicationError>;
    fn retract(&self, job_post: JobPostId, platform: Platform) -> Result<(), SyndicationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum SyndicationError {
    #[error("syndication transport unavailable: {0}")]
    Transport(String),
}

/// Templated e-mail/notification collaborator, fire-and-forget.
pub trait NotificationService: Send + Sync {
    fn send_templated(
        &self,
        template: &str,
        recipients: &[UserId],
        context: BTreeMap<String, String>,
    ) -> Result<(), NotificationError>;
}

#[derive(Debug, thiserror::Error)]
pub enum NotificationError {
    #[error("notification transport unavailable: {0}")]
    Transport(String),
}

/// Domain events the workflow core emits instead of performing external
/// calls inline. Producers enqueue and return; a consumer drains the outbox
/// and owns the external failure domain.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum DomainEvent {
    JobPublished {
        job_post: JobPostId,
        platforms: Vec<Platform>,
    },
    JobDisabled {
        job_post: JobPostId,
    },
    JobLive {
        job_post: JobPostId,
        recruiter: UserId,
    },
    JobExpired {
        job_post: JobPostId,
        recruiter: UserId,
    },
    ApplicantHired {
        job_post: JobPostId,
        recruiter: UserId,
        resumes: Vec<AgencyResumeId>,
    },
}

/// Outbox producer side. Enqueue failures are logged and swallowed by
/// callers; they never fail the primary operation.
pub trait OutboxPublisher: Send + Sync {
    fn enqueue(&self, event: DomainEvent) -> Result<(), OutboxError>;
}

#[derive(Debug, thiserror::Error)]
pub enum OutboxError {
    #[error("outbox unavailable: {0}")]
    Unavailable(String),
}

/// Consumer translating drained outbox events into syndication and
/// notification calls. External failures are logged and swallowed here;
/// nothing propagates back into the workflow transaction.
pub struct SyndicationRelay<S, N> {
    syndication: Arc<S>,
    notifications: Arc<N>,
}

impl<S, N> SyndicationRelay<S, N>
where
    S: SyndicationService,
    N: NotificationService,
{
    pub fn new(syndication: Arc<S>, notifications: Arc<N>) -> Self {
        Self {
            syndication,
            notifications,
        }
    }

    pub fn deliver(&self, event: &DomainEvent) {
        match event {
            DomainEvent::JobPublished {
                job_post,
                platforms,
            } => {
                for platform in platforms {
                    if let Err(err) = self.syndication.publish(*job_post, *platform) {
                        warn!(?job_post, platform = platform.label(), %err, "syndication publish failed");
                    }
                }
            }
            DomainEvent::JobDisabled { job_post } => {
                // Retraction already happened synchronously inside the
                // transition; nothing external left to do.
                debug!(?job_post, "job disabled event observed");
            }
            DomainEvent::JobLive {
                job_post,
                recruiter,
            } => {
                self.notify_status_change("job_post_live", *job_post, *recruiter);
            }
            DomainEvent::JobExpired {
                job_post,
                recruiter,
            } => {
                self.notify_status_change("job_post_expired", *job_post, *recruiter);
            }
            DomainEvent::ApplicantHired {
                job_post,
                recruiter,
                resumes,
            } => {
                let mut context = BTreeMap::new();
                context.insert("job_post".to_string(), job_post.0.to_string());
                context.insert("hired_count".to_string(), resumes.len().to_string());
                if let Err(err) =
                    self.notifications
                        .send_templated("applicants_hired", &[*recruiter], context)
                {
                    warn!(?job_post, %err, "hire notification failed");
                }
            }
        }
    }

    pub fn deliver_all<'a>(&self, events: impl IntoIterator<Item = &'a DomainEvent>) {
        for event in events {
            self.deliver(event);
        }
    }

    fn notify_status_change(&self, template: &str, job_post: JobPostId, recruiter: UserId) {
        let mut context = BTreeMap::new();
        context.insert("job_post".to_string(), job_post.0.to_string());
        if let Err(err) = self
            .notifications
            .send_templated(template, &[recruiter], context)
        {
            warn!(?job_post, template, %err, "status notification failed");
        }
    }
}
