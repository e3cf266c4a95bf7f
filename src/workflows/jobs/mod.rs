//! Job post lifecycle: submission, moderation, syndication teardown, and the
//! agency invoice endpoint.

pub mod domain;
pub mod events;
pub mod repository;
pub mod router;
pub mod service;

pub use domain::{
    AgencyCategory, AgencyInvoiceType, JobAction, JobPost, JobPostValidation, JobStatus, JobType,
    NewJobPost, Platform, StatusChangeOutcome, TransitionRecord,
};
pub use events::{
    DomainEvent, NotificationError, NotificationService, OutboxError, OutboxPublisher,
    SyndicationError, SyndicationRelay, SyndicationService,
};
pub use repository::{JobPostRepository, RepositoryError};
pub use router::jobs_router;
pub use service::{JobWorkflowService, WorkflowError};
