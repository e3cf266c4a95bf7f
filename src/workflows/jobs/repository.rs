use super::domain::{JobPost, JobStatus, TransitionRecord};
use crate::workflows::types::JobPostId;

/// Storage abstraction for job posts. Status updates are compare-and-swap on
/// the expected current status so two concurrent transitions cannot silently
/// overwrite each other.
pub trait JobPostRepository: Send + Sync {
    fn insert(&self, post: JobPost) -> Result<JobPost, RepositoryError>;
    fn fetch(&self, id: JobPostId) -> Result<Option<JobPost>, RepositoryError>;
    /// Persist `post` only if the stored status still equals `expected`.
    fn update_if_status(
        &self,
        post: JobPost,
        expected: JobStatus,
    ) -> Result<JobPost, RepositoryError>;
    /// Permanently remove the post and its transition history.
    fn remove(&self, id: JobPostId) -> Result<(), RepositoryError>;
    fn append_transition(
        &self,
        id: JobPostId,
        record: TransitionRecord,
    ) -> Result<(), RepositoryError>;
    fn transitions(&self, id: JobPostId) -> Result<Vec<TransitionRecord>, RepositoryError>;
    /// Record the hire message on the agency-side job record.
    fn record_hire_message(&self, id: JobPostId, message: String) -> Result<(), RepositoryError>;
    fn hire_message(&self, id: JobPostId) -> Result<Option<String>, RepositoryError>;
}

#[derive(Debug, thiserror::Error)]
pub enum RepositoryError {
    #[error("job post already exists")]
    Conflict,
    #[error("job post not found")]
    NotFound,
    #[error("job post status changed concurrently (expected {expected:?}, found {found:?})")]
    StatusConflict {
        expected: JobStatus,
        found: JobStatus,
    },
    #[error("repository unavailable: {0}")]
    Unavailable(String),
}
