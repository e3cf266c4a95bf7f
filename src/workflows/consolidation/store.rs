use serde::Serialize;

use super::registry::{EntityKind, RelationBinding};
use crate::workflows::types::EntityId;

/// What happens to the duplicate rows once their references are moved.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MergeFinalize {
    /// Skill and qualification duplicates are removed outright.
    DeleteDuplicates,
    /// Location duplicates survive as children of the canonical row.
    ReparentUnder(EntityId),
}

/// The full write set of one merge, computed up front so the store can
/// apply it in a single transaction. Reassignment is listed before the
/// finalize step and must be applied in that order.
#[derive(Debug, Clone)]
pub struct MergePlan {
    pub kind: EntityKind,
    pub original: EntityId,
    pub duplicates: Vec<EntityId>,
    pub bindings: &'static [RelationBinding],
    pub finalize: MergeFinalize,
}

/// Counts reported back to the caller after a merge commits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct MergeReport {
    pub reassigned_references: usize,
    pub removed_entities: usize,
    pub reparented_entities: usize,
}

impl MergeReport {
    pub const fn empty() -> Self {
        Self {
            reassigned_references: 0,
            removed_entities: 0,
            reparented_entities: 0,
        }
    }
}

#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("entity not found")]
    NotFound,
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Storage abstraction for reference entities and their dependents.
pub trait ConsolidationStore: Send + Sync {
    fn entity_exists(&self, kind: EntityKind, id: EntityId) -> Result<bool, StoreError>;
    /// Of the given ids, the ones that still exist as rows of `kind`.
    fn live_duplicates(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<EntityId>, StoreError>;
    /// Apply the whole plan atomically: every reference in every binding is
    /// reassigned with set-union semantics, then the finalize step runs.
    /// Partial application must never be observable.
    fn apply(&self, plan: &MergePlan) -> Result<MergeReport, StoreError>;
}
