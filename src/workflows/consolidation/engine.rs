use std::sync::Arc;

use tracing::info;

use super::registry::{self, EntityKind};
use super::store::{ConsolidationStore, MergeFinalize, MergePlan, MergeReport, StoreError};
use crate::workflows::types::{Actor, EntityId, UserId};

#[derive(Debug, thiserror::Error)]
pub enum MergeError {
    #[error("actor {0:?} lacks permission to merge entities")]
    PermissionDenied(UserId),
    #[error("{} {id:?} does not exist", .kind.label())]
    UnknownOriginal { kind: EntityKind, id: EntityId },
    #[error("entity {0:?} cannot be merged into itself")]
    DuplicateIsOriginal(EntityId),
    #[error("no duplicates selected")]
    EmptySelection,
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Merges duplicate reference entities into a canonical row, driven by the
/// static relation registry.
pub struct ConsolidationEngine<S> {
    store: Arc<S>,
}

impl<S> ConsolidationEngine<S>
where
    S: ConsolidationStore + 'static,
{
    pub fn new(store: Arc<S>) -> Self {
        Self { store }
    }

    /// Merge `duplicates` into `original`. References move first with
    /// set-union semantics; then skill and qualification duplicates are
    /// deleted while location duplicates are re-parented under the original.
    /// Duplicates that no longer exist are skipped, so re-running a finished
    /// merge is a no-op.
    pub fn merge_entities(
        &self,
        kind: EntityKind,
        original: EntityId,
        duplicates: &[EntityId],
        actor: &Actor,
    ) -> Result<MergeReport, MergeError> {
        if !actor.is_admin() {
            return Err(MergeError::PermissionDenied(actor.id));
        }
        if duplicates.is_empty() {
            return Err(MergeError::EmptySelection);
        }
        if let Some(id) = duplicates.iter().find(|id| **id == original) {
            return Err(MergeError::DuplicateIsOriginal(*id));
        }
        if !self.store.entity_exists(kind, original)? {
            return Err(MergeError::UnknownOriginal { kind, id: original });
        }

        let live = self.store.live_duplicates(kind, duplicates)?;
        if live.is_empty() {
            return Ok(MergeReport::empty());
        }

        let finalize = match kind {
            EntityKind::Skill | EntityKind::Qualification => MergeFinalize::DeleteDuplicates,
            EntityKind::Location => MergeFinalize::ReparentUnder(original),
        };
        let plan = MergePlan {
            kind,
            original,
            duplicates: live,
            bindings: registry::bindings(kind),
            finalize,
        };
        let report = self.store.apply(&plan)?;

        info!(
            kind = kind.label(),
            original = original.0,
            duplicates = plan.duplicates.len(),
            reassigned = report.reassigned_references,
            "entities consolidated"
        );
        Ok(report)
    }
}
