//! Reference-data consolidation: merging duplicate skills, qualifications,
//! and locations into a canonical row without dropping any dependent
//! reference.

pub mod engine;
pub mod registry;
pub mod router;
pub mod store;

pub use engine::{ConsolidationEngine, MergeError};
pub use registry::{bindings, Cardinality, EntityKind, RecordKind, RelationBinding, REGISTRY_VERSION};
pub use router::consolidation_router;
pub use store::{ConsolidationStore, MergeFinalize, MergePlan, MergeReport, StoreError};
