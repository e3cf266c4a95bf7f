//! In-memory implementations of the storage and collaborator traits, used by
//! the binary and the integration tests.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::sync::{Arc, Mutex};

use crate::workflows::applications::domain::{AgencyApplicant, AgencyResume, AppliedJob};
use crate::workflows::applications::repository::{
    ApplicationStore, JobPostDirectory, PlacementUpdate, StoreError as ApplicationStoreError,
};
use crate::workflows::consolidation::registry::{Cardinality, EntityKind, RecordKind};
use crate::workflows::consolidation::store::{
    ConsolidationStore, MergeFinalize, MergePlan, MergeReport,
    StoreError as ConsolidationStoreError,
};
use crate::workflows::jobs::domain::{JobPost, JobStatus, Platform, TransitionRecord};
use crate::workflows::jobs::events::{
    DomainEvent, NotificationError, NotificationService, OutboxError, OutboxPublisher,
    SyndicationError, SyndicationService,
};
use crate::workflows::jobs::repository::{JobPostRepository, RepositoryError};
use crate::workflows::types::{
    AgencyApplicantId, AgencyResumeId, ApplicationId, EntityId, JobPostId, RecordId, UserId,
};

#[derive(Default)]
struct JobPostTables {
    posts: HashMap<JobPostId, JobPost>,
    transitions: HashMap<JobPostId, Vec<TransitionRecord>>,
    hire_messages: HashMap<JobPostId, String>,
}

#[derive(Default, Clone)]
pub struct InMemoryJobPostRepository {
    inner: Arc<Mutex<JobPostTables>>,
}

impl JobPostRepository for InMemoryJobPostRepository {
    fn insert(&self, post: JobPost) -> Result<JobPost, RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        if guard.posts.contains_key(&post.id) {
            return Err(RepositoryError::Conflict);
        }
        guard.posts.insert(post.id, post.clone());
        Ok(post)
    }

    fn fetch(&self, id: JobPostId) -> Result<Option<JobPost>, RepositoryError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard.posts.get(&id).cloned())
    }

    fn update_if_status(
        &self,
        post: JobPost,
        expected: JobStatus,
    ) -> Result<JobPost, RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        let stored = guard.posts.get(&post.id).ok_or(RepositoryError::NotFound)?;
        if stored.status != expected {
            return Err(RepositoryError::StatusConflict {
                expected,
                found: stored.status,
            });
        }
        guard.posts.insert(post.id, post.clone());
        Ok(post)
    }

    fn remove(&self, id: JobPostId) -> Result<(), RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        guard.posts.remove(&id).ok_or(RepositoryError::NotFound)?;
        guard.transitions.remove(&id);
        guard.hire_messages.remove(&id);
        Ok(())
    }

    fn append_transition(
        &self,
        id: JobPostId,
        record: TransitionRecord,
    ) -> Result<(), RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        if !guard.posts.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        guard.transitions.entry(id).or_default().push(record);
        Ok(())
    }

    fn transitions(&self, id: JobPostId) -> Result<Vec<TransitionRecord>, RepositoryError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard.transitions.get(&id).cloned().unwrap_or_default())
    }

    fn record_hire_message(&self, id: JobPostId, message: String) -> Result<(), RepositoryError> {
        let mut guard = self.inner.lock().expect("repository mutex poisoned");
        if !guard.posts.contains_key(&id) {
            return Err(RepositoryError::NotFound);
        }
        guard.hire_messages.insert(id, message);
        Ok(())
    }

    fn hire_message(&self, id: JobPostId) -> Result<Option<String>, RepositoryError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard.hire_messages.get(&id).cloned())
    }
}

impl JobPostDirectory for InMemoryJobPostRepository {
    fn job_post_owner(&self, id: JobPostId) -> Result<Option<UserId>, ApplicationStoreError> {
        let guard = self.inner.lock().expect("repository mutex poisoned");
        Ok(guard.posts.get(&id).map(|post| post.user))
    }
}

#[derive(Default)]
struct ApplicationTables {
    direct: HashMap<ApplicationId, AppliedJob>,
    direct_pairs: HashMap<(UserId, JobPostId), ApplicationId>,
    resumes: HashMap<AgencyResumeId, AgencyResume>,
    agency: HashMap<AgencyApplicantId, AgencyApplicant>,
}

#[derive(Default, Clone)]
pub struct InMemoryApplicationStore {
    inner: Arc<Mutex<ApplicationTables>>,
}

impl InMemoryApplicationStore {
    pub fn seed_resume(&self, resume: AgencyResume) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.resumes.insert(resume.id, resume);
    }

    pub fn seed_agency_applicant(&self, applicant: AgencyApplicant) {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        guard.agency.insert(applicant.id, applicant);
    }

    pub fn agency_applicant(&self, id: AgencyApplicantId) -> Option<AgencyApplicant> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        guard.agency.get(&id).cloned()
    }
}

impl ApplicationStore for InMemoryApplicationStore {
    fn find_direct(
        &self,
        user: UserId,
        job_post: JobPostId,
    ) -> Result<Option<AppliedJob>, ApplicationStoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .direct_pairs
            .get(&(user, job_post))
            .and_then(|id| guard.direct.get(id))
            .cloned())
    }

    fn insert_direct(&self, application: AppliedJob) -> Result<AppliedJob, ApplicationStoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        let pair = (application.user, application.job_post);
        if guard.direct_pairs.contains_key(&pair) || guard.direct.contains_key(&application.id) {
            return Err(ApplicationStoreError::Conflict);
        }
        guard.direct_pairs.insert(pair, application.id);
        guard.direct.insert(application.id, application.clone());
        Ok(application)
    }

    fn fetch_direct(&self, id: ApplicationId) -> Result<Option<AppliedJob>, ApplicationStoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.direct.get(&id).cloned())
    }

    fn update_direct(&self, application: AppliedJob) -> Result<(), ApplicationStoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        if !guard.direct.contains_key(&application.id) {
            return Err(ApplicationStoreError::NotFound);
        }
        guard.direct.insert(application.id, application);
        Ok(())
    }

    fn agency_applicants(
        &self,
        job_post: JobPostId,
    ) -> Result<Vec<AgencyApplicant>, ApplicationStoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard
            .agency
            .values()
            .filter(|applicant| applicant.job_post == job_post)
            .cloned()
            .collect())
    }

    fn fetch_resume(
        &self,
        id: AgencyResumeId,
    ) -> Result<Option<AgencyResume>, ApplicationStoreError> {
        let guard = self.inner.lock().expect("store mutex poisoned");
        Ok(guard.resumes.get(&id).cloned())
    }

    fn apply_placement(&self, update: PlacementUpdate) -> Result<(), ApplicationStoreError> {
        let mut guard = self.inner.lock().expect("store mutex poisoned");
        // Validate the full write set before touching anything so the update
        // stays all-or-nothing.
        for (id, _) in &update.applicants {
            if !guard.agency.contains_key(id) {
                return Err(ApplicationStoreError::NotFound);
            }
        }
        for (id, _) in &update.resumes {
            if !guard.resumes.contains_key(id) {
                return Err(ApplicationStoreError::NotFound);
            }
        }
        for (id, status) in &update.applicants {
            if let Some(applicant) = guard.agency.get_mut(id) {
                applicant.status = *status;
            }
        }
        for (id, status) in &update.resumes {
            if let Some(resume) = guard.resumes.get_mut(id) {
                resume.status = *status;
            }
        }
        Ok(())
    }
}

/// One canonical reference row: display name plus, for locations, the parent
/// city link.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EntityRow {
    pub name: String,
    pub parent: Option<EntityId>,
}

type RelationKey = (RecordKind, &'static str);

#[derive(Default, Clone)]
struct ReferenceTables {
    entities: BTreeMap<EntityKind, BTreeMap<EntityId, EntityRow>>,
    scalars: BTreeMap<RelationKey, BTreeMap<RecordId, EntityId>>,
    sets: BTreeMap<RelationKey, BTreeMap<RecordId, BTreeSet<EntityId>>>,
}

/// Reference entities plus a generic model of every dependent relation,
/// keyed by `(record kind, field)` exactly as the registry enumerates them.
#[derive(Default, Clone)]
pub struct InMemoryReferenceStore {
    inner: Arc<Mutex<ReferenceTables>>,
}

impl InMemoryReferenceStore {
    pub fn seed_entity(&self, kind: EntityKind, id: EntityId, name: &str) {
        let mut guard = self.inner.lock().expect("reference mutex poisoned");
        guard.entities.entry(kind).or_default().insert(
            id,
            EntityRow {
                name: name.to_string(),
                parent: None,
            },
        );
    }

    pub fn set_scalar(
        &self,
        record: RecordKind,
        field: &'static str,
        row: RecordId,
        entity: EntityId,
    ) {
        let mut guard = self.inner.lock().expect("reference mutex poisoned");
        guard
            .scalars
            .entry((record, field))
            .or_default()
            .insert(row, entity);
    }

    pub fn add_to_set(
        &self,
        record: RecordKind,
        field: &'static str,
        row: RecordId,
        entity: EntityId,
    ) {
        let mut guard = self.inner.lock().expect("reference mutex poisoned");
        guard
            .sets
            .entry((record, field))
            .or_default()
            .entry(row)
            .or_default()
            .insert(entity);
    }

    pub fn scalar(&self, record: RecordKind, field: &'static str, row: RecordId) -> Option<EntityId> {
        let guard = self.inner.lock().expect("reference mutex poisoned");
        guard
            .scalars
            .get(&(record, field))
            .and_then(|rows| rows.get(&row))
            .copied()
    }

    pub fn set(&self, record: RecordKind, field: &'static str, row: RecordId) -> BTreeSet<EntityId> {
        let guard = self.inner.lock().expect("reference mutex poisoned");
        guard
            .sets
            .get(&(record, field))
            .and_then(|rows| rows.get(&row))
            .cloned()
            .unwrap_or_default()
    }

    pub fn entity(&self, kind: EntityKind, id: EntityId) -> Option<EntityRow> {
        let guard = self.inner.lock().expect("reference mutex poisoned");
        guard
            .entities
            .get(&kind)
            .and_then(|rows| rows.get(&id))
            .cloned()
    }
}

impl ConsolidationStore for InMemoryReferenceStore {
    fn entity_exists(
        &self,
        kind: EntityKind,
        id: EntityId,
    ) -> Result<bool, ConsolidationStoreError> {
        let guard = self.inner.lock().expect("reference mutex poisoned");
        Ok(guard
            .entities
            .get(&kind)
            .map_or(false, |rows| rows.contains_key(&id)))
    }

    fn live_duplicates(
        &self,
        kind: EntityKind,
        ids: &[EntityId],
    ) -> Result<Vec<EntityId>, ConsolidationStoreError> {
        let guard = self.inner.lock().expect("reference mutex poisoned");
        let rows = guard.entities.get(&kind);
        Ok(ids
            .iter()
            .copied()
            .filter(|id| rows.map_or(false, |rows| rows.contains_key(id)))
            .collect())
    }

    fn apply(&self, plan: &MergePlan) -> Result<MergeReport, ConsolidationStoreError> {
        let mut guard = self.inner.lock().expect("reference mutex poisoned");
        // Stage the whole merge on a copy, then swap. A failure part way
        // through leaves the live tables untouched.
        let mut staged = guard.clone();
        let duplicates: BTreeSet<EntityId> = plan.duplicates.iter().copied().collect();
        let mut reassigned = 0usize;

        for binding in plan.bindings {
            let key = (binding.record, binding.field);
            match binding.cardinality {
                Cardinality::Scalar => {
                    if let Some(rows) = staged.scalars.get_mut(&key) {
                        for entity in rows.values_mut() {
                            if duplicates.contains(entity) {
                                *entity = plan.original;
                                reassigned += 1;
                            }
                        }
                    }
                }
                Cardinality::Set => {
                    if let Some(rows) = staged.sets.get_mut(&key) {
                        for entities in rows.values_mut() {
                            let before = entities.len();
                            entities.retain(|entity| !duplicates.contains(entity));
                            let dropped = before - entities.len();
                            if dropped > 0 {
                                entities.insert(plan.original);
                                reassigned += dropped;
                            }
                        }
                    }
                }
            }
        }

        let mut removed = 0usize;
        let mut reparented = 0usize;
        let rows = staged.entities.entry(plan.kind).or_default();
        match plan.finalize {
            MergeFinalize::DeleteDuplicates => {
                for id in &plan.duplicates {
                    if rows.remove(id).is_some() {
                        removed += 1;
                    }
                }
            }
            MergeFinalize::ReparentUnder(parent) => {
                for id in &plan.duplicates {
                    if let Some(row) = rows.get_mut(id) {
                        row.parent = Some(parent);
                        reparented += 1;
                    }
                }
            }
        }

        *guard = staged;
        Ok(MergeReport {
            reassigned_references: reassigned,
            removed_entities: removed,
            reparented_entities: reparented,
        })
    }
}

/// Recording fake for the syndication collaborator; can be flipped into a
/// failing mode to exercise the swallow-and-log paths.
#[derive(Default, Clone)]
pub struct RecordingSyndication {
    calls: Arc<Mutex<Vec<(JobPostId, Platform, &'static str)>>>,
    failing: Arc<Mutex<bool>>,
}

impl RecordingSyndication {
    pub fn set_failing(&self, failing: bool) {
        *self.failing.lock().expect("syndication mutex poisoned") = failing;
    }

    pub fn calls(&self) -> Vec<(JobPostId, Platform, &'static str)> {
        self.calls.lock().expect("syndication mutex poisoned").clone()
    }

    fn record(&self, job_post: JobPostId, platform: Platform, op: &'static str) -> Result<(), SyndicationError> {
        if *self.failing.lock().expect("syndication mutex poisoned") {
            return Err(SyndicationError::Transport("forced failure".to_string()));
        }
        self.calls
            .lock()
            .expect("syndication mutex poisoned")
            .push((job_post, platform, op));
        Ok(())
    }
}

impl SyndicationService for RecordingSyndication {
    fn publish(&self, job_post: JobPostId, platform: Platform) -> Result<(), SyndicationError> {
        self.record(job_post, platform, "publish")
    }

    fn retract(&self, job_post: JobPostId, platform: Platform) -> Result<(), SyndicationError> {
        self.record(job_post, platform, "retract")
    }
}

#[derive(Default, Clone)]
pub struct RecordingNotifier {
    sent: Arc<Mutex<Vec<(String, Vec<UserId>)>>>,
}

impl RecordingNotifier {
    pub fn sent(&self) -> Vec<(String, Vec<UserId>)> {
        self.sent.lock().expect("notifier mutex poisoned").clone()
    }
}

impl NotificationService for RecordingNotifier {
    fn send_templated(
        &self,
        template: &str,
        recipients: &[UserId],
        _context: BTreeMap<String, String>,
    ) -> Result<(), NotificationError> {
        self.sent
            .lock()
            .expect("notifier mutex poisoned")
            .push((template.to_string(), recipients.to_vec()));
        Ok(())
    }
}

#[derive(Default, Clone)]
pub struct InMemoryOutbox {
    events: Arc<Mutex<Vec<DomainEvent>>>,
}

impl InMemoryOutbox {
    pub fn events(&self) -> Vec<DomainEvent> {
        self.events.lock().expect("outbox mutex poisoned").clone()
    }

    pub fn drain(&self) -> Vec<DomainEvent> {
        let mut guard = self.events.lock().expect("outbox mutex poisoned");
        std::mem::take(&mut *guard)
    }
}

impl OutboxPublisher for InMemoryOutbox {
    fn enqueue(&self, event: DomainEvent) -> Result<(), OutboxError> {
        self.events
            .lock()
            .expect("outbox mutex poisoned")
            .push(event);
        Ok(())
    }
}
