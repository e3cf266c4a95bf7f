//! Static relation registry: the exhaustive list of every place a reference
//! entity is used. Merges iterate this table generically instead of
//! hand-writing one reassignment per dependent type, so adding a dependent
//! means adding one binding here and bumping the version.

use serde::{Deserialize, Serialize};

/// Bump whenever a binding is added, removed, or changes cardinality.
pub const REGISTRY_VERSION: u32 = 1;

/// Kinds of reference entity the engine can consolidate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EntityKind {
    Skill,
    Qualification,
    Location,
}

impl EntityKind {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Skill => "skill",
            Self::Qualification => "qualification",
            Self::Location => "location",
        }
    }
}

/// Record types that hold references to one of the entity kinds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RecordKind {
    SearchLog,
    JobAlert,
    JobPost,
    TechnicalSkill,
    UserProfile,
    Project,
    AgencyResume,
    Subscription,
    AssessmentQuestion,
    Degree,
    EducationInstitute,
    AgencyBranch,
}

/// Whether a relation field holds one entity id or a set of them.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Cardinality {
    Scalar,
    Set,
}

/// One place an entity kind is referenced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct RelationBinding {
    pub record: RecordKind,
    pub field: &'static str,
    pub cardinality: Cardinality,
}

const fn bind(record: RecordKind, field: &'static str, cardinality: Cardinality) -> RelationBinding {
    RelationBinding {
        record,
        field,
        cardinality,
    }
}

const SKILL_BINDINGS: &[RelationBinding] = &[
    bind(RecordKind::SearchLog, "skills", Cardinality::Set),
    bind(RecordKind::JobAlert, "skill", Cardinality::Set),
    bind(RecordKind::JobPost, "major_skill", Cardinality::Scalar),
    bind(RecordKind::JobPost, "skills", Cardinality::Set),
    bind(RecordKind::TechnicalSkill, "skill", Cardinality::Scalar),
    bind(RecordKind::UserProfile, "technical_skills", Cardinality::Set),
    bind(RecordKind::Project, "skills", Cardinality::Set),
    bind(RecordKind::AgencyResume, "skill", Cardinality::Set),
    bind(RecordKind::Subscription, "skill", Cardinality::Scalar),
    bind(RecordKind::AssessmentQuestion, "skill", Cardinality::Scalar),
];

const QUALIFICATION_BINDINGS: &[RelationBinding] = &[
    bind(RecordKind::JobPost, "edu_qualification", Cardinality::Set),
    bind(RecordKind::Degree, "degree_name", Cardinality::Scalar),
];

const LOCATION_BINDINGS: &[RelationBinding] = &[
    bind(RecordKind::UserProfile, "city", Cardinality::Scalar),
    bind(RecordKind::UserProfile, "current_city", Cardinality::Scalar),
    bind(RecordKind::UserProfile, "preferred_city", Cardinality::Set),
    bind(RecordKind::JobPost, "location", Cardinality::Set),
    bind(RecordKind::JobAlert, "location", Cardinality::Set),
    bind(RecordKind::SearchLog, "locations", Cardinality::Set),
    bind(RecordKind::EducationInstitute, "city", Cardinality::Scalar),
    bind(RecordKind::Project, "location", Cardinality::Scalar),
    bind(RecordKind::AgencyBranch, "location", Cardinality::Scalar),
];

/// Every relation that references the given entity kind.
pub const fn bindings(kind: EntityKind) -> &'static [RelationBinding] {
    match kind {
        EntityKind::Skill => SKILL_BINDINGS,
        EntityKind::Qualification => QUALIFICATION_BINDINGS,
        EntityKind::Location => LOCATION_BINDINGS,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skill_bindings_cover_both_job_post_fields() {
        let job_post: Vec<_> = bindings(EntityKind::Skill)
            .iter()
            .filter(|binding| binding.record == RecordKind::JobPost)
            .collect();
        assert_eq!(job_post.len(), 2);
        assert!(job_post
            .iter()
            .any(|binding| binding.field == "major_skill"
                && binding.cardinality == Cardinality::Scalar));
        assert!(job_post
            .iter()
            .any(|binding| binding.field == "skills" && binding.cardinality == Cardinality::Set));
    }

    #[test]
    fn no_duplicate_bindings_within_a_kind() {
        for kind in [
            EntityKind::Skill,
            EntityKind::Qualification,
            EntityKind::Location,
        ] {
            let all = bindings(kind);
            for (i, a) in all.iter().enumerate() {
                for b in &all[i + 1..] {
                    assert!(
                        !(a.record == b.record && a.field == b.field),
                        "{:?} lists ({:?}, {}) twice",
                        kind,
                        a.record,
                        a.field
                    );
                }
            }
        }
    }

    #[test]
    fn location_bindings_include_profile_cities() {
        let fields: Vec<_> = bindings(EntityKind::Location)
            .iter()
            .filter(|binding| binding.record == RecordKind::UserProfile)
            .map(|binding| binding.field)
            .collect();
        assert_eq!(fields, vec!["city", "current_city", "preferred_city"]);
    }
}
