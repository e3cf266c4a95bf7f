use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::workflows::billing::Paise;
use crate::workflows::types::{CompanyId, EntityId, JobPostId, UserId};

/// Lifecycle states of a job post. Visibility, billing eligibility, and
/// syndication all key off this.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobStatus {
    Draft,
    Pending,
    Published,
    Live,
    Process,
    Hired,
    Disabled,
    Expired,
}

impl JobStatus {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Draft => "Draft",
            Self::Pending => "Pending",
            Self::Published => "Published",
            Self::Live => "Live",
            Self::Process => "Process",
            Self::Hired => "Hired",
            Self::Disabled => "Disabled",
            Self::Expired => "Expired",
        }
    }

    /// Whether external syndication copies may exist for this status.
    pub const fn is_externally_visible(self) -> bool {
        matches!(self, Self::Published | Self::Live)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JobType {
    FullTime,
    Internship,
    WalkIn,
    Government,
}

/// External platforms a post can be syndicated to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Platform {
    Facebook,
    Twitter,
    Linkedin,
}

impl Platform {
    pub const fn label(self) -> &'static str {
        match self {
            Self::Facebook => "Facebook",
            Self::Twitter => "Twitter",
            Self::Linkedin => "LinkedIn",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AgencyInvoiceType {
    Recurring,
    OneTime,
}

/// Fee category agreed with the agency's client; the percentage drives the
/// invoice calculation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AgencyCategory {
    pub name: String,
    pub percentage: f64,
}

/// A recruiter-authored job listing and its lifecycle state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobPost {
    pub id: JobPostId,
    pub title: String,
    pub user: UserId,
    pub company: CompanyId,
    pub job_type: JobType,
    pub status: JobStatus,
    pub previous_status: Option<JobStatus>,
    pub major_skill: EntityId,
    pub skills: BTreeSet<EntityId>,
    pub location: BTreeSet<EntityId>,
    pub edu_qualification: BTreeSet<EntityId>,
    pub industry: BTreeSet<EntityId>,
    pub functional_area: BTreeSet<EntityId>,
    pub syndicate_to: Vec<Platform>,
    pub agency_amount: Option<Paise>,
    pub agency_category: Option<AgencyCategory>,
    pub agency_invoice_type: AgencyInvoiceType,
    pub closed_on: Option<DateTime<Utc>>,
}

/// Inputs for creating a draft post. Kept separate from [`JobPost`] so the
/// major-skill membership invariant is enforced at the only entry point.
#[derive(Debug, Clone)]
pub struct NewJobPost {
    pub id: JobPostId,
    pub title: String,
    pub user: UserId,
    pub company: CompanyId,
    pub job_type: JobType,
    pub major_skill: EntityId,
    pub skills: BTreeSet<EntityId>,
    pub location: BTreeSet<EntityId>,
    pub edu_qualification: BTreeSet<EntityId>,
    pub industry: BTreeSet<EntityId>,
    pub functional_area: BTreeSet<EntityId>,
    pub syndicate_to: Vec<Platform>,
    pub agency_amount: Option<Paise>,
    pub agency_category: Option<AgencyCategory>,
    pub agency_invoice_type: AgencyInvoiceType,
}

#[derive(Debug, thiserror::Error)]
pub enum JobPostValidation {
    #[error("major skill {0:?} must be a member of the post's skill set")]
    MajorSkillNotInSkills(EntityId),
    #[error("a job post requires at least one skill")]
    EmptySkillSet,
}

impl JobPost {
    /// Create a draft post, enforcing `major_skill ∈ skills`.
    pub fn draft(input: NewJobPost) -> Result<Self, JobPostValidation> {
        if input.skills.is_empty() {
            return Err(JobPostValidation::EmptySkillSet);
        }
        if !input.skills.contains(&input.major_skill) {
            return Err(JobPostValidation::MajorSkillNotInSkills(input.major_skill));
        }

        Ok(Self {
            id: input.id,
            title: input.title,
            user: input.user,
            company: input.company,
            job_type: input.job_type,
            status: JobStatus::Draft,
            previous_status: None,
            major_skill: input.major_skill,
            skills: input.skills,
            location: input.location,
            edu_qualification: input.edu_qualification,
            industry: input.industry,
            functional_area: input.functional_area,
            syndicate_to: input.syndicate_to,
            agency_amount: input.agency_amount,
            agency_category: input.agency_category,
            agency_invoice_type: input.agency_invoice_type,
            closed_on: None,
        })
    }
}

/// Append-only history entry for a status transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct TransitionRecord {
    pub at: DateTime<Utc>,
    pub from: JobStatus,
    pub to: JobStatus,
    pub actor: UserId,
}

/// Workflow actions exposed through `change_status`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JobAction {
    Submit,
    TogglePublish,
    Approve,
    ToggleLiveExpired,
    MarkHired { message: String },
}

impl JobAction {
    pub const fn name(&self) -> &'static str {
        match self {
            Self::Submit => "submit",
            Self::TogglePublish => "toggle_publish",
            Self::Approve => "approve",
            Self::ToggleLiveExpired => "toggle_live_expired",
            Self::MarkHired { .. } => "mark_hired",
        }
    }
}

/// Result of a status transition, echoing the persisted fields callers key
/// their UI off.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusChangeOutcome {
    pub status: JobStatus,
    pub previous_status: Option<JobStatus>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn skills(ids: &[u64]) -> BTreeSet<EntityId> {
        ids.iter().copied().map(EntityId).collect()
    }

    fn new_post(major: u64, skill_ids: &[u64]) -> NewJobPost {
        NewJobPost {
            id: JobPostId(1),
            title: "Senior Backend Engineer".to_string(),
            user: UserId(10),
            company: CompanyId(3),
            job_type: JobType::FullTime,
            major_skill: EntityId(major),
            skills: skills(skill_ids),
            location: BTreeSet::new(),
            edu_qualification: BTreeSet::new(),
            industry: BTreeSet::new(),
            functional_area: BTreeSet::new(),
            syndicate_to: Vec::new(),
            agency_amount: None,
            agency_category: None,
            agency_invoice_type: AgencyInvoiceType::Recurring,
        }
    }

    #[test]
    fn draft_requires_major_skill_membership() {
        assert!(matches!(
            JobPost::draft(new_post(9, &[1, 2])),
            Err(JobPostValidation::MajorSkillNotInSkills(EntityId(9)))
        ));

        let post = JobPost::draft(new_post(1, &[1, 2])).expect("valid draft");
        assert_eq!(post.status, JobStatus::Draft);
        assert!(post.previous_status.is_none());
        assert!(post.closed_on.is_none());
    }

    #[test]
    fn draft_rejects_empty_skill_set() {
        assert!(matches!(
            JobPost::draft(new_post(1, &[])),
            Err(JobPostValidation::EmptySkillSet)
        ));
    }

    #[test]
    fn visibility_covers_published_and_live_only() {
        assert!(JobStatus::Published.is_externally_visible());
        assert!(JobStatus::Live.is_externally_visible());
        assert!(!JobStatus::Pending.is_externally_visible());
        assert!(!JobStatus::Disabled.is_externally_visible());
    }
}
