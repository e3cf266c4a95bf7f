use serde::{Deserialize, Serialize};

/// Identifier for a job post.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct JobPostId(pub u64);

/// Identifier for a platform user (recruiter, agency staff, or job seeker).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct UserId(pub u64);

/// Identifier for a direct job-seeker application row.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct ApplicationId(pub u64);

/// Identifier for an agency-owned candidate profile.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AgencyResumeId(pub u64);

/// Identifier for a per-job agency application record.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct AgencyApplicantId(pub u64);

/// Identifier for a canonical reference entity (skill, qualification, city).
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct EntityId(pub u64);

/// Identifier for a dependent record holding reference-entity links.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct RecordId(pub u64);

/// Identifier for a company.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub struct CompanyId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActorRole {
    Admin,
    Recruiter,
    AgencyAdmin,
    JobSeeker,
}

/// The authenticated identity behind a workflow call. Authentication itself
/// happens upstream; the core only consumes the resolved claim.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Actor {
    pub id: UserId,
    pub role: ActorRole,
}

impl Actor {
    pub const fn admin(id: UserId) -> Self {
        Self {
            id,
            role: ActorRole::Admin,
        }
    }

    pub const fn recruiter(id: UserId) -> Self {
        Self {
            id,
            role: ActorRole::Recruiter,
        }
    }

    pub const fn is_admin(&self) -> bool {
        matches!(self.role, ActorRole::Admin)
    }

    /// Admins manage everything; recruiters and agency admins manage posts
    /// they own.
    pub fn can_manage(&self, owner: UserId) -> bool {
        match self.role {
            ActorRole::Admin => true,
            ActorRole::Recruiter | ActorRole::AgencyAdmin => self.id == owner,
            ActorRole::JobSeeker => false,
        }
    }
}
