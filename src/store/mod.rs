use std::fmt;

use async_trait::async_trait;
use bytes::Bytes;
use serde::{Deserialize, Serialize};

mod memory;

pub use memory::MemoryStore;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    Mentor,
    Mentee,
}

impl Role {
    pub fn as_str(self) -> &'static str {
        match self {
            Role::Mentor => "mentor",
            Role::Mentee => "mentee",
        }
    }
}

impl fmt::Display for Role {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone)]
pub struct MentorProfile {
    pub name: String,
    pub bio: String,
    pub image: Option<Bytes>,
    pub skills: Vec<String>,
}

#[derive(Debug, Clone)]
pub struct MenteeProfile {
    pub name: String,
    pub bio: String,
    pub image: Option<Bytes>,
}

/// Role-shaped profile data. Skills exist only on the mentor variant.
#[derive(Debug, Clone)]
pub enum Profile {
    Mentor(MentorProfile),
    Mentee(MenteeProfile),
}

impl Profile {
    pub fn new(role: Role, name: String) -> Self {
        match role {
            Role::Mentor => Profile::Mentor(MentorProfile {
                name,
                bio: String::new(),
                image: None,
                skills: Vec::new(),
            }),
            Role::Mentee => Profile::Mentee(MenteeProfile {
                name,
                bio: String::new(),
                image: None,
            }),
        }
    }

    pub fn role(&self) -> Role {
        match self {
            Profile::Mentor(_) => Role::Mentor,
            Profile::Mentee(_) => Role::Mentee,
        }
    }

    pub fn name(&self) -> &str {
        match self {
            Profile::Mentor(p) => &p.name,
            Profile::Mentee(p) => &p.name,
        }
    }

    pub fn image(&self) -> Option<&Bytes> {
        match self {
            Profile::Mentor(p) => p.image.as_ref(),
            Profile::Mentee(p) => p.image.as_ref(),
        }
    }
}

/// User record. `id` and `email` are immutable once assigned, and the role is
/// fixed by the profile variant.
#[derive(Debug, Clone)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub password_hash: String,
    pub profile: Profile,
}

impl User {
    pub fn role(&self) -> Role {
        self.profile.role()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchStatus {
    Pending,
    Accepted,
    Rejected,
    Cancelled,
}

impl MatchStatus {
    pub fn as_str(self) -> &'static str {
        match self {
            MatchStatus::Pending => "pending",
            MatchStatus::Accepted => "accepted",
            MatchStatus::Rejected => "rejected",
            MatchStatus::Cancelled => "cancelled",
        }
    }

    pub fn is_terminal(self) -> bool {
        self != MatchStatus::Pending
    }
}

impl fmt::Display for MatchStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MatchRequest {
    pub id: i64,
    pub mentor_id: i64,
    pub mentee_id: i64,
    pub message: String,
    pub status: MatchStatus,
}

/// How status writes treat a request that already reached a terminal status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransitionPolicy {
    /// Any authorized write overwrites the current status.
    #[default]
    Lenient,
    /// Writes against a terminal status are refused.
    Strict,
}

/// Overwrite set for a profile update. `image` and `skills` are `None` when
/// the caller did not supply them; the stored values are kept in that case.
#[derive(Debug, Clone, Default)]
pub struct ProfileChanges {
    pub name: String,
    pub bio: String,
    pub image: Option<Bytes>,
    pub skills: Option<Vec<String>>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, thiserror::Error)]
pub enum StoreError {
    #[error("email already registered")]
    EmailTaken,
    #[error("user not found")]
    UserNotFound,
    #[error("match request not found")]
    RequestNotFound,
    #[error("match request already {0}")]
    AlreadyResolved(MatchStatus),
}

/// Storage seam for users and match requests. The in-process implementation
/// lives in [`MemoryStore`]; a durable backend plugs in behind the same
/// trait without touching business logic.
#[async_trait]
pub trait Store: Send + Sync {
    /// Inserts a new user with a fresh sequential id. The email-uniqueness
    /// check and the insert are a single atomic step.
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<User, StoreError>;

    async fn user_by_email(&self, email: &str) -> Option<User>;

    async fn user_by_id(&self, id: i64) -> Option<User>;

    /// All users with the given role, in ascending id order.
    async fn users_by_role(&self, role: Role) -> Vec<User>;

    async fn update_profile(
        &self,
        user_id: i64,
        changes: ProfileChanges,
    ) -> Result<User, StoreError>;

    /// Creates a pending request with a fresh sequential id. Role checks on
    /// the referenced users are the caller's responsibility.
    async fn create_request(&self, mentor_id: i64, mentee_id: i64, message: &str) -> MatchRequest;

    async fn request_by_id(&self, id: i64) -> Option<MatchRequest>;

    /// Writes the status, applying `policy` atomically against the current
    /// value.
    async fn set_request_status(
        &self,
        id: i64,
        status: MatchStatus,
        policy: TransitionPolicy,
    ) -> Result<MatchRequest, StoreError>;

    async fn requests_for_mentor(&self, mentor_id: i64) -> Vec<MatchRequest>;

    async fn requests_for_mentee(&self, mentee_id: i64) -> Vec<MatchRequest>;
}
