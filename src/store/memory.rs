use std::collections::{BTreeMap, HashMap};

use async_trait::async_trait;
use tokio::sync::RwLock;

use super::{
    MatchRequest, MatchStatus, Profile, ProfileChanges, Role, Store, StoreError, TransitionPolicy,
    User,
};

/// Process-local store. Every check-then-write sequence (email uniqueness,
/// profile overwrite, status transition) runs inside a single write-lock
/// section, so concurrent handlers cannot interleave mid-mutation.
#[derive(Default)]
pub struct MemoryStore {
    inner: RwLock<Inner>,
}

#[derive(Default)]
struct Inner {
    users: BTreeMap<i64, User>,
    emails: HashMap<String, i64>,
    requests: BTreeMap<i64, MatchRequest>,
    last_user_id: i64,
    last_request_id: i64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl Store for MemoryStore {
    async fn create_user(
        &self,
        email: &str,
        password_hash: &str,
        name: &str,
        role: Role,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        if inner.emails.contains_key(email) {
            return Err(StoreError::EmailTaken);
        }
        inner.last_user_id += 1;
        let user = User {
            id: inner.last_user_id,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            profile: Profile::new(role, name.to_string()),
        };
        inner.emails.insert(email.to_string(), user.id);
        inner.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn user_by_email(&self, email: &str) -> Option<User> {
        let inner = self.inner.read().await;
        inner
            .emails
            .get(email)
            .and_then(|id| inner.users.get(id))
            .cloned()
    }

    async fn user_by_id(&self, id: i64) -> Option<User> {
        self.inner.read().await.users.get(&id).cloned()
    }

    async fn users_by_role(&self, role: Role) -> Vec<User> {
        // BTreeMap iteration gives ascending ids, which is insertion order.
        self.inner
            .read()
            .await
            .users
            .values()
            .filter(|u| u.role() == role)
            .cloned()
            .collect()
    }

    async fn update_profile(
        &self,
        user_id: i64,
        changes: ProfileChanges,
    ) -> Result<User, StoreError> {
        let mut inner = self.inner.write().await;
        let user = inner.users.get_mut(&user_id).ok_or(StoreError::UserNotFound)?;
        match &mut user.profile {
            Profile::Mentor(p) => {
                p.name = changes.name;
                p.bio = changes.bio;
                if let Some(image) = changes.image {
                    p.image = Some(image);
                }
                if let Some(skills) = changes.skills {
                    p.skills = skills;
                }
            }
            Profile::Mentee(p) => {
                p.name = changes.name;
                p.bio = changes.bio;
                if let Some(image) = changes.image {
                    p.image = Some(image);
                }
            }
        }
        Ok(user.clone())
    }

    async fn create_request(&self, mentor_id: i64, mentee_id: i64, message: &str) -> MatchRequest {
        let mut inner = self.inner.write().await;
        inner.last_request_id += 1;
        let request = MatchRequest {
            id: inner.last_request_id,
            mentor_id,
            mentee_id,
            message: message.to_string(),
            status: MatchStatus::Pending,
        };
        inner.requests.insert(request.id, request.clone());
        request
    }

    async fn request_by_id(&self, id: i64) -> Option<MatchRequest> {
        self.inner.read().await.requests.get(&id).cloned()
    }

    async fn set_request_status(
        &self,
        id: i64,
        status: MatchStatus,
        policy: TransitionPolicy,
    ) -> Result<MatchRequest, StoreError> {
        let mut inner = self.inner.write().await;
        let request = inner
            .requests
            .get_mut(&id)
            .ok_or(StoreError::RequestNotFound)?;
        if policy == TransitionPolicy::Strict && request.status.is_terminal() {
            return Err(StoreError::AlreadyResolved(request.status));
        }
        request.status = status;
        Ok(request.clone())
    }

    async fn requests_for_mentor(&self, mentor_id: i64) -> Vec<MatchRequest> {
        self.inner
            .read()
            .await
            .requests
            .values()
            .filter(|r| r.mentor_id == mentor_id)
            .cloned()
            .collect()
    }

    async fn requests_for_mentee(&self, mentee_id: i64) -> Vec<MatchRequest> {
        self.inner
            .read()
            .await
            .requests
            .values()
            .filter(|r| r.mentee_id == mentee_id)
            .cloned()
            .collect()
    }
}
