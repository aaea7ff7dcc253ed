use tracing::info;

use crate::error::ApiError;
use crate::matching::dto::{CreateMatchRequest, OutgoingRequest};
use crate::store::{MatchRequest, MatchStatus, Role, Store, TransitionPolicy, User};

/// Creates a pending request from `mentee` to the mentor named in the body.
/// The body's menteeId must be the caller; the target must exist and hold
/// the mentor role.
pub async fn create_request(
    store: &dyn Store,
    mentee: &User,
    body: CreateMatchRequest,
) -> Result<MatchRequest, ApiError> {
    if body.mentee_id != mentee.id {
        return Err(ApiError::Forbidden(
            "menteeId must be the authenticated mentee".into(),
        ));
    }
    let mentor = store
        .user_by_id(body.mentor_id)
        .await
        .filter(|u| u.role() == Role::Mentor)
        .ok_or_else(|| ApiError::NotFound("mentor not found".into()))?;

    let request = store.create_request(mentor.id, mentee.id, &body.message).await;
    info!(
        request_id = request.id,
        mentor_id = mentor.id,
        mentee_id = mentee.id,
        "match request created"
    );
    Ok(request)
}

pub async fn accept(
    store: &dyn Store,
    mentor: &User,
    id: i64,
    policy: TransitionPolicy,
) -> Result<MatchRequest, ApiError> {
    owned_by_mentor(store, mentor, id, "accept").await?;
    transition(store, id, MatchStatus::Accepted, policy).await
}

pub async fn reject(
    store: &dyn Store,
    mentor: &User,
    id: i64,
    policy: TransitionPolicy,
) -> Result<MatchRequest, ApiError> {
    owned_by_mentor(store, mentor, id, "reject").await?;
    transition(store, id, MatchStatus::Rejected, policy).await
}

pub async fn cancel(
    store: &dyn Store,
    mentee: &User,
    id: i64,
    policy: TransitionPolicy,
) -> Result<MatchRequest, ApiError> {
    let request = store
        .request_by_id(id)
        .await
        .ok_or_else(|| ApiError::NotFound("match request not found".into()))?;
    if request.mentee_id != mentee.id {
        return Err(ApiError::Forbidden(
            "only the requesting mentee can cancel".into(),
        ));
    }
    transition(store, id, MatchStatus::Cancelled, policy).await
}

pub async fn incoming(store: &dyn Store, mentor_id: i64) -> Vec<MatchRequest> {
    store.requests_for_mentor(mentor_id).await
}

pub async fn outgoing(store: &dyn Store, mentee_id: i64) -> Vec<OutgoingRequest> {
    store
        .requests_for_mentee(mentee_id)
        .await
        .into_iter()
        .map(Into::into)
        .collect()
}

async fn owned_by_mentor(
    store: &dyn Store,
    mentor: &User,
    id: i64,
    action: &str,
) -> Result<(), ApiError> {
    let request = store
        .request_by_id(id)
        .await
        .ok_or_else(|| ApiError::NotFound("match request not found".into()))?;
    if request.mentor_id != mentor.id {
        return Err(ApiError::Forbidden(format!(
            "only the requested mentor can {action}"
        )));
    }
    Ok(())
}

// A request's parties are immutable, so the ownership check can precede the
// write; the policy check happens atomically inside set_request_status.
async fn transition(
    store: &dyn Store,
    id: i64,
    status: MatchStatus,
    policy: TransitionPolicy,
) -> Result<MatchRequest, ApiError> {
    let request = store.set_request_status(id, status, policy).await?;
    info!(request_id = id, status = %status, "match request transitioned");
    Ok(request)
}
