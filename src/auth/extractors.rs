use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};

use crate::auth::{jwt::JwtKeys, services};
use crate::error::ApiError;
use crate::state::AppState;
use crate::store::{Role, User};

/// Any authenticated caller, resolved from the bearer token.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or_else(|| ApiError::Unauthenticated("missing Authorization header".into()))?;

        let token = header
            .strip_prefix("Bearer ")
            .or_else(|| header.strip_prefix("bearer "))
            .ok_or_else(|| ApiError::Unauthenticated("invalid Authorization scheme".into()))?;

        let keys = JwtKeys::from_ref(state);
        let user = services::resolve(state.store.as_ref(), &keys, token).await?;
        Ok(CurrentUser(user))
    }
}

/// Authenticated caller with the mentor role. Identity failures stay 401;
/// a valid identity with the wrong role is 403.
pub struct AuthMentor(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthMentor {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role() != Role::Mentor {
            return Err(ApiError::Forbidden(
                "this operation is restricted to mentors".into(),
            ));
        }
        Ok(AuthMentor(user))
    }
}

/// Authenticated caller with the mentee role.
pub struct AuthMentee(pub User);

#[async_trait]
impl FromRequestParts<AppState> for AuthMentee {
    type Rejection = ApiError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let CurrentUser(user) = CurrentUser::from_request_parts(parts, state).await?;
        if user.role() != Role::Mentee {
            return Err(ApiError::Forbidden(
                "this operation is restricted to mentees".into(),
            ));
        }
        Ok(AuthMentee(user))
    }
}
