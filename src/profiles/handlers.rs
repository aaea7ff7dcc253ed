use axum::{
    extract::{Path, Query, State},
    http::header,
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::{AuthMentee, CurrentUser};
use crate::error::ApiError;
use crate::images::validate;
use crate::profiles::{
    dto::{MentorQuery, ProfileUpdate, UserView},
    services,
};
use crate::state::AppState;
use crate::store::Role;

pub fn profile_routes() -> Router<AppState> {
    Router::new()
        .route("/profile", put(update_profile))
        .route("/images/:role/:id", get(profile_image))
        .route("/mentors", get(list_mentors))
}

#[instrument(skip_all)]
pub async fn update_profile(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    Json(update): Json<ProfileUpdate>,
) -> Result<Json<UserView>, ApiError> {
    let view = services::update_profile(state.store.as_ref(), &user, update).await?;
    Ok(Json(view))
}

#[instrument(skip_all, fields(%role, id = id))]
pub async fn profile_image(
    State(state): State<AppState>,
    CurrentUser(_user): CurrentUser,
    Path((role, id)): Path<(Role, i64)>,
) -> Result<impl IntoResponse, ApiError> {
    let bytes = services::profile_image(state.store.as_ref(), role, id).await?;
    let content_type = validate::content_type(&bytes);
    Ok(([(header::CONTENT_TYPE, content_type)], bytes))
}

#[instrument(skip_all)]
pub async fn list_mentors(
    State(state): State<AppState>,
    AuthMentee(_mentee): AuthMentee,
    Query(query): Query<MentorQuery>,
) -> Json<Vec<UserView>> {
    Json(
        services::list_mentors(
            state.store.as_ref(),
            query.skill.as_deref(),
            query.order_by.as_deref(),
        )
        .await,
    )
}
