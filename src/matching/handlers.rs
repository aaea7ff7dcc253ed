use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{delete, get, post, put},
    Json, Router,
};
use tracing::instrument;

use crate::auth::extractors::{AuthMentee, AuthMentor};
use crate::error::ApiError;
use crate::matching::{
    dto::{CreateMatchRequest, OutgoingRequest},
    services,
};
use crate::state::AppState;
use crate::store::MatchRequest;

pub fn match_routes() -> Router<AppState> {
    Router::new()
        .route("/match-requests", post(create))
        .route("/match-requests/incoming", get(incoming))
        .route("/match-requests/outgoing", get(outgoing))
        .route("/match-requests/:id/accept", put(accept))
        .route("/match-requests/:id/reject", put(reject))
        .route("/match-requests/:id", delete(cancel))
}

#[instrument(skip_all)]
pub async fn create(
    State(state): State<AppState>,
    AuthMentee(mentee): AuthMentee,
    Json(body): Json<CreateMatchRequest>,
) -> Result<(StatusCode, Json<MatchRequest>), ApiError> {
    let request = services::create_request(state.store.as_ref(), &mentee, body).await?;
    Ok((StatusCode::CREATED, Json(request)))
}

#[instrument(skip_all)]
pub async fn incoming(
    State(state): State<AppState>,
    AuthMentor(mentor): AuthMentor,
) -> Json<Vec<MatchRequest>> {
    Json(services::incoming(state.store.as_ref(), mentor.id).await)
}

#[instrument(skip_all)]
pub async fn outgoing(
    State(state): State<AppState>,
    AuthMentee(mentee): AuthMentee,
) -> Json<Vec<OutgoingRequest>> {
    Json(services::outgoing(state.store.as_ref(), mentee.id).await)
}

#[instrument(skip_all, fields(id = id))]
pub async fn accept(
    State(state): State<AppState>,
    AuthMentor(mentor): AuthMentor,
    Path(id): Path<i64>,
) -> Result<Json<MatchRequest>, ApiError> {
    let policy = state.config.transitions;
    let request = services::accept(state.store.as_ref(), &mentor, id, policy).await?;
    Ok(Json(request))
}

#[instrument(skip_all, fields(id = id))]
pub async fn reject(
    State(state): State<AppState>,
    AuthMentor(mentor): AuthMentor,
    Path(id): Path<i64>,
) -> Result<Json<MatchRequest>, ApiError> {
    let policy = state.config.transitions;
    let request = services::reject(state.store.as_ref(), &mentor, id, policy).await?;
    Ok(Json(request))
}

#[instrument(skip_all, fields(id = id))]
pub async fn cancel(
    State(state): State<AppState>,
    AuthMentee(mentee): AuthMentee,
    Path(id): Path<i64>,
) -> Result<Json<MatchRequest>, ApiError> {
    let policy = state.config.transitions;
    let request = services::cancel(state.store.as_ref(), &mentee, id, policy).await?;
    Ok(Json(request))
}
