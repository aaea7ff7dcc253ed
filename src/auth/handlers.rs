use axum::{
    extract::{FromRef, State},
    http::StatusCode,
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;

use crate::auth::{
    dto::{LoginForm, SignupRequest, TokenResponse},
    extractors::CurrentUser,
    jwt::JwtKeys,
    services,
};
use crate::error::ApiError;
use crate::profiles::dto::UserView;
use crate::state::AppState;

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<StatusCode, ApiError> {
    services::register(
        state.store.as_ref(),
        &payload.email,
        &payload.password,
        &payload.name,
        payload.role,
    )
    .await?;
    Ok(StatusCode::CREATED)
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let token =
        services::authenticate(state.store.as_ref(), &keys, &form.username, &form.password)
            .await?;
    Ok(Json(TokenResponse { token }))
}

#[instrument(skip_all)]
pub async fn me(CurrentUser(user): CurrentUser) -> Json<UserView> {
    Json(UserView::from_user(&user))
}
