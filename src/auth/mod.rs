use axum::Router;

use crate::state::AppState;

mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub mod services;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
