use crate::state::AppState;
use axum::Router;

pub mod dto;
pub(crate) mod extractors;
pub mod handlers;
pub mod jwt;
pub(crate) mod password;
pub mod policy;
pub mod repo;

pub fn router() -> Router<AppState> {
    handlers::auth_routes()
}
