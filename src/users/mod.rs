use axum::Router;

use crate::state::AppState;

pub mod dto;
pub mod handlers;
pub mod repo;
pub mod service;

pub fn router(state: AppState) -> Router<AppState> {
    handlers::router(state)
}
