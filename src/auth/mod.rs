use axum::Router;

use crate::state::AppState;

pub mod claims;
pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod service;
pub mod session;

pub fn router() -> Router<AppState> {
    handlers::router()
}
