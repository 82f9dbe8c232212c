use crate::state::AppState;
use axum::Router;

pub mod dto;
pub mod handlers;
pub mod jwt;
pub mod password;
pub mod repo;
pub mod service;

pub fn router() -> Router<AppState> {
    handlers::routes()
}
