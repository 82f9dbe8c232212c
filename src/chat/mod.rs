use crate::state::AppState;
use axum::Router;

mod client;
pub mod handlers;

pub use client::{ChatApi, ChatClient};

pub fn router() -> Router<AppState> {
    handlers::routes()
}
