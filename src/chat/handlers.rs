use axum::{extract::State, routing::post, Json, Router};
use serde::Deserialize;
use serde_json::Value;
use tracing::instrument;

use crate::{error::ApiError, state::AppState};

const DEFAULT_SYSTEM_PROMPT: &str = "Be precise and concise.";

/// Passthrough request: the question plus optional grounding context.
#[derive(Debug, Deserialize)]
pub struct AskRequest {
    pub prompt: String,
    #[serde(default)]
    pub context: Option<String>,
}

pub fn routes() -> Router<AppState> {
    Router::new().route("/ask", post(ask))
}

/// Forwards the request to the configured chat-completion API and returns
/// its JSON response verbatim. No auth, no business logic.
#[instrument(skip(state, payload))]
pub async fn ask(
    State(state): State<AppState>,
    Json(payload): Json<AskRequest>,
) -> Result<Json<Value>, ApiError> {
    let system = payload.context.as_deref().unwrap_or(DEFAULT_SYSTEM_PROMPT);
    let response = state
        .chat
        .complete(system, &payload.prompt)
        .await
        .map_err(ApiError::Upstream)?;
    Ok(Json(response))
}
