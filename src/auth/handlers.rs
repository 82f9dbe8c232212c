use axum::{
    extract::{FromRef, State},
    routing::{get, post},
    Form, Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, PublicUser, SignupRequest, TokenResponse},
        jwt::{AuthUser, JwtKeys},
        service,
    },
    error::ApiError,
    state::AppState,
};

pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
        .route("/me", get(me))
}

#[instrument(skip(state, payload))]
pub async fn signup(
    State(state): State<AppState>,
    Json(payload): Json<SignupRequest>,
) -> Result<Json<PublicUser>, ApiError> {
    let user = service::signup(
        &state.db,
        &payload.username,
        &payload.password,
        payload.full_name.as_deref(),
    )
    .await?;
    Ok(Json(user))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    Form(form): Form<LoginForm>,
) -> Result<Json<TokenResponse>, ApiError> {
    let keys = JwtKeys::from_ref(&state);
    let token = service::login(&state.db, &keys, &form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}

#[instrument(skip(state))]
pub async fn me(
    State(state): State<AppState>,
    AuthUser(subject): AuthUser,
) -> Result<Json<PublicUser>, ApiError> {
    let user = service::current_user(&state.db, &subject).await?;
    Ok(Json(user))
}
