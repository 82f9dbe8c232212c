use axum::{
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde_json::json;
use tracing::error;

/// Terminal request errors, each mapped to one fixed outward message.
///
/// The auth variants carry no payload so no call site can attach the
/// distinguishing cause to the response.
#[derive(Debug, thiserror::Error)]
pub enum ApiError {
    /// Duplicate username on signup.
    #[error("Username already registered")]
    Conflict,
    /// Unknown username or wrong password; the caller cannot tell which.
    #[error("Incorrect username or password")]
    InvalidCredentials,
    /// Malformed, forged, or expired token, or a subject with no live user.
    #[error("Could not validate credentials")]
    InvalidToken,
    /// The chat-completion upstream refused or failed.
    #[error("Upstream request failed")]
    Upstream(#[source] anyhow::Error),
    /// Storage connectivity; details are logged, never returned.
    #[error("Service temporarily unavailable")]
    Database(#[from] sqlx::Error),
    #[error("Internal server error")]
    Internal(#[from] anyhow::Error),
}

impl ApiError {
    fn status(&self) -> StatusCode {
        match self {
            ApiError::Conflict => StatusCode::BAD_REQUEST,
            ApiError::InvalidCredentials | ApiError::InvalidToken => StatusCode::UNAUTHORIZED,
            ApiError::Upstream(_) => StatusCode::BAD_GATEWAY,
            ApiError::Database(_) => StatusCode::SERVICE_UNAVAILABLE,
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        match &self {
            ApiError::Upstream(e) => error!(error = %e, "upstream request failed"),
            ApiError::Database(e) => error!(error = %e, "database error"),
            ApiError::Internal(e) => error!(error = %e, "internal error"),
            _ => {}
        }

        let status = self.status();
        let body = Json(json!({ "detail": self.to_string() }));

        if matches!(self, ApiError::InvalidToken) {
            (status, [(header::WWW_AUTHENTICATE, "Bearer")], body).into_response()
        } else {
            (status, body).into_response()
        }
    }
}
