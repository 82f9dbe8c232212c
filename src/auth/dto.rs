use serde::{Deserialize, Serialize};

use crate::auth::repo::User;

/// Request body for user registration.
#[derive(Debug, Deserialize)]
pub struct SignupRequest {
    pub username: String,
    pub password: String,
    pub full_name: Option<String>,
}

/// Form body for login (form-encoded, OAuth2 password style).
#[derive(Debug, Deserialize)]
pub struct LoginForm {
    pub username: String,
    pub password: String,
}

/// Response returned after a successful login.
#[derive(Debug, Serialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub token_type: &'static str,
}

impl TokenResponse {
    pub fn bearer(access_token: String) -> Self {
        Self {
            access_token,
            token_type: "bearer",
        }
    }
}

/// Public part of the user returned to the client. Never carries the hash
/// or the internal id.
#[derive(Debug, Serialize)]
pub struct PublicUser {
    pub username: String,
    pub full_name: Option<String>,
}

impl From<User> for PublicUser {
    fn from(user: User) -> Self {
        Self {
            username: user.username,
            full_name: user.full_name,
        }
    }
}
