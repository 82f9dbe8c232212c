use lazy_static::lazy_static;
use sqlx::PgPool;
use tracing::{info, warn};

use crate::auth::dto::PublicUser;
use crate::auth::jwt::JwtKeys;
use crate::auth::password::{hash_password, verify_password};
use crate::auth::repo;
use crate::error::ApiError;

lazy_static! {
    // Stand-in hash checked when a login names an unknown user, so that
    // path does the same verification work as a wrong password.
    static ref DUMMY_HASH: String = hash_password("speak-friend-and-enter").unwrap();
}

/// Register a new user. A duplicate username surfaces as `Conflict`,
/// decided by the store's unique constraint.
pub async fn signup(
    db: &PgPool,
    username: &str,
    password: &str,
    full_name: Option<&str>,
) -> Result<PublicUser, ApiError> {
    let hash = hash_password(password)?;
    let user = repo::insert(db, username, full_name, &hash).await?;
    info!(user_id = user.id, username = %user.username, "user registered");
    Ok(user.into())
}

/// Authenticate and issue a bearer token. Unknown username and wrong
/// password fail identically.
pub async fn login(
    db: &PgPool,
    keys: &JwtKeys,
    username: &str,
    password: &str,
) -> Result<String, ApiError> {
    match repo::find_by_username(db, username).await? {
        Some(user) if verify_password(password, &user.password_hash) => {
            let token = keys.sign(&user.username)?;
            info!(user_id = user.id, username = %user.username, "user logged in");
            Ok(token)
        }
        Some(_) => {
            warn!(username, "failed login attempt");
            Err(ApiError::InvalidCredentials)
        }
        None => {
            verify_password(password, &DUMMY_HASH);
            warn!(username, "failed login attempt");
            Err(ApiError::InvalidCredentials)
        }
    }
}

/// Resolve a verified token subject to its live user record. A subject
/// whose record is gone is treated like any other invalid token.
pub async fn current_user(db: &PgPool, subject: &str) -> Result<PublicUser, ApiError> {
    let user = repo::find_by_username(db, subject)
        .await?
        .ok_or(ApiError::InvalidToken)?;
    Ok(user.into())
}
