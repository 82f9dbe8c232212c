use serde::{Deserialize, Serialize};
use sqlx::{FromRow, PgPool};

use crate::error::ApiError;

/// User record in the database.
#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct User {
    pub id: i64,
    pub username: String,
    pub full_name: Option<String>,
    #[serde(skip_serializing)]
    pub password_hash: String, // Argon2 hash, not exposed in JSON
}

/// Find a user by exact username. No case folding.
pub async fn find_by_username(db: &PgPool, username: &str) -> Result<Option<User>, sqlx::Error> {
    sqlx::query_as::<_, User>(
        r#"
        SELECT id, username, full_name, password_hash
        FROM users
        WHERE username = $1
        "#,
    )
    .bind(username)
    .fetch_optional(db)
    .await
}

/// Insert a new user. The UNIQUE constraint on `username` is the conflict
/// check; there is no pre-check to race against, so of two concurrent
/// signups exactly one row wins and the other surfaces as `Conflict`.
pub async fn insert(
    db: &PgPool,
    username: &str,
    full_name: Option<&str>,
    password_hash: &str,
) -> Result<User, ApiError> {
    let inserted = sqlx::query_as::<_, User>(
        r#"
        INSERT INTO users (username, full_name, password_hash)
        VALUES ($1, $2, $3)
        RETURNING id, username, full_name, password_hash
        "#,
    )
    .bind(username)
    .bind(full_name)
    .bind(password_hash)
    .fetch_one(db)
    .await;

    match inserted {
        Ok(user) => Ok(user),
        Err(err) if is_unique_violation(&err) => Err(ApiError::Conflict),
        Err(err) => Err(ApiError::Database(err)),
    }
}

pub fn is_unique_violation(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db_err) => db_err.code().is_some_and(|code| code.as_ref() == "23505"),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::error::{DatabaseError, ErrorKind};
    use std::borrow::Cow;
    use std::error::Error as StdError;
    use std::fmt;

    #[test]
    fn user_serialization_omits_hash() {
        let user = User {
            id: 1,
            username: "alice".into(),
            full_name: None,
            password_hash: "$argon2id$v=19$secret".into(),
        };
        let json = serde_json::to_string(&user).unwrap();
        assert!(json.contains("alice"));
        assert!(!json.contains("password_hash"));
        assert!(!json.contains("argon2id"));
    }

    #[derive(Debug)]
    struct TestDbError {
        code: Option<&'static str>,
    }

    impl fmt::Display for TestDbError {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            write!(f, "test database error")
        }
    }

    impl StdError for TestDbError {}

    impl DatabaseError for TestDbError {
        fn message(&self) -> &str {
            "test database error"
        }

        fn code(&self) -> Option<Cow<'_, str>> {
            self.code.map(Cow::Borrowed)
        }

        fn as_error(&self) -> &(dyn StdError + Send + Sync + 'static) {
            self
        }

        fn as_error_mut(&mut self) -> &mut (dyn StdError + Send + Sync + 'static) {
            self
        }

        fn into_error(self: Box<Self>) -> Box<dyn StdError + Send + Sync + 'static> {
            self
        }

        fn kind(&self) -> ErrorKind {
            ErrorKind::UniqueViolation
        }
    }

    #[test]
    fn is_unique_violation_matches_sqlstate() {
        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("23505"),
        }));
        assert!(is_unique_violation(&err));

        let err = sqlx::Error::Database(Box::new(TestDbError {
            code: Some("99999"),
        }));
        assert!(!is_unique_violation(&err));

        let err = sqlx::Error::RowNotFound;
        assert!(!is_unique_violation(&err));
    }
}
