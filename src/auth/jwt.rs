use std::time::Duration;

use axum::{
    async_trait,
    extract::{FromRef, FromRequestParts},
    http::request::Parts,
};
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use serde::{Deserialize, Serialize};
use time::{Duration as TimeDuration, OffsetDateTime};
use tracing::{debug, warn};

use crate::{error::ApiError, state::AppState};

/// The one algorithm tokens are signed and checked with. The `alg` field a
/// token advertises for itself is never trusted.
const ALGORITHM: Algorithm = Algorithm::HS256;

/// JWT payload: subject (username) and expiry, nothing else.
#[derive(Debug, Serialize, Deserialize)]
pub struct Claims {
    pub sub: String,
    pub exp: usize,
}

#[derive(Clone)]
pub struct JwtKeys {
    pub encoding: EncodingKey,
    pub decoding: DecodingKey,
    pub ttl: Duration,
}

impl FromRef<AppState> for JwtKeys {
    fn from_ref(state: &AppState) -> Self {
        let cfg = &state.config.jwt;
        Self::new(
            &cfg.secret,
            Duration::from_secs(cfg.ttl_minutes.max(0) as u64 * 60),
        )
    }
}

impl JwtKeys {
    pub fn new(secret: &str, ttl: Duration) -> Self {
        Self {
            encoding: EncodingKey::from_secret(secret.as_bytes()),
            decoding: DecodingKey::from_secret(secret.as_bytes()),
            ttl,
        }
    }

    /// Sign a token for `subject` expiring after the configured ttl.
    pub fn sign(&self, subject: &str) -> anyhow::Result<String> {
        let exp = OffsetDateTime::now_utc() + TimeDuration::seconds(self.ttl.as_secs() as i64);
        let claims = Claims {
            sub: subject.to_string(),
            exp: exp.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &self.encoding)?;
        debug!(subject, "jwt signed");
        Ok(token)
    }

    /// Check signature, then expiry (strictly `now < exp`, no leeway).
    /// Malformed encoding, bad signature, expired, and missing subject all
    /// come back as the same opaque error.
    pub fn verify(&self, token: &str) -> anyhow::Result<Claims> {
        let mut validation = Validation::new(ALGORITHM);
        validation.leeway = 0;
        let data = decode::<Claims>(token, &self.decoding, &validation)?;
        debug!(subject = %data.claims.sub, "jwt verified");
        Ok(data.claims)
    }
}

/// Extracts the bearer token from `Authorization` and yields the verified
/// subject. Every failure rejects the same way.
pub struct AuthUser(pub String);

#[async_trait]
impl<S> FromRequestParts<S> for AuthUser
where
    S: Send + Sync,
    JwtKeys: FromRef<S>,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let keys = JwtKeys::from_ref(state);
        let auth_header = parts
            .headers
            .get(axum::http::header::AUTHORIZATION)
            .and_then(|v| v.to_str().ok())
            .ok_or(ApiError::InvalidToken)?;

        let token = auth_header
            .strip_prefix("Bearer ")
            .ok_or(ApiError::InvalidToken)?;

        match keys.verify(token) {
            Ok(claims) => Ok(AuthUser(claims.sub)),
            Err(_) => {
                warn!("invalid or expired token");
                Err(ApiError::InvalidToken)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn make_keys() -> JwtKeys {
        JwtKeys::new("dev-secret", Duration::from_secs(30 * 60))
    }

    #[test]
    fn sign_and_verify_roundtrip() {
        let keys = make_keys();
        let token = keys.sign("alice").expect("sign");
        let claims = keys.verify(&token).expect("verify");
        assert_eq!(claims.sub, "alice");
        assert!(claims.exp > OffsetDateTime::now_utc().unix_timestamp() as usize);
    }

    #[test]
    fn verify_rejects_wrong_secret() {
        let token = make_keys().sign("alice").expect("sign");
        let other = JwtKeys::new("another-secret", Duration::from_secs(30 * 60));
        assert!(other.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_tampered_token() {
        let keys = make_keys();
        let mut token = keys.sign("alice").expect("sign");
        token.push('x');
        assert!(keys.verify(&token).is_err());
    }

    #[test]
    fn verify_rejects_garbage() {
        assert!(make_keys().verify("not-a-jwt").is_err());
        assert!(make_keys().verify("").is_err());
    }

    #[test]
    fn verify_rejects_expired_token() {
        let keys = make_keys();
        let past = OffsetDateTime::now_utc() - TimeDuration::seconds(61);
        let claims = Claims {
            sub: "alice".into(),
            exp: past.unix_timestamp() as usize,
        };
        let token = encode(&Header::new(ALGORITHM), &claims, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }

    #[tokio::test]
    async fn from_ref_reads_configured_secret_and_ttl() {
        let state = crate::state::AppState::fake();
        let keys = JwtKeys::from_ref(&state);
        assert_eq!(keys.ttl, Duration::from_secs(5 * 60));
        let token = keys.sign("alice").expect("sign");
        assert_eq!(keys.verify(&token).expect("verify").sub, "alice");
    }

    #[test]
    fn verify_rejects_missing_subject() {
        #[derive(Serialize)]
        struct NoSubject {
            exp: usize,
        }

        let keys = make_keys();
        let exp = (OffsetDateTime::now_utc() + TimeDuration::minutes(5)).unix_timestamp() as usize;
        let token =
            encode(&Header::new(ALGORITHM), &NoSubject { exp }, &keys.encoding).expect("encode");
        assert!(keys.verify(&token).is_err());
    }
}
