use chrono::Duration;
use jsonwebtoken::{decode, encode, Algorithm, DecodingKey, EncodingKey, Header, Validation};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::MAX_TOKEN_EXPIRATION_HOURS;
use crate::core::errors::{BlogError, BlogResult};
use crate::core::helpers::{now, verify_password};
use crate::models::models::{AuthResponse, Claims, LoginRequest, UserId, UserProfile};
use crate::store::UserStore;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    Unauthenticated,

    #[error("invalid credential: {0}")]
    InvalidCredential(String),
}

/// Issues and verifies signed bearer credentials.
///
/// Verification is stateless: the user id is read from the verified token
/// without touching any store.
pub struct IdentityProvider {
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
    validation: Validation,
    ttl: Duration,
}

impl IdentityProvider {
    /// `ttl_hours` is clamped to `1..=MAX_TOKEN_EXPIRATION_HOURS`.
    pub fn new(secret: &str, ttl_hours: i64) -> Self {
        let mut validation = Validation::new(Algorithm::HS256);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp", "sub"]);

        Self {
            encoding_key: EncodingKey::from_secret(secret.as_bytes()),
            decoding_key: DecodingKey::from_secret(secret.as_bytes()),
            validation,
            ttl: Duration::hours(ttl_hours.clamp(1, MAX_TOKEN_EXPIRATION_HOURS)),
        }
    }

    pub fn issue(&self, user_id: &str) -> BlogResult<String> {
        self.issue_with_ttl(user_id, self.ttl)
    }

    fn issue_with_ttl(&self, user_id: &str, ttl: Duration) -> BlogResult<String> {
        let issued_at = now();
        let claims = Claims {
            sub: user_id.to_string(),
            iat: issued_at.timestamp(),
            exp: (issued_at + ttl).timestamp(),
        };

        encode(&Header::new(Algorithm::HS256), &claims, &self.encoding_key)
            .map_err(|e| BlogError::Storage(format!("Failed to sign credential: {}", e)))
    }

    /// Resolves the value of an `Authorization` header to the user it names.
    pub fn resolve(&self, authorization: Option<&str>) -> Result<UserId, AuthError> {
        let header = authorization
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .ok_or(AuthError::Unauthenticated)?;

        let token = header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .ok_or_else(|| AuthError::InvalidCredential("expected a Bearer token".to_string()))?;

        let data = decode::<Claims>(token, &self.decoding_key, &self.validation).map_err(|e| {
            debug!(error = %e, "rejected credential");
            AuthError::InvalidCredential(e.to_string())
        })?;

        if data.claims.sub.is_empty() {
            return Err(AuthError::InvalidCredential("empty subject".to_string()));
        }
        Ok(data.claims.sub)
    }
}

/// Checks an email/password pair and hands out a fresh credential.
/// Unknown email and wrong password are indistinguishable to the caller.
pub fn login_user(
    users: &dyn UserStore,
    identity: &IdentityProvider,
    request: &LoginRequest,
) -> BlogResult<AuthResponse> {
    let invalid = || BlogError::Unauthenticated("invalid credentials".to_string());

    let user = users.find_by_email(&request.email)?.ok_or_else(invalid)?;
    if !verify_password(&request.password, &user.password_hash) {
        return Err(invalid());
    }

    let token = identity.issue(&user.id)?;
    info!(user_id = %user.id, "user logged in");

    Ok(AuthResponse {
        token,
        user: UserProfile::from(&user),
    })
}
