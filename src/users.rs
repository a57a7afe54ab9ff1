use std::sync::OnceLock;

use regex::Regex;
use tracing::{info, warn};

use crate::auth::IdentityProvider;
use crate::config::{DELETED_USER_NAME, MIN_PASSWORD_LENGTH};
use crate::core::errors::{BlogError, BlogResult};
use crate::core::helpers::{hash_password, new_id, now, sanitize_text};
use crate::models::models::{AuthResponse, AuthorView, RegisterRequest, User, UserProfile};
use crate::store::UserStore;

fn email_regex() -> &'static Regex {
    static REGEX: OnceLock<Regex> = OnceLock::new();
    REGEX.get_or_init(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("Regex should compile"))
}

pub fn register_user(
    users: &dyn UserStore,
    identity: &IdentityProvider,
    request: &RegisterRequest,
) -> BlogResult<AuthResponse> {
    let name = sanitize_text(request.name.trim());
    let email = request.email.trim();

    if name.is_empty() {
        return Err(BlogError::Validation("Name is required".to_string()));
    }
    if email.is_empty() {
        return Err(BlogError::Validation("Email is required".to_string()));
    }
    if !email_regex().is_match(email) {
        return Err(BlogError::Validation("Email is not valid".to_string()));
    }
    if request.password.len() < MIN_PASSWORD_LENGTH {
        return Err(BlogError::Validation(format!(
            "Password must be at least {} characters",
            MIN_PASSWORD_LENGTH
        )));
    }

    let user = users.insert(User {
        id: new_id(),
        name,
        email: email.to_string(),
        password_hash: hash_password(&request.password)?,
        is_admin: false,
        created_at: now(),
    })?;
    info!(user_id = %user.id, "user registered");

    Ok(AuthResponse {
        token: identity.issue(&user.id)?,
        user: UserProfile::from(&user),
    })
}

pub fn get_profile(users: &dyn UserStore, user_id: &str) -> BlogResult<UserProfile> {
    users
        .get(user_id)?
        .map(|u| UserProfile::from(&u))
        .ok_or_else(|| BlogError::NotFound("User not found".to_string()))
}

/// Joins a user id to its current display name. A missing user, or a store
/// failure while looking one up, yields a placeholder instead of an error.
pub fn resolve_author(users: &dyn UserStore, user_id: &str) -> AuthorView {
    match users.get(user_id) {
        Ok(Some(user)) => AuthorView {
            id: user.id,
            name: user.name,
        },
        Ok(None) => placeholder_author(user_id),
        Err(e) => {
            warn!(user_id, error = %e, "author lookup failed, using placeholder");
            placeholder_author(user_id)
        }
    }
}

fn placeholder_author(user_id: &str) -> AuthorView {
    AuthorView {
        id: user_id.to_string(),
        name: DELETED_USER_NAME.to_string(),
    }
}
