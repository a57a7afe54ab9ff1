use std::collections::HashSet;

use ammonia::Builder;
use argon2::password_hash::SaltString;
use argon2::{Argon2, PasswordHash, PasswordHasher, PasswordVerifier};
use chrono::{DateTime, Utc};
use html_escape::decode_html_entities;
use rand::rngs::OsRng;
use uuid::Uuid;

use crate::core::errors::{BlogError, BlogResult};

pub fn now() -> DateTime<Utc> {
    Utc::now()
}

pub fn new_id() -> String {
    Uuid::new_v4().to_string()
}

pub fn validate_uuid(id: &str) -> bool {
    Uuid::parse_str(id).is_ok()
}

pub fn hash_password(password: &str) -> BlogResult<String> {
    let salt = SaltString::generate(&mut OsRng);

    Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map(|hash| hash.to_string())
        .map_err(|e| BlogError::Storage(format!("Failed to hash password: {}", e)))
}

pub fn verify_password(password: &str, hash: &str) -> bool {
    let parsed_hash = match PasswordHash::new(hash) {
        Ok(h) => h,
        Err(_) => return false,
    };

    Argon2::default()
        .verify_password(password.as_bytes(), &parsed_hash)
        .is_ok()
}

/// Strips every tag, leaving plain text. The cleaner emits HTML, so its
/// entities are decoded back: `R&D` stays `R&D`.
pub fn sanitize_text(text: &str) -> String {
    let cleaned = Builder::default().tags(HashSet::new()).clean(text).to_string();
    decode_html_entities(&cleaned).into_owned()
}

/// Keeps safe rich-text markup and drops scripts, event handlers and the like.
pub fn sanitize_rich_text(content: &str) -> String {
    Builder::default()
        .link_rel(Some("noopener noreferrer"))
        .clean(content)
        .to_string()
}
