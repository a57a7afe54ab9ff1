use actix_web::{http::StatusCode, HttpResponse, ResponseError};
use thiserror::Error;

use crate::auth::AuthError;

/// Every failure a blog operation can report. Callers get exactly one of these kinds.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum BlogError {
    #[error("Unauthenticated: {0}")]
    Unauthenticated(String),

    /// Missing resource, or a resource the caller does not own for an
    /// ownership-gated operation. The two cases are deliberately identical.
    #[error("Not Found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    #[error("Storage failure: {0}")]
    Storage(String),
}

pub type BlogResult<T> = Result<T, BlogError>;

impl BlogError {
    pub fn post_not_found() -> Self {
        BlogError::NotFound("Post not found".to_string())
    }

    fn message(&self) -> &str {
        match self {
            BlogError::Unauthenticated(msg)
            | BlogError::NotFound(msg)
            | BlogError::Validation(msg)
            | BlogError::Storage(msg) => msg,
        }
    }
}

impl From<AuthError> for BlogError {
    fn from(err: AuthError) -> Self {
        BlogError::Unauthenticated(err.to_string())
    }
}

impl ResponseError for BlogError {
    fn status_code(&self) -> StatusCode {
        match self {
            BlogError::Unauthenticated(_) => StatusCode::UNAUTHORIZED,
            BlogError::NotFound(_) => StatusCode::NOT_FOUND,
            BlogError::Validation(_) => StatusCode::BAD_REQUEST,
            BlogError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn error_response(&self) -> HttpResponse {
        // Storage details stay in the logs.
        let message = match self {
            BlogError::Storage(_) => "Internal server error",
            other => other.message(),
        };
        HttpResponse::build(self.status_code()).json(serde_json::json!({ "error": message }))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn status_codes_follow_error_kind() {
        assert_eq!(
            BlogError::Unauthenticated("x".into()).status_code(),
            StatusCode::UNAUTHORIZED
        );
        assert_eq!(BlogError::post_not_found().status_code(), StatusCode::NOT_FOUND);
        assert_eq!(
            BlogError::Validation("x".into()).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            BlogError::Storage("x".into()).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }

    #[test]
    fn auth_errors_become_unauthenticated() {
        let err: BlogError = AuthError::Unauthenticated.into();
        assert!(matches!(err, BlogError::Unauthenticated(_)));

        let err: BlogError = AuthError::InvalidCredential("bad signature".into()).into();
        assert!(matches!(err, BlogError::Unauthenticated(msg) if msg.contains("bad signature")));
    }
}
