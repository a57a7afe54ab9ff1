use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type UserId = String;
pub type PostId = String;

#[derive(Serialize, Deserialize, Clone, Debug)]
pub struct User {
    pub id: UserId,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

/// A post aggregate: the post itself plus its like-set and comment thread.
/// Likes and comments have no life of their own outside the post.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Post {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author_id: UserId,
    pub category: String,
    pub tags: Vec<String>,
    pub likes: BTreeSet<UserId>,
    pub comments: Vec<Comment>,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct Comment {
    pub id: String,
    pub author_id: UserId,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Input for creating a post. Any author supplied by the client is ignored.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct PostDraft {
    pub title: Option<String>,
    pub content: Option<String>,
    #[serde(default)]
    pub category: String,
    #[serde(default)]
    pub tags: Vec<String>,
}

/// Partial update: only fields that are present are applied.
#[derive(Deserialize, Clone, Debug, Default)]
pub struct PostPatch {
    pub title: Option<String>,
    pub content: Option<String>,
    pub category: Option<String>,
    pub tags: Option<Vec<String>>,
}

impl PostPatch {
    pub fn is_empty(&self) -> bool {
        self.title.is_none() && self.content.is_none() && self.category.is_none() && self.tags.is_none()
    }
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct AuthorView {
    pub id: UserId,
    pub name: String,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct CommentView {
    pub id: String,
    pub author: AuthorView,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

/// Read model handed to clients. Author names are joined at read time.
#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct PostView {
    pub id: PostId,
    pub title: String,
    pub content: String,
    pub author: AuthorView,
    pub category: String,
    pub tags: Vec<String>,
    pub likes: Vec<UserId>,
    pub like_count: usize,
    pub comments: Vec<CommentView>,
    pub comment_count: usize,
    pub created_at: DateTime<Utc>,
    pub updated_at: Option<DateTime<Utc>>,
}

#[derive(Serialize, Deserialize, Clone, Debug, PartialEq)]
pub struct UserProfile {
    pub id: UserId,
    pub name: String,
    pub email: String,
    pub is_admin: bool,
    pub created_at: DateTime<Utc>,
}

impl From<&User> for UserProfile {
    fn from(user: &User) -> Self {
        Self {
            id: user.id.clone(),
            name: user.name.clone(),
            email: user.email.clone(),
            is_admin: user.is_admin,
            created_at: user.created_at,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct Claims {
    pub sub: UserId,
    pub iat: i64,
    pub exp: i64,
}

#[derive(Deserialize, Debug)]
pub struct RegisterRequest {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

#[derive(Deserialize, Debug)]
pub struct CommentRequest {
    #[serde(default)]
    pub content: String,
}

#[derive(Serialize, Debug)]
pub struct AuthResponse {
    pub token: String,
    pub user: UserProfile,
}
