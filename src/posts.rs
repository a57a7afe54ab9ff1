//! Post lifecycle: create, update and delete, scoped to the post's author.

use tracing::info;

use crate::config::{MAX_POST_LENGTH, MAX_TAGS, MAX_TITLE_LENGTH};
use crate::core::errors::{BlogError, BlogResult};
use crate::core::helpers::{new_id, now};
use crate::models::models::{Post, PostDraft, PostPatch};
use crate::store::{PostKey, PostStore};

fn validate_title(title: &str) -> BlogResult<String> {
    let title = title.trim();
    if title.is_empty() {
        return Err(BlogError::Validation("Title is required".to_string()));
    }
    if title.chars().count() > MAX_TITLE_LENGTH {
        return Err(BlogError::Validation(format!(
            "Title must be at most {} characters",
            MAX_TITLE_LENGTH
        )));
    }
    Ok(title.to_string())
}

fn validate_content(content: &str) -> BlogResult<String> {
    if content.trim().is_empty() {
        return Err(BlogError::Validation("Content is required".to_string()));
    }
    if content.chars().count() > MAX_POST_LENGTH {
        return Err(BlogError::Validation("Content too long".to_string()));
    }
    Ok(content.to_string())
}

/// Trims tags and drops blank ones. Order and duplicates are kept.
fn normalize_tags(tags: &[String]) -> BlogResult<Vec<String>> {
    let tags: Vec<String> = tags
        .iter()
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .collect();
    if tags.len() > MAX_TAGS {
        return Err(BlogError::Validation(format!("At most {} tags allowed", MAX_TAGS)));
    }
    Ok(tags)
}

/// Stores a new post written by `user_id`. The author always comes from the
/// resolved credential, never from the draft.
pub fn create_post(posts: &dyn PostStore, user_id: &str, draft: &PostDraft) -> BlogResult<Post> {
    if user_id.trim().is_empty() {
        return Err(BlogError::Unauthenticated("no user resolved".to_string()));
    }

    let post = Post {
        id: new_id(),
        title: validate_title(draft.title.as_deref().unwrap_or_default())?,
        content: validate_content(draft.content.as_deref().unwrap_or_default())?,
        author_id: user_id.to_string(),
        category: draft.category.trim().to_string(),
        tags: normalize_tags(&draft.tags)?,
        likes: Default::default(),
        comments: Vec::new(),
        created_at: now(),
        updated_at: None,
    };

    let post = posts.insert(post)?;
    info!(post_id = %post.id, user_id, "post created");
    Ok(post)
}

/// Applies the fields present in `patch`. A post that is missing and a post
/// owned by someone else are both reported as `NotFound`.
pub fn update_post(
    posts: &dyn PostStore,
    user_id: &str,
    post_id: &str,
    patch: &PostPatch,
) -> BlogResult<Post> {
    let title = patch.title.as_deref().map(validate_title).transpose()?;
    let content = patch.content.as_deref().map(validate_content).transpose()?;
    let tags = patch.tags.as_deref().map(normalize_tags).transpose()?;
    let category = patch.category.as_deref().map(|c| c.trim().to_string());
    let touched = !patch.is_empty();

    let post = posts.modify(PostKey::owned_by(post_id, user_id), &mut |post: &mut Post| {
        if let Some(title) = &title {
            post.title = title.clone();
        }
        if let Some(content) = &content {
            post.content = content.clone();
        }
        if let Some(category) = &category {
            post.category = category.clone();
        }
        if let Some(tags) = &tags {
            post.tags = tags.clone();
        }
        if touched {
            post.updated_at = Some(now());
        }
        Ok(())
    })?;

    info!(post_id, user_id, "post updated");
    Ok(post)
}

/// Removes the post together with its comments and likes.
pub fn delete_post(posts: &dyn PostStore, user_id: &str, post_id: &str) -> BlogResult<()> {
    let removed = posts.remove(PostKey::owned_by(post_id, user_id))?;
    info!(
        post_id,
        user_id,
        comments = removed.comments.len(),
        likes = removed.likes.len(),
        "post deleted"
    );
    Ok(())
}
