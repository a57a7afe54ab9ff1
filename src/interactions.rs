//! Likes and comments. Both are open to any authenticated user and both are
//! applied as a single atomic update of the post aggregate.

use tracing::info;

use crate::core::errors::{BlogError, BlogResult};
use crate::core::helpers::{new_id, now};
use crate::models::models::{Comment, Post};
use crate::store::{PostKey, PostStore};

#[derive(Debug, Clone)]
pub struct LikeToggled {
    /// State after the toggle.
    pub liked: bool,
    pub post: Post,
}

#[derive(Debug, Clone)]
pub struct CommentAdded {
    pub comment: Comment,
    pub post: Post,
}

fn require_user(user_id: &str) -> BlogResult<()> {
    if user_id.trim().is_empty() {
        return Err(BlogError::Unauthenticated("no user resolved".to_string()));
    }
    Ok(())
}

/// Flips `user_id`'s membership in the post's like-set. Applying it twice
/// restores the original set.
pub fn toggle_like(posts: &dyn PostStore, post_id: &str, user_id: &str) -> BlogResult<LikeToggled> {
    require_user(user_id)?;

    let mut liked = false;
    let post = posts.modify(PostKey::by_id(post_id), &mut |post: &mut Post| {
        liked = if post.likes.remove(user_id) {
            false
        } else {
            post.likes.insert(user_id.to_string())
        };
        Ok(())
    })?;

    info!(post_id, user_id, liked, likes = post.likes.len(), "like toggled");
    Ok(LikeToggled { liked, post })
}

/// Appends a comment to the end of the post's thread. Empty text is accepted here.
pub fn add_comment(
    posts: &dyn PostStore,
    post_id: &str,
    user_id: &str,
    text: &str,
) -> BlogResult<CommentAdded> {
    require_user(user_id)?;

    let comment = Comment {
        id: new_id(),
        author_id: user_id.to_string(),
        content: text.to_string(),
        created_at: now(),
    };

    let post = posts.modify(PostKey::by_id(post_id), &mut |post: &mut Post| {
        post.comments.push(comment.clone());
        Ok(())
    })?;

    info!(post_id, user_id, comment_id = %comment.id, "comment added");
    Ok(CommentAdded { comment, post })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::MemoryPostStore;
    use chrono::Utc;
    use std::collections::BTreeSet;

    fn store_with_post() -> MemoryPostStore {
        let store = MemoryPostStore::new();
        store
            .insert(Post {
                id: "p1".to_string(),
                title: "Hello".to_string(),
                content: "World".to_string(),
                author_id: "author".to_string(),
                category: "General".to_string(),
                tags: vec![],
                likes: BTreeSet::from(["existing".to_string()]),
                comments: vec![],
                created_at: Utc::now(),
                updated_at: None,
            })
            .unwrap();
        store
    }

    #[test]
    fn toggling_twice_restores_like_set() {
        let store = store_with_post();
        let before = store.get("p1").unwrap().unwrap().likes;

        let first = toggle_like(&store, "p1", "u1").unwrap();
        assert!(first.liked);
        assert!(first.post.likes.contains("u1"));

        let second = toggle_like(&store, "p1", "u1").unwrap();
        assert!(!second.liked);
        assert_eq!(store.get("p1").unwrap().unwrap().likes, before);
    }

    #[test]
    fn like_is_membership_only() {
        let store = store_with_post();
        toggle_like(&store, "p1", "u1").unwrap();
        toggle_like(&store, "p1", "u2").unwrap();
        toggle_like(&store, "p1", "existing").unwrap();

        let likes = store.get("p1").unwrap().unwrap().likes;
        assert_eq!(likes, BTreeSet::from(["u1".to_string(), "u2".to_string()]));
    }

    #[test]
    fn any_user_may_like_and_comment() {
        let store = store_with_post();
        assert!(toggle_like(&store, "p1", "stranger").is_ok());
        assert!(add_comment(&store, "p1", "stranger", "nice").is_ok());
    }

    #[test]
    fn interactions_on_missing_post_are_not_found() {
        let store = store_with_post();
        assert!(matches!(toggle_like(&store, "nope", "u1"), Err(BlogError::NotFound(_))));
        assert!(matches!(add_comment(&store, "nope", "u1", "x"), Err(BlogError::NotFound(_))));
    }

    #[test]
    fn unresolved_user_is_rejected_before_storage() {
        let store = store_with_post();
        assert!(matches!(toggle_like(&store, "p1", ""), Err(BlogError::Unauthenticated(_))));
        assert!(matches!(add_comment(&store, "nope", "", "x"), Err(BlogError::Unauthenticated(_))));
        assert!(store.get("p1").unwrap().unwrap().comments.is_empty());
    }

    #[test]
    fn comments_keep_call_order() {
        let store = store_with_post();
        let texts = ["first", "", "third", "fourth"];
        let mut ids = Vec::new();
        for (i, text) in texts.iter().enumerate() {
            let added = add_comment(&store, "p1", &format!("u{}", i), text).unwrap();
            assert_eq!(added.post.comments.last(), Some(&added.comment));
            ids.push(added.comment.id);
        }

        let comments = store.get("p1").unwrap().unwrap().comments;
        let stored: Vec<&str> = comments.iter().map(|c| c.content.as_str()).collect();
        assert_eq!(stored, texts);
        let stored_ids: Vec<String> = comments.into_iter().map(|c| c.id).collect();
        assert_eq!(stored_ids, ids);
    }

    #[test]
    fn concurrent_likes_from_different_users_all_land() {
        let store = store_with_post();
        let users: Vec<String> = (0..32).map(|i| format!("user-{}", i)).collect();

        std::thread::scope(|s| {
            for user in &users {
                let store = &store;
                s.spawn(move || toggle_like(store, "p1", user).unwrap());
            }
        });

        let likes = store.get("p1").unwrap().unwrap().likes;
        assert_eq!(likes.len(), users.len() + 1);
        assert!(users.iter().all(|u| likes.contains(u)));
    }

    #[test]
    fn concurrent_comments_are_all_appended() {
        let store = store_with_post();

        std::thread::scope(|s| {
            for i in 0..16 {
                let store = &store;
                s.spawn(move || add_comment(store, "p1", "u1", &format!("c{}", i)).unwrap());
            }
        });

        assert_eq!(store.get("p1").unwrap().unwrap().comments.len(), 16);
    }
}
