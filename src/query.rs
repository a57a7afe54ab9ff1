//! Read side: search, category filtering and the client read model.

use std::collections::HashMap;

use tracing::debug;

use crate::config::{ALL_CATEGORIES, POSTS_PER_PAGE};
use crate::core::errors::{BlogError, BlogResult};
use crate::core::query_params::{get_page, get_string};
use crate::models::models::{AuthorView, CommentView, Post, PostView, UserId};
use crate::store::{PostStore, UserStore};
use crate::users::resolve_author;

#[derive(Debug, Clone, Default, PartialEq)]
pub struct ListFilter {
    pub search: Option<String>,
    pub category: Option<String>,
    pub author: Option<UserId>,
    /// 1-based; `None` returns every match.
    pub page: Option<usize>,
}

impl ListFilter {
    pub fn from_params(params: &HashMap<String, String>) -> Self {
        Self {
            search: get_string(params, "search"),
            category: get_string(params, "category"),
            author: get_string(params, "author"),
            page: get_page(params, "page"),
        }
    }

    pub fn search(term: &str) -> Self {
        Self {
            search: Some(term.to_string()),
            ..Self::default()
        }
    }

    pub fn category(category: &str) -> Self {
        Self {
            category: Some(category.to_string()),
            ..Self::default()
        }
    }

    fn search_term(&self) -> Option<String> {
        self.search
            .as_deref()
            .map(str::trim)
            .filter(|t| !t.is_empty())
            .map(str::to_lowercase)
    }

    fn category_label(&self) -> Option<&str> {
        self.category
            .as_deref()
            .filter(|c| !c.trim().is_empty() && *c != ALL_CATEGORIES)
    }

    /// Builds the AND-composed predicate over all present filters.
    fn predicate(&self) -> impl Fn(&Post) -> bool + '_ {
        let term = self.search_term();
        let category = self.category_label();
        let author = self.author.as_deref();

        move |post: &Post| {
            term.as_deref().map_or(true, |t| matches_search(post, t))
                && category.map_or(true, |c| post.category == c)
                && author.map_or(true, |a| post.author_id == a)
        }
    }
}

/// Case-insensitive containment over title and content. `term` must already be lowercased.
fn matches_search(post: &Post, term: &str) -> bool {
    post.title.to_lowercase().contains(term) || post.content.to_lowercase().contains(term)
}

/// Orders a store scan (oldest insertion first) newest first. Posts are laid out
/// in feed order, latest insertion on top, before a stable sort on the timestamp,
/// so ties keep their feed order.
fn newest_first(posts: &mut [Post]) {
    posts.reverse();
    posts.sort_by(|a, b| b.created_at.cmp(&a.created_at));
}

pub fn list(
    posts: &dyn PostStore,
    users: &dyn UserStore,
    filter: &ListFilter,
) -> BlogResult<Vec<PostView>> {
    let predicate = filter.predicate();
    let mut matched = posts.select(&predicate)?;
    newest_first(&mut matched);
    debug!(?filter, matched = matched.len(), "listed posts");

    let page: Vec<Post> = match filter.page {
        Some(page) => matched
            .into_iter()
            .skip((page.max(1) - 1).saturating_mul(POSTS_PER_PAGE))
            .take(POSTS_PER_PAGE)
            .collect(),
        None => matched,
    };

    Ok(page.iter().map(|p| to_view(users, p)).collect())
}

pub fn get(posts: &dyn PostStore, users: &dyn UserStore, post_id: &str) -> BlogResult<PostView> {
    posts
        .get(post_id)?
        .map(|p| to_view(users, &p))
        .ok_or_else(BlogError::post_not_found)
}

/// Distinct categories in first-seen order over the newest-first listing,
/// preceded by the "all" sentinel.
pub fn categories(posts: &dyn PostStore) -> BlogResult<Vec<String>> {
    let mut all = posts.select(&|p: &Post| !p.category.is_empty())?;
    newest_first(&mut all);

    let mut out = vec![ALL_CATEGORIES.to_string()];
    for post in all {
        if !out.contains(&post.category) {
            out.push(post.category);
        }
    }
    Ok(out)
}

pub fn to_view(users: &dyn UserStore, post: &Post) -> PostView {
    let mut names: HashMap<String, AuthorView> = HashMap::new();
    let mut author_of = |id: &str| -> AuthorView {
        names
            .entry(id.to_string())
            .or_insert_with(|| resolve_author(users, id))
            .clone()
    };

    let author = author_of(&post.author_id);
    let comments = post
        .comments
        .iter()
        .map(|c| CommentView {
            id: c.id.clone(),
            author: author_of(&c.author_id),
            content: c.content.clone(),
            created_at: c.created_at,
        })
        .collect::<Vec<_>>();

    PostView {
        id: post.id.clone(),
        title: post.title.clone(),
        content: post.content.clone(),
        author,
        category: post.category.clone(),
        tags: post.tags.clone(),
        likes: post.likes.iter().cloned().collect(),
        like_count: post.likes.len(),
        comment_count: comments.len(),
        comments,
        created_at: post.created_at,
        updated_at: post.updated_at,
    }
}
