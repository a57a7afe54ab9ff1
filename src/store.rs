//! Durable keyed storage for post and user aggregates.
//!
//! Every post mutation goes through [`PostStore::modify`] or [`PostStore::remove`],
//! which run the whole read-modify-write under the store's write lock. A mutation
//! that fails leaves the stored aggregate exactly as it was.

use std::collections::{BTreeMap, HashMap};
use std::sync::{RwLock, RwLockReadGuard, RwLockWriteGuard};

use crate::core::errors::{BlogError, BlogResult};
use crate::guard::can_mutate;
use crate::models::models::{Post, User};

/// Identifies the aggregate a mutation targets. When `author` is set the post
/// only matches if it was written by that user; otherwise it is treated as missing.
#[derive(Debug, Clone, Copy)]
pub struct PostKey<'a> {
    pub id: &'a str,
    pub author: Option<&'a str>,
}

impl<'a> PostKey<'a> {
    pub fn by_id(id: &'a str) -> Self {
        Self { id, author: None }
    }

    pub fn owned_by(id: &'a str, author: &'a str) -> Self {
        Self {
            id,
            author: Some(author),
        }
    }

    fn matches(&self, post: &Post) -> bool {
        self.author.map_or(true, |author| can_mutate(author, post))
    }
}

pub type PostMutation<'m> = dyn FnMut(&mut Post) -> BlogResult<()> + 'm;

pub trait PostStore: Send + Sync {
    fn insert(&self, post: Post) -> BlogResult<Post>;

    fn get(&self, id: &str) -> BlogResult<Option<Post>>;

    /// Posts satisfying `predicate`, in insertion order.
    fn select(&self, predicate: &dyn Fn(&Post) -> bool) -> BlogResult<Vec<Post>>;

    /// Atomically applies `mutation` to the post matching `key` and returns the
    /// stored result. The mutation runs on a copy that is committed only on `Ok`.
    fn modify(&self, key: PostKey<'_>, mutation: &mut PostMutation<'_>) -> BlogResult<Post>;

    /// Removes the post matching `key` along with its likes and comments.
    fn remove(&self, key: PostKey<'_>) -> BlogResult<Post>;
}

pub trait UserStore: Send + Sync {
    /// Fails with `Validation` if the email (case-insensitive) is taken.
    fn insert(&self, user: User) -> BlogResult<User>;

    fn get(&self, id: &str) -> BlogResult<Option<User>>;

    fn find_by_email(&self, email: &str) -> BlogResult<Option<User>>;
}

fn poisoned<E>(_: E) -> BlogError {
    BlogError::Storage("store lock poisoned".to_string())
}

#[derive(Default)]
struct PostTable {
    next_seq: u64,
    by_seq: BTreeMap<u64, Post>,
    seq_by_id: HashMap<String, u64>,
}

/// In-process post store. Sequence numbers record insertion order so that
/// listings stay stable for posts sharing a timestamp.
#[derive(Default)]
pub struct MemoryPostStore {
    table: RwLock<PostTable>,
}

impl MemoryPostStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn read(&self) -> BlogResult<RwLockReadGuard<'_, PostTable>> {
        self.table.read().map_err(poisoned)
    }

    fn write(&self) -> BlogResult<RwLockWriteGuard<'_, PostTable>> {
        self.table.write().map_err(poisoned)
    }
}

impl PostTable {
    fn locate(&self, key: PostKey<'_>) -> BlogResult<u64> {
        self.seq_by_id
            .get(key.id)
            .copied()
            .filter(|seq| self.by_seq.get(seq).is_some_and(|p| key.matches(p)))
            .ok_or_else(BlogError::post_not_found)
    }
}

impl PostStore for MemoryPostStore {
    fn insert(&self, post: Post) -> BlogResult<Post> {
        let mut table = self.write()?;
        if table.seq_by_id.contains_key(&post.id) {
            return Err(BlogError::Storage(format!("duplicate post id {}", post.id)));
        }

        let seq = table.next_seq;
        table.next_seq += 1;
        table.seq_by_id.insert(post.id.clone(), seq);
        table.by_seq.insert(seq, post.clone());
        Ok(post)
    }

    fn get(&self, id: &str) -> BlogResult<Option<Post>> {
        let table = self.read()?;
        Ok(table
            .seq_by_id
            .get(id)
            .and_then(|seq| table.by_seq.get(seq))
            .cloned())
    }

    fn select(&self, predicate: &dyn Fn(&Post) -> bool) -> BlogResult<Vec<Post>> {
        let table = self.read()?;
        Ok(table
            .by_seq
            .values()
            .filter(|p| predicate(p))
            .cloned()
            .collect())
    }

    fn modify(&self, key: PostKey<'_>, mutation: &mut PostMutation<'_>) -> BlogResult<Post> {
        let mut table = self.write()?;
        let seq = table.locate(key)?;
        let current = table.by_seq.get(&seq).ok_or_else(BlogError::post_not_found)?;

        let mut next = current.clone();
        mutation(&mut next)?;
        table.by_seq.insert(seq, next.clone());
        Ok(next)
    }

    fn remove(&self, key: PostKey<'_>) -> BlogResult<Post> {
        let mut table = self.write()?;
        let seq = table.locate(key)?;
        table.seq_by_id.remove(key.id);
        table.by_seq.remove(&seq).ok_or_else(BlogError::post_not_found)
    }
}

#[derive(Default)]
struct UserTable {
    by_id: HashMap<String, User>,
    id_by_email: HashMap<String, String>,
}

#[derive(Default)]
pub struct MemoryUserStore {
    table: RwLock<UserTable>,
}

impl MemoryUserStore {
    pub fn new() -> Self {
        Self::default()
    }
}

fn email_key(email: &str) -> String {
    email.trim().to_lowercase()
}

impl UserStore for MemoryUserStore {
    fn insert(&self, user: User) -> BlogResult<User> {
        let mut table = self.table.write().map_err(poisoned)?;
        let key = email_key(&user.email);
        if table.id_by_email.contains_key(&key) {
            return Err(BlogError::Validation("email already registered".to_string()));
        }

        table.id_by_email.insert(key, user.id.clone());
        table.by_id.insert(user.id.clone(), user.clone());
        Ok(user)
    }

    fn get(&self, id: &str) -> BlogResult<Option<User>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table.by_id.get(id).cloned())
    }

    fn find_by_email(&self, email: &str) -> BlogResult<Option<User>> {
        let table = self.table.read().map_err(poisoned)?;
        Ok(table
            .id_by_email
            .get(&email_key(email))
            .and_then(|id| table.by_id.get(id))
            .cloned())
    }
}
