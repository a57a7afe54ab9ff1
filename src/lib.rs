pub mod auth;
pub mod config;
pub mod core;
pub mod guard;
pub mod handlers;
pub mod interactions;
pub mod models;
pub mod posts;
pub mod query;
pub mod store;
pub mod users;

use std::sync::Arc;

use crate::auth::IdentityProvider;
use crate::store::{MemoryPostStore, MemoryUserStore, PostStore, UserStore};

pub use handlers::configure;

/// Shared collaborators handed to every request.
#[derive(Clone)]
pub struct AppState {
    pub posts: Arc<dyn PostStore>,
    pub users: Arc<dyn UserStore>,
    pub identity: Arc<IdentityProvider>,
}

impl AppState {
    pub fn new(
        posts: Arc<dyn PostStore>,
        users: Arc<dyn UserStore>,
        identity: IdentityProvider,
    ) -> Self {
        Self {
            posts,
            users,
            identity: Arc::new(identity),
        }
    }

    pub fn in_memory(identity: IdentityProvider) -> Self {
        Self::new(
            Arc::new(MemoryPostStore::new()),
            Arc::new(MemoryUserStore::new()),
            identity,
        )
    }
}
