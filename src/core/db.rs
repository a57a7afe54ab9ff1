use anyhow::Context;
use chrono::{DateTime, TimeZone, Utc};
use tracing::info;

use crate::core::helpers::{hash_password, new_id, now};
use crate::models::models::{Comment, Post, User};
use crate::store::{PostStore, UserStore};

const DEMO_PASSWORD: &str = "password";

fn demo_date(year: i32, month: u32, day: u32) -> anyhow::Result<DateTime<Utc>> {
    Utc.with_ymd_and_hms(year, month, day, 0, 0, 0)
        .single()
        .context("invalid demo date")
}

fn demo_user(users: &dyn UserStore, name: &str, email: &str) -> anyhow::Result<(User, bool)> {
    if let Some(existing) = users.find_by_email(email)? {
        return Ok((existing, false));
    }

    let user = users.insert(User {
        id: new_id(),
        name: name.to_string(),
        email: email.to_string(),
        password_hash: hash_password(DEMO_PASSWORD)?,
        is_admin: false,
        created_at: now(),
    })?;
    Ok((user, true))
}

/// Seeds two demo accounts and their sample posts. Running it again is a no-op.
pub fn seed_demo_data(posts: &dyn PostStore, users: &dyn UserStore) -> anyhow::Result<()> {
    let (john, john_created) =
        demo_user(users, "John Doe", "john@example.com").context("seeding John Doe")?;
    let (jane, _) = demo_user(users, "Jane Smith", "jane@example.com").context("seeding Jane Smith")?;

    if !john_created {
        return Ok(());
    }

    let react_post = Post {
        id: new_id(),
        title: "Getting Started with React Hooks".to_string(),
        content: "<p>Hooks let function components hold state and side effects. \
                  Start with <code>useState</code> and <code>useEffect</code>.</p>"
            .to_string(),
        author_id: john.id.clone(),
        category: "Technology".to_string(),
        tags: vec!["react".into(), "javascript".into(), "frontend".into()],
        likes: [jane.id.clone()].into_iter().collect(),
        comments: vec![Comment {
            id: new_id(),
            author_id: jane.id.clone(),
            content: "Great post!".to_string(),
            created_at: now(),
        }],
        created_at: demo_date(2024, 1, 15)?,
        updated_at: None,
    };

    let node_post = Post {
        id: new_id(),
        title: "Building REST APIs with Node.js".to_string(),
        content: "<p>A tour of routing, middleware and error handling for JSON APIs.</p>"
            .to_string(),
        author_id: john.id,
        category: "Backend".to_string(),
        tags: vec!["nodejs".into(), "backend".into(), "javascript".into()],
        likes: Default::default(),
        comments: Vec::new(),
        created_at: demo_date(2024, 1, 20)?,
        updated_at: None,
    };

    posts.insert(react_post).context("seeding React post")?;
    posts.insert(node_post).context("seeding Node.js post")?;
    info!("demo data seeded");
    Ok(())
}
