use rand::{distributions::Alphanumeric, Rng};

pub const MAX_TITLE_LENGTH: usize = 200;
pub const MAX_POST_LENGTH: usize = 50_000;
pub const MAX_COMMENT_LENGTH: usize = 2_000;
pub const MAX_TAGS: usize = 20;
pub const MIN_PASSWORD_LENGTH: usize = 6;
pub const POSTS_PER_PAGE: usize = 20;

/// Category sentinel meaning "no category filter".
pub const ALL_CATEGORIES: &str = "all";

/// Display name used when a post or comment references a user that no longer exists.
pub const DELETED_USER_NAME: &str = "[deleted user]";

const DEFAULT_BIND_ADDR: &str = "0.0.0.0:8080";
pub const DEFAULT_TOKEN_EXPIRATION_HOURS: i64 = 24;
/// One year.
pub const MAX_TOKEN_EXPIRATION_HOURS: i64 = 24 * 365;

pub fn token_expiration_hours() -> i64 {
    parse_expiration_hours(std::env::var("BLOG_TOKEN_EXPIRATION_HOURS").ok().as_deref())
}

/// Unparsable or non-positive values use the default; large ones are capped.
fn parse_expiration_hours(raw: Option<&str>) -> i64 {
    raw.and_then(|v| v.trim().parse::<i64>().ok())
        .filter(|h| *h > 0)
        .map(|h| h.min(MAX_TOKEN_EXPIRATION_HOURS))
        .unwrap_or(DEFAULT_TOKEN_EXPIRATION_HOURS)
}

fn env_flag(key: &str) -> bool {
    std::env::var(key)
        .map(|v| matches!(v.to_ascii_lowercase().as_str(), "1" | "true" | "yes"))
        .unwrap_or(false)
}

#[derive(Debug, Clone)]
pub struct Config {
    pub bind_addr: String,
    pub jwt_secret: String,
    /// False when the secret was generated for this process only.
    pub jwt_secret_from_env: bool,
    pub token_expiration_hours: i64,
    pub seed_demo: bool,
    pub log_json: bool,
}

impl Config {
    pub fn from_env() -> Self {
        let (jwt_secret, jwt_secret_from_env) = match std::env::var("BLOG_JWT_SECRET") {
            Ok(secret) if !secret.trim().is_empty() => (secret, true),
            _ => (random_secret(), false),
        };

        Self {
            bind_addr: std::env::var("BLOG_BIND_ADDR")
                .unwrap_or_else(|_| DEFAULT_BIND_ADDR.to_string()),
            jwt_secret,
            jwt_secret_from_env,
            token_expiration_hours: token_expiration_hours(),
            seed_demo: env_flag("BLOG_SEED_DEMO"),
            log_json: env_flag("BLOG_LOG_JSON"),
        }
    }
}

fn random_secret() -> String {
    rand::thread_rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}
