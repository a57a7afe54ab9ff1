use crate::models::models::Post;

/// Whether `user_id` may edit or delete `post`. Only the author may.
///
/// Liking and commenting are open to any authenticated user and never consult this.
pub fn can_mutate(user_id: &str, post: &Post) -> bool {
    !user_id.is_empty() && post.author_id == user_id
}
