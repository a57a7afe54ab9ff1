//! HTTP surface. Handlers authenticate, decode and sanitize input, call into the
//! core, and render the read model. Status codes come from `BlogError`.

use actix_web::http::header::AUTHORIZATION;
use actix_web::{web, HttpRequest, HttpResponse};
use serde::de::DeserializeOwned;
use tracing::warn;

use crate::auth::{login_user, AuthError};
use crate::config::MAX_COMMENT_LENGTH;
use crate::core::errors::{BlogError, BlogResult};
use crate::core::helpers::{sanitize_rich_text, sanitize_text, validate_uuid};
use crate::core::query_params::parse_query_params;
use crate::interactions::{add_comment, toggle_like};
use crate::models::models::{
    CommentRequest, CommentView, LoginRequest, PostDraft, PostPatch, RegisterRequest,
};
use crate::posts::{create_post, delete_post, update_post};
use crate::query::{self, ListFilter};
use crate::users::{get_profile, register_user, resolve_author};
use crate::AppState;

/// Registers every route on an actix `ServiceConfig`.
pub fn configure(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health))
        .service(
            web::scope("/api/auth")
                .route("/register", web::post().to(register))
                .route("/login", web::post().to(login))
                .route("/me", web::get().to(me)),
        )
        .service(
            web::scope("/api/posts")
                .route("", web::get().to(list_posts))
                .route("", web::post().to(create))
                .route("/categories", web::get().to(categories))
                .route("/{id}", web::get().to(get_post))
                .route("/{id}", web::put().to(update))
                .route("/{id}", web::delete().to(delete))
                .route("/{id}/like", web::post().to(like))
                .route("/{id}/comment", web::post().to(comment)),
        );
}

fn authenticate(req: &HttpRequest, state: &AppState) -> BlogResult<String> {
    let header = match req.headers().get(AUTHORIZATION) {
        Some(value) => Some(value.to_str().map_err(|_| {
            AuthError::InvalidCredential("authorization header is not valid text".to_string())
        })?),
        None => None,
    };

    state.identity.resolve(header).map_err(|e| {
        warn!(path = req.path(), error = %e, "request rejected");
        BlogError::from(e)
    })
}

fn parse_body<T: DeserializeOwned>(body: &[u8]) -> BlogResult<T> {
    serde_json::from_slice(body).map_err(|e| BlogError::Validation(format!("Invalid JSON body: {}", e)))
}

/// Post ids are UUIDs; anything else cannot name a stored post.
fn post_id(path: &str) -> BlogResult<&str> {
    if validate_uuid(path) {
        Ok(path)
    } else {
        Err(BlogError::post_not_found())
    }
}

async fn blocking<T, F>(f: F) -> BlogResult<T>
where
    F: FnOnce() -> BlogResult<T> + Send + 'static,
    T: Send + 'static,
{
    web::block(f)
        .await
        .map_err(|e| BlogError::Storage(format!("worker pool unavailable: {}", e)))?
}

fn sanitize_draft(draft: PostDraft) -> PostDraft {
    PostDraft {
        title: draft.title.as_deref().map(sanitize_text),
        content: draft.content.as_deref().map(sanitize_rich_text),
        category: sanitize_text(&draft.category),
        tags: draft.tags.iter().map(|t| sanitize_text(t)).collect(),
    }
}

fn sanitize_patch(patch: PostPatch) -> PostPatch {
    PostPatch {
        title: patch.title.as_deref().map(sanitize_text),
        content: patch.content.as_deref().map(sanitize_rich_text),
        category: patch.category.as_deref().map(sanitize_text),
        tags: patch
            .tags
            .map(|tags| tags.iter().map(|t| sanitize_text(t)).collect()),
    }
}

async fn health() -> HttpResponse {
    HttpResponse::Ok().json(serde_json::json!({ "status": "ok" }))
}

async fn register(state: web::Data<AppState>, body: web::Bytes) -> BlogResult<HttpResponse> {
    let request: RegisterRequest = parse_body(&body)?;
    let state = state.into_inner();
    let resp = blocking(move || register_user(state.users.as_ref(), &state.identity, &request)).await?;
    Ok(HttpResponse::Created().json(resp))
}

async fn login(state: web::Data<AppState>, body: web::Bytes) -> BlogResult<HttpResponse> {
    let request: LoginRequest = parse_body(&body)?;
    let state = state.into_inner();
    let resp = blocking(move || login_user(state.users.as_ref(), &state.identity, &request)).await?;
    Ok(HttpResponse::Ok().json(resp))
}

async fn me(req: HttpRequest, state: web::Data<AppState>) -> BlogResult<HttpResponse> {
    let user_id = authenticate(&req, &state)?;
    let user = get_profile(state.users.as_ref(), &user_id)?;
    let filter = ListFilter {
        author: Some(user_id),
        ..ListFilter::default()
    };
    let posts = query::list(state.posts.as_ref(), state.users.as_ref(), &filter)?;

    Ok(HttpResponse::Ok().json(serde_json::json!({ "user": user, "posts": posts })))
}

async fn list_posts(req: HttpRequest, state: web::Data<AppState>) -> BlogResult<HttpResponse> {
    let params = parse_query_params(req.query_string());
    let filter = ListFilter::from_params(&params);
    let posts = query::list(state.posts.as_ref(), state.users.as_ref(), &filter)?;
    Ok(HttpResponse::Ok().json(posts))
}

async fn categories(state: web::Data<AppState>) -> BlogResult<HttpResponse> {
    Ok(HttpResponse::Ok().json(query::categories(state.posts.as_ref())?))
}

async fn get_post(state: web::Data<AppState>, path: web::Path<String>) -> BlogResult<HttpResponse> {
    let id = post_id(&path)?;
    let view = query::get(state.posts.as_ref(), state.users.as_ref(), id)?;
    Ok(HttpResponse::Ok().json(view))
}

async fn create(
    req: HttpRequest,
    state: web::Data<AppState>,
    body: web::Bytes,
) -> BlogResult<HttpResponse> {
    let user_id = authenticate(&req, &state)?;
    let draft = sanitize_draft(parse_body(&body)?);

    let post = create_post(state.posts.as_ref(), &user_id, &draft)?;
    Ok(HttpResponse::Created().json(query::to_view(state.users.as_ref(), &post)))
}

async fn update(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> BlogResult<HttpResponse> {
    let user_id = authenticate(&req, &state)?;
    let id = post_id(&path)?;
    let patch = sanitize_patch(parse_body(&body)?);

    let post = update_post(state.posts.as_ref(), &user_id, id, &patch)?;
    Ok(HttpResponse::Ok().json(query::to_view(state.users.as_ref(), &post)))
}

async fn delete(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> BlogResult<HttpResponse> {
    let user_id = authenticate(&req, &state)?;
    let id = post_id(&path)?;

    delete_post(state.posts.as_ref(), &user_id, id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({ "message": "Post deleted" })))
}

async fn like(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
) -> BlogResult<HttpResponse> {
    let user_id = authenticate(&req, &state)?;
    let id = post_id(&path)?;

    let toggled = toggle_like(state.posts.as_ref(), id, &user_id)?;
    Ok(HttpResponse::Ok().json(serde_json::json!({
        "liked": toggled.liked,
        "post": query::to_view(state.users.as_ref(), &toggled.post),
    })))
}

async fn comment(
    req: HttpRequest,
    state: web::Data<AppState>,
    path: web::Path<String>,
    body: web::Bytes,
) -> BlogResult<HttpResponse> {
    let user_id = authenticate(&req, &state)?;
    let id = post_id(&path)?;
    let request: CommentRequest = parse_body(&body)?;
    if request.content.chars().count() > MAX_COMMENT_LENGTH {
        return Err(BlogError::Validation(format!(
            "Comment must be at most {} characters",
            MAX_COMMENT_LENGTH
        )));
    }
    let text = sanitize_text(request.content.trim());

    let added = add_comment(state.posts.as_ref(), id, &user_id, &text)?;
    let comment = CommentView {
        author: resolve_author(state.users.as_ref(), &added.comment.author_id),
        id: added.comment.id,
        content: added.comment.content,
        created_at: added.comment.created_at,
    };

    Ok(HttpResponse::Created().json(serde_json::json!({
        "comment": comment,
        "post": query::to_view(state.users.as_ref(), &added.post),
    })))
}
