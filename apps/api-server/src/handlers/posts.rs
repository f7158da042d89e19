//! Post handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_core::domain::Post;
use quill_core::services::{PostDraft, PostFilter};
use quill_shared::dto::{PostListQuery, PostRequest, PostResponse};

use super::validation;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

fn draft(req: PostRequest) -> PostDraft {
    PostDraft {
        title: req.title,
        content: req.content,
        status: req.status,
        category_id: req.category_id,
        tag_ids: req.tag_ids,
    }
}

fn responses(posts: Vec<Post>) -> Vec<PostResponse> {
    posts.into_iter().map(PostResponse::from).collect()
}

/// GET /api/v1/posts?categoryId=&tagId=
pub async fn list(
    state: web::Data<AppState>,
    query: web::Query<PostListQuery>,
) -> AppResult<HttpResponse> {
    let query = query.into_inner();
    let posts = state
        .posts
        .list_published(PostFilter {
            category_id: query.category_id,
            tag_id: query.tag_id,
        })
        .await?;

    Ok(HttpResponse::Ok().json(responses(posts)))
}

/// GET /api/v1/posts/drafts
pub async fn drafts(state: web::Data<AppState>, identity: Identity) -> AppResult<HttpResponse> {
    let posts = state.posts.list_drafts(identity.user_id).await?;
    Ok(HttpResponse::Ok().json(responses(posts)))
}

/// GET /api/v1/posts/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let post = state.posts.get_post(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// POST /api/v1/posts
pub async fn create(
    state: web::Data<AppState>,
    identity: Identity,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validation::post(&req)?;

    let author = state.users.get_user(identity.user_id).await?;
    let post = state.posts.create_post(&author, draft(req)).await?;

    Ok(HttpResponse::Created().json(PostResponse::from(post)))
}

/// PUT /api/v1/posts/{id}
pub async fn update(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<PostRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validation::post(&req)?;

    let post = state
        .posts
        .update_post(path.into_inner(), identity.user_id, draft(req))
        .await?;

    Ok(HttpResponse::Ok().json(PostResponse::from(post)))
}

/// DELETE /api/v1/posts/{id}
pub async fn delete(
    state: web::Data<AppState>,
    identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state
        .posts
        .delete_post(path.into_inner(), identity.user_id)
        .await?;
    Ok(HttpResponse::NoContent().finish())
}
