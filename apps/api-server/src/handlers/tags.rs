//! Tag handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{CreateTagsRequest, TagResponse};

use super::validation;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/tags
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let tags: Vec<TagResponse> = state
        .tags
        .list_tags()
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(tags))
}

/// GET /api/v1/tags/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let tag = state.tags.get_tag(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(TagResponse::from(tag)))
}

/// POST /api/v1/tags
///
/// Get-or-create: names that already exist are returned as they are.
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateTagsRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validation::tag_names(&req.names)?;

    let tags: Vec<TagResponse> = state
        .tags
        .create_tags(&req.names)
        .await?
        .into_iter()
        .map(TagResponse::from)
        .collect();

    Ok(HttpResponse::Created().json(tags))
}

/// DELETE /api/v1/tags/{id}
pub async fn delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.tags.delete_tag(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
