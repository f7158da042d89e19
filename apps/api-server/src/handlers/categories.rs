//! Category handlers.

use actix_web::{HttpResponse, web};
use uuid::Uuid;

use quill_shared::dto::{CategoryResponse, CreateCategoryRequest, UpdateCategoryRequest};

use super::validation;
use crate::middleware::auth::Identity;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// GET /api/v1/categories
pub async fn list(state: web::Data<AppState>) -> AppResult<HttpResponse> {
    let categories: Vec<CategoryResponse> = state
        .categories
        .list_categories()
        .await?
        .into_iter()
        .map(CategoryResponse::from)
        .collect();

    Ok(HttpResponse::Ok().json(categories))
}

/// GET /api/v1/categories/{id}
pub async fn get(state: web::Data<AppState>, path: web::Path<Uuid>) -> AppResult<HttpResponse> {
    let category = state.categories.get_category(path.into_inner()).await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// POST /api/v1/categories
pub async fn create(
    state: web::Data<AppState>,
    _identity: Identity,
    body: web::Json<CreateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validation::category_name(&req.name)?;

    let category = state.categories.create_category(req.name).await?;
    Ok(HttpResponse::Created().json(CategoryResponse::from(category)))
}

/// PUT /api/v1/categories/{id}
pub async fn update(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
    body: web::Json<UpdateCategoryRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validation::category_name(&req.name)?;

    let category = state
        .categories
        .update_category(path.into_inner(), req.name)
        .await?;
    Ok(HttpResponse::Ok().json(CategoryResponse::from(category)))
}

/// DELETE /api/v1/categories/{id}
pub async fn delete(
    state: web::Data<AppState>,
    _identity: Identity,
    path: web::Path<Uuid>,
) -> AppResult<HttpResponse> {
    state.categories.delete_category(path.into_inner()).await?;
    Ok(HttpResponse::NoContent().finish())
}
