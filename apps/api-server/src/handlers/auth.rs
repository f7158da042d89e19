//! Authentication handlers.

use actix_web::{HttpResponse, web};
use std::sync::Arc;

use quill_core::ports::TokenService;
use quill_core::services::SignUp;
use quill_shared::dto::{AuthResponse, LoginRequest, SignUpRequest, UserResponse};

use super::validation;
use crate::middleware::error::AppResult;
use crate::state::AppState;

/// POST /api/v1/auth/login
pub async fn login(
    state: web::Data<AppState>,
    token_service: web::Data<Arc<dyn TokenService>>,
    body: web::Json<LoginRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();

    let user = state.users.authenticate(&req.email, &req.password).await?;
    let token = token_service.generate_token(user.id, &user.email)?;

    tracing::info!(user_id = %user.id, "User logged in");

    Ok(HttpResponse::Ok().json(AuthResponse {
        token,
        expires_in: token_service.expiration_seconds(),
    }))
}

/// POST /api/v1/auth/signin
///
/// Creates an account. Clients log in separately afterwards.
pub async fn sign_up(
    state: web::Data<AppState>,
    body: web::Json<SignUpRequest>,
) -> AppResult<HttpResponse> {
    let req = body.into_inner();
    validation::sign_up(&req)?;

    let user = state
        .users
        .sign_up(SignUp {
            name: req.name,
            email: req.email,
            password: req.password,
        })
        .await?;

    Ok(HttpResponse::Created().json(UserResponse {
        id: user.id,
        name: user.name,
        email: user.email,
        created_at: user.created_at,
    }))
}
