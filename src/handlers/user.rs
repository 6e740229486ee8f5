//! 用户管理 HTTP 处理器

use crate::{
    auth::jwt::Identity, error::AppError, handlers::ApiJson, middleware::AppState,
    models::user::*,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use std::sync::Arc;

/// 注册用户
pub async fn create_user(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<CreateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.register(req).await?;
    Ok((StatusCode::CREATED, Json(user)))
}

/// 更新当前用户的邮箱和密码
pub async fn update_user(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    ApiJson(req): ApiJson<UpdateUserRequest>,
) -> Result<impl IntoResponse, AppError> {
    let user = state.user_service.update_credentials(&identity, req).await?;
    Ok(Json(user))
}
