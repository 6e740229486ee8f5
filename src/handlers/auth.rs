//! 认证相关的 HTTP 处理器

use crate::{
    auth::middleware::extract_bearer_token, error::AppError, handlers::ApiJson,
    middleware::AppState, models::auth::*,
};
use axum::{
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
    Json,
};
use std::sync::Arc;

/// 登录
pub async fn login(
    State(state): State<Arc<AppState>>,
    ApiJson(req): ApiJson<LoginRequest>,
) -> Result<impl IntoResponse, AppError> {
    let response = state.auth_service.login(req).await?;
    Ok(Json(response))
}

/// 刷新访问令牌（刷新令牌放在 Authorization: Bearer 中）
pub async fn refresh_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = extract_bearer_token(&headers)?;
    let response = state.auth_service.refresh(&refresh_token).await?;
    Ok(Json(response))
}

/// 撤销刷新令牌
pub async fn revoke_token(
    State(state): State<Arc<AppState>>,
    headers: HeaderMap,
) -> Result<impl IntoResponse, AppError> {
    let refresh_token = extract_bearer_token(&headers)?;
    state.auth_service.revoke(&refresh_token).await?;
    Ok(StatusCode::NO_CONTENT)
}
