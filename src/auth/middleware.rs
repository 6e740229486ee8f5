//! 认证中间件与提取器

use crate::{
    auth::jwt::Identity,
    error::{AppError, AuthError},
    middleware::AppState,
};
use axum::{
    extract::{FromRequestParts, Request, State},
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
    middleware::Next,
    response::Response,
};
use std::sync::Arc;

const BEARER_PREFIX: &str = "Bearer ";
const API_KEY_PREFIX: &str = "ApiKey ";

// handler 中直接提取已认证身份（由 bearer_auth_middleware 写入扩展）
impl<S> FromRequestParts<S> for Identity
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<Identity>()
            .copied()
            .ok_or(AppError::Unauthorized)
    }
}

fn extract_with_prefix(headers: &HeaderMap, prefix: &str) -> Result<String, AuthError> {
    headers
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(|s| s.strip_prefix(prefix))
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .ok_or(AuthError::Unauthorized)
}

/// 从 Authorization 头提取 Bearer 令牌
pub fn extract_bearer_token(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_with_prefix(headers, BEARER_PREFIX)
}

/// 从 Authorization 头提取 API Key（格式: `ApiKey <key>`）
pub fn extract_api_key(headers: &HeaderMap) -> Result<String, AuthError> {
    extract_with_prefix(headers, API_KEY_PREFIX)
}

/// Bearer 认证中间件 - 必须认证
pub async fn bearer_auth_middleware(
    State(state): State<Arc<AppState>>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = extract_bearer_token(req.headers())?;
    let identity = state.jwt_service.validate(&token)?;

    req.extensions_mut().insert(identity);

    Ok(next.run(req).await)
}

/// API Key 认证中间件 - webhook 等特权调用
pub async fn api_key_middleware(
    State(state): State<Arc<AppState>>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let supplied = extract_api_key(req.headers())?;
    state.api_key_gate.check(&supplied)?;

    Ok(next.run(req).await)
}
