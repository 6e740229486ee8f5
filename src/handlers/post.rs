//! 帖子 HTTP 处理器

use crate::{
    auth::jwt::Identity, error::AppError, handlers::ApiJson, middleware::AppState,
    models::post::*,
};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    Json,
};
use std::sync::Arc;
use uuid::Uuid;

/// 发帖
pub async fn create_post(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    ApiJson(req): ApiJson<CreatePostRequest>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.post_service.create(&identity, req).await?;
    Ok((StatusCode::CREATED, Json(post)))
}

/// 帖子列表，可按作者过滤
pub async fn list_posts(
    State(state): State<Arc<AppState>>,
    Query(query): Query<ListPostsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let posts = state.post_service.list(query).await?;
    Ok(Json(posts))
}

pub async fn get_post(
    State(state): State<Arc<AppState>>,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    let post = state.post_service.get(id).await?;
    Ok(Json(post))
}

/// 删除帖子
pub async fn delete_post(
    State(state): State<Arc<AppState>>,
    identity: Identity,
    Path(id): Path<Uuid>,
) -> Result<impl IntoResponse, AppError> {
    state.post_service.delete(&identity, id).await?;
    Ok(StatusCode::NO_CONTENT)
}
