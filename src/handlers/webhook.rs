//! 计费方 Webhook 处理器（API Key 认证）

use crate::{
    error::AppError, handlers::ApiJson, middleware::AppState, models::auth::WebhookEvent,
};
use axum::{extract::State, http::StatusCode, response::IntoResponse};
use std::sync::Arc;

/// 订阅升级事件
pub async fn upgrade(
    State(state): State<Arc<AppState>>,
    ApiJson(event): ApiJson<WebhookEvent>,
) -> Result<impl IntoResponse, AppError> {
    state.user_service.apply_webhook(event).await?;
    Ok(StatusCode::NO_CONTENT)
}
