//! 应用状态与 HTTP 中间件
//! 请求追踪（trace_id / request_id）

use axum::{
    extract::Request,
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use std::sync::Arc;
use std::time::Instant;
use tracing::Instrument;
use uuid::Uuid;

use crate::{
    auth::{api_key::ApiKeyGate, jwt::JwtService},
    config::AppConfig,
    error::AppError,
    repository::{
        AuthRepository, MemoryStore, PostRepository, PostStore, RefreshTokenStore, UserRepository,
        UserStore,
    },
    services::{AuthService, PostService, UserService},
};

/// 应用状态
///
/// 服务之间共享的 JwtService 用 Arc 包装，整个状态再以 Arc<AppState> 交给路由。
pub struct AppState {
    pub config: AppConfig,
    /// 内存存储运行时为 None，就绪探针据此跳过数据库检查
    pub db: Option<PgPool>,
    pub jwt_service: Arc<JwtService>,
    pub api_key_gate: ApiKeyGate,
    pub auth_service: AuthService,
    pub user_service: UserService,
    pub post_service: PostService,
}

impl AppState {
    /// 由任意存储实现组装服务
    pub fn new(
        config: AppConfig,
        db: Option<PgPool>,
        users: Arc<dyn UserStore>,
        refresh_tokens: Arc<dyn RefreshTokenStore>,
        posts: Arc<dyn PostStore>,
    ) -> Result<Self, AppError> {
        config.validate()?;

        let jwt_service = Arc::new(JwtService::from_config(&config)?);
        let api_key_gate = ApiKeyGate::new(config.security.webhook_api_key.as_ref());

        let auth_service = AuthService::new(
            users.clone(),
            refresh_tokens,
            jwt_service.clone(),
            &config.security,
        )?;
        let user_service = UserService::new(users, &config.security)?;
        let post_service = PostService::new(posts, &config.posts);

        Ok(Self {
            config,
            db,
            jwt_service,
            api_key_gate,
            auth_service,
            user_service,
            post_service,
        })
    }

    /// PostgreSQL 存储
    pub fn with_postgres(config: AppConfig, pool: PgPool) -> Result<Self, AppError> {
        Self::new(
            config,
            Some(pool.clone()),
            Arc::new(UserRepository::new(pool.clone())),
            Arc::new(AuthRepository::new(pool.clone())),
            Arc::new(PostRepository::new(pool)),
        )
    }

    /// 内存存储（测试与本地调试）
    pub fn in_memory(config: AppConfig) -> Result<Self, AppError> {
        let store = Arc::new(MemoryStore::new());
        Self::new(config, None, store.clone(), store.clone(), store)
    }
}

tokio::task_local! {
    static REQUEST_ID: String;
}

/// 当前请求的 request_id（仅在 request_tracking_middleware 内部可用）
pub fn current_request_id() -> Option<String> {
    REQUEST_ID.try_with(|id| id.clone()).ok()
}

/// 请求追踪中间件
/// 为每个请求生成 trace_id 和 request_id，并记录耗时
pub async fn request_tracking_middleware(req: Request, next: Next) -> Response {
    let trace_id = extract_or_generate_trace_id(req.headers());
    let request_id = Uuid::new_v4().to_string();

    let method = req.method().to_string();
    // 只记录路径，查询串里可能带有用户输入
    let path = req.uri().path().to_string();

    let span = tracing::info_span!(
        "http_request",
        trace_id = %trace_id,
        request_id = %request_id,
        method = %method,
        path = %path,
    );

    async move {
        let start = Instant::now();

        let mut response = REQUEST_ID.scope(request_id.clone(), next.run(req)).await;

        let elapsed = start.elapsed();
        tracing::info!(
            method = %method,
            path = %path,
            status = response.status().as_u16(),
            elapsed_ms = elapsed.as_millis(),
            "Request completed"
        );

        // 在响应头中回写追踪 ID
        if let Ok(value) = HeaderValue::from_str(&trace_id) {
            response.headers_mut().insert("x-trace-id", value);
        }
        if let Ok(value) = HeaderValue::from_str(&request_id) {
            response.headers_mut().insert("x-request-id", value);
        }

        response
    }
    .instrument(span)
    .await
}

/// 从请求头中提取或生成 trace_id
fn extract_or_generate_trace_id(headers: &HeaderMap) -> String {
    headers
        .get("x-trace-id")
        .and_then(|v| v.to_str().ok())
        .filter(|s| !s.is_empty() && s.len() <= 128)
        .map(|s| s.to_string())
        .unwrap_or_else(|| Uuid::new_v4().to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_or_generate_trace_id() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "test-trace-123".parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert_eq!(trace_id, "test-trace-123");

        let headers = HeaderMap::new();
        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(!trace_id.is_empty());
        assert_ne!(trace_id, "test-trace-123");
    }

    #[tokio::test]
    async fn test_current_request_id_is_scoped() {
        assert_eq!(current_request_id(), None);

        let seen = REQUEST_ID
            .scope("req-1".to_string(), async { current_request_id() })
            .await;
        assert_eq!(seen.as_deref(), Some("req-1"));
    }

    #[test]
    fn test_oversized_trace_id_is_replaced() {
        let mut headers = HeaderMap::new();
        headers.insert("x-trace-id", "a".repeat(200).parse().unwrap());

        let trace_id = extract_or_generate_trace_id(&headers);
        assert!(Uuid::parse_str(&trace_id).is_ok());
    }
}
