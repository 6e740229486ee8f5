//! 路由注册
//! 创建所有 API 路由并应用中间件

use axum::{
    routing::{delete, get, post, put},
    Router,
};
use std::sync::Arc;
use tower_http::{
    compression::CompressionLayer, limit::RequestBodyLimitLayer, trace::TraceLayer,
};

use crate::{
    auth::middleware::{api_key_middleware, bearer_auth_middleware},
    handlers,
    middleware::AppState,
};

/// 请求体上限
const MAX_REQUEST_BODY_BYTES: usize = 64 * 1024;

/// 创建应用路由
pub fn create_router(state: Arc<AppState>) -> Router {
    let bearer = axum::middleware::from_fn_with_state(state.clone(), bearer_auth_middleware);
    let api_key = axum::middleware::from_fn_with_state(state.clone(), api_key_middleware);

    // 公开端点（健康检查）
    let public_routes = Router::new()
        .route("/api/healthz", get(handlers::health::health_check))
        .route("/ready", get(handlers::health::readiness_check));

    // 认证路由：refresh/revoke 的凭据是刷新令牌本身，由处理器读取
    let auth_routes = Router::new()
        .route("/api/login", post(handlers::auth::login))
        .route("/api/refresh", post(handlers::auth::refresh_token))
        .route("/api/revoke", post(handlers::auth::revoke_token));

    // 同一路径上公开方法与需认证方法并存，认证层只挂在具体方法上
    let resource_routes = Router::new()
        .route(
            "/api/users",
            post(handlers::user::create_user)
                .merge(put(handlers::user::update_user).route_layer(bearer.clone())),
        )
        .route(
            "/api/posts",
            get(handlers::post::list_posts)
                .merge(post(handlers::post::create_post).route_layer(bearer.clone())),
        )
        .route(
            "/api/posts/{id}",
            get(handlers::post::get_post)
                .merge(delete(handlers::post::delete_post).route_layer(bearer)),
        );

    // 特权调用（API Key）
    let webhook_routes = Router::new()
        .route("/api/webhooks/upgrade", post(handlers::webhook::upgrade))
        .route_layer(api_key);

    Router::new()
        .merge(public_routes)
        .merge(auth_routes)
        .merge(resource_routes)
        .merge(webhook_routes)
        .layer(RequestBodyLimitLayer::new(MAX_REQUEST_BODY_BYTES))
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .layer(axum::middleware::from_fn(crate::middleware::request_tracking_middleware))
        .with_state(state)
}
