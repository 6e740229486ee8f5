//! 错误映射测试

use axum::{http::StatusCode, response::IntoResponse};
use http_body_util::BodyExt;
use post_service::{
    error::{AppError, AuthError},
    repository::RepoError,
};

mod common;

#[test]
fn test_authentication_failures_collapse_to_unauthorized() {
    for err in [
        AuthError::Malformed,
        AuthError::InvalidSignature,
        AuthError::Expired,
        AuthError::Revoked,
        AuthError::NotFound,
        AuthError::Unauthorized,
    ] {
        assert!(err.is_authentication_failure());
        assert!(matches!(AppError::from(err), AppError::Unauthorized));
    }
}

#[test]
fn test_forbidden_and_internal_keep_their_meaning() {
    assert!(matches!(AppError::from(AuthError::Forbidden), AppError::Forbidden));
    assert_eq!(AppError::from(AuthError::Forbidden).code(), 403);

    let internal = AppError::from(AuthError::Internal("pool timed out".to_string()));
    assert_eq!(internal.code(), 500);
    assert_eq!(internal.user_message(), "Internal server error");
}

#[test]
fn test_repo_conflict_maps_to_409() {
    let err = AppError::from(RepoError::Conflict("refresh_tokens_pkey".to_string()));
    assert_eq!(err.status_code(), StatusCode::CONFLICT);
    assert_eq!(err.user_message(), "Resource already exists");
    assert!(!err.user_message().contains("pkey"));
}

#[tokio::test]
async fn test_error_response_body_hides_details() {
    let response = AppError::Internal("stack trace with secrets".to_string()).into_response();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();

    assert_eq!(json["error"]["code"], 500);
    assert_eq!(json["error"]["message"], "Internal server error");
    // 不在请求追踪中间件内，没有可对应的 request_id
    assert!(json["error"].get("request_id").is_none());
    assert!(!String::from_utf8_lossy(&bytes).contains("secrets"));
}

#[tokio::test]
async fn test_error_body_request_id_matches_header() {
    use axum::{body::Body, http::Request};
    use tower::ServiceExt;

    let app = common::TestApp::new();
    let response = app
        .router()
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/api/refresh")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    let header = response.headers()["x-request-id"].to_str().unwrap().to_string();

    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json: serde_json::Value = serde_json::from_slice(&bytes).unwrap();
    assert_eq!(json["error"]["request_id"], header);
}
