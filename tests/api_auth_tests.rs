//! 认证 API 集成测试

use axum::http::StatusCode;
use serde_json::json;

mod common;
use common::{bearer, TestApp, TEST_PASSWORD};

#[tokio::test]
async fn test_login_success() {
    let app = TestApp::new();
    let user_id = app.register("walt@breakingbad.com", TEST_PASSWORD).await;

    let json = app.login("walt@breakingbad.com", TEST_PASSWORD).await;

    assert_eq!(json["id"], user_id);
    assert_eq!(json["email"], "walt@breakingbad.com");
    assert_eq!(json["is_subscribed"], false);
    assert!(json["token"].is_string());
    assert_eq!(json["refresh_token"].as_str().unwrap().len(), 64);
    assert_eq!(json["expires_in"], 3600);
    assert!(json.get("password_hash").is_none());

    let identity = app
        .state
        .jwt_service
        .validate(json["token"].as_str().unwrap())
        .unwrap();
    assert_eq!(identity.user_id().to_string(), user_id);
}

#[tokio::test]
async fn test_login_failures_are_indistinguishable() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;

    let (wrong_status, wrong_body) = app
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "walt@breakingbad.com", "password": "WrongPassword" })),
        )
        .await;
    let (unknown_status, unknown_body) = app
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "jesse@breakingbad.com", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(wrong_status, StatusCode::UNAUTHORIZED);
    assert_eq!(unknown_status, StatusCode::UNAUTHORIZED);
    assert_eq!(wrong_body["error"]["code"], unknown_body["error"]["code"]);
    assert_eq!(wrong_body["error"]["message"], unknown_body["error"]["message"]);
}

#[tokio::test]
async fn test_register_duplicate_email_conflict() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;

    let (status, _) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "walt@breakingbad.com", "password": TEST_PASSWORD })),
        )
        .await;

    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_register_rejects_bad_input() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "not-an-email", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = app
        .send(
            "POST",
            "/api/users",
            None,
            Some(json!({ "email": "walt@breakingbad.com", "password": "short" })),
        )
        .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_refresh_is_repeatable_and_token_unchanged() {
    let app = TestApp::new();
    let user_id = app.register("walt@breakingbad.com", TEST_PASSWORD).await;
    let login = app.login("walt@breakingbad.com", TEST_PASSWORD).await;
    let refresh_token = login["refresh_token"].as_str().unwrap();

    for _ in 0..2 {
        let (status, body) = app
            .send("POST", "/api/refresh", Some(&bearer(refresh_token)), None)
            .await;
        assert_eq!(status, StatusCode::OK);

        let identity = app
            .state
            .jwt_service
            .validate(body["token"].as_str().unwrap())
            .unwrap();
        assert_eq!(identity.user_id().to_string(), user_id);
    }
}

#[tokio::test]
async fn test_revoke_then_refresh_fails() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;
    let login = app.login("walt@breakingbad.com", TEST_PASSWORD).await;
    let auth = bearer(login["refresh_token"].as_str().unwrap());

    let (status, body) = app.send("POST", "/api/revoke", Some(&auth), None).await;
    assert_eq!(status, StatusCode::NO_CONTENT);
    assert!(body.is_null());

    let (status, _) = app.send("POST", "/api/refresh", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 重复撤销也失败
    let (status, _) = app.send("POST", "/api/revoke", Some(&auth), None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 访问令牌不受影响（无状态，直到自然过期）
    let (status, _) = app
        .send(
            "POST",
            "/api/posts",
            Some(&bearer(login["token"].as_str().unwrap())),
            Some(json!({ "body": "still here" })),
        )
        .await;
    assert_eq!(status, StatusCode::CREATED);
}

#[tokio::test]
async fn test_refresh_rejects_unknown_and_missing_tokens() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;
    let login = app.login("walt@breakingbad.com", TEST_PASSWORD).await;

    let (status, _) = app.send("POST", "/api/refresh", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let (status, _) = app
        .send("POST", "/api/refresh", Some(&bearer("deadbeef")), None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    // 访问令牌不能当作刷新令牌使用
    let (status, _) = app
        .send(
            "POST",
            "/api/refresh",
            Some(&bearer(login["token"].as_str().unwrap())),
            None,
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_each_login_issues_distinct_refresh_token() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;

    let first = app.login("walt@breakingbad.com", TEST_PASSWORD).await;
    let second = app.login("walt@breakingbad.com", TEST_PASSWORD).await;

    assert_ne!(first["refresh_token"], second["refresh_token"]);
    assert_eq!(app.store.refresh_token_count(), 2);
}

#[tokio::test]
async fn test_update_own_credentials() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;
    let login = app.login("walt@breakingbad.com", TEST_PASSWORD).await;
    let auth = bearer(login["token"].as_str().unwrap());

    let (status, body) = app
        .send(
            "PUT",
            "/api/users",
            Some(&auth),
            Some(json!({ "email": "heisenberg@breakingbad.com", "password": "NewPassword99" })),
        )
        .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["email"], "heisenberg@breakingbad.com");

    app.login("heisenberg@breakingbad.com", "NewPassword99").await;

    let (status, _) = app
        .send(
            "POST",
            "/api/login",
            None,
            Some(json!({ "email": "walt@breakingbad.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_update_requires_bearer() {
    let app = TestApp::new();

    let (status, _) = app
        .send(
            "PUT",
            "/api/users",
            None,
            Some(json!({ "email": "a@example.com", "password": TEST_PASSWORD })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn test_expired_and_forged_access_tokens_rejected() {
    use jsonwebtoken::{encode, EncodingKey, Header};
    use post_service::auth::Claims;

    let app = TestApp::new();
    let user_id = app.register("walt@breakingbad.com", TEST_PASSWORD).await;
    let now = chrono::Utc::now().timestamp();

    let expired = encode(
        &Header::default(),
        &Claims {
            sub: user_id.clone(),
            iat: now - 7200,
            exp: now - 3600,
            iss: "post-service".to_string(),
        },
        &EncodingKey::from_secret(b"test-secret-key-for-testing-only-min-32-chars"),
    )
    .unwrap();

    let forged = encode(
        &Header::default(),
        &Claims {
            sub: user_id,
            iat: now,
            exp: now + 3600,
            iss: "post-service".to_string(),
        },
        &EncodingKey::from_secret(b"some-other-secret-that-is-long-enough!!"),
    )
    .unwrap();

    for token in [expired, forged, "garbage".to_string()] {
        let (status, body) = app
            .send(
                "POST",
                "/api/posts",
                Some(&bearer(&token)),
                Some(json!({ "body": "hello" })),
            )
            .await;
        assert_eq!(status, StatusCode::UNAUTHORIZED);
        assert_eq!(body["error"]["message"], "Authentication failed");
    }
}

#[tokio::test]
async fn test_malformed_json_uses_error_envelope() {
    let app = TestApp::new();

    let (status, json) = app.send_raw("/api/login", None, "{not json").await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], 400);
    assert!(json["error"]["message"].is_string());
}

#[tokio::test]
async fn test_missing_field_uses_error_envelope() {
    let app = TestApp::new();
    app.register("walt@breakingbad.com", TEST_PASSWORD).await;
    let login = app.login("walt@breakingbad.com", TEST_PASSWORD).await;
    let auth = bearer(login["token"].as_str().unwrap());

    let (status, json) = app
        .send_raw("/api/posts", Some(&auth), r#"{"text": "no body field"}"#)
        .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["error"]["code"], 400);
    assert!(json["error"]["message"].as_str().unwrap().contains("body"));
}
