//! HTTP-level integration tests for the `/auth` endpoints.
//!
//! Covers login, refresh-token rotation, logout, the caller's profile and
//! menus, password change and account lockout.

mod common;

use axum::http::StatusCode;
use common::{
    body_json, create_user, expect_status, get_auth, post_json, post_json_auth, put_json_auth,
    TEST_PASSWORD,
};
use pstats_core::roles::{ROLE_ADMIN, ROLE_BATTALION_OFFICER};
use pstats_core::scope::DataScope;
use pstats_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

/// Log in through the API and return the `data` of the envelope.
async fn login(app: axum::Router, username: &str, password: &str) -> serde_json::Value {
    let body = json!({ "username": username, "password": password });
    let response = post_json(app, "/api/auth/login", body).await;
    let json = expect_status(response, StatusCode::OK).await;
    json["data"].clone()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_success(pool: PgPool) {
    let user = create_user(&pool, "loginuser", ROLE_ADMIN, DataScope::default()).await;
    let app = common::build_test_app(pool);

    let data = login(app, "loginuser", TEST_PASSWORD).await;

    assert!(data["access_token"].is_string());
    assert!(data["refresh_token"].is_string());
    assert_eq!(data["expires_in"], 15 * 60);
    assert_eq!(data["user"]["id"], user.id);
    assert_eq!(data["user"]["username"], "loginuser");
    assert_eq!(data["user"]["roles"], json!(["admin"]));
    assert!(data["user"].get("password_hash").is_none());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_wrong_password(pool: PgPool) {
    create_user(&pool, "wrongpw", ROLE_ADMIN, DataScope::default()).await;
    let app = common::build_test_app(pool);

    let body = json!({ "username": "wrongpw", "password": "incorrect-1" });
    let response = post_json(app, "/api/auth/login", body).await;

    let json = expect_status(response, StatusCode::UNAUTHORIZED).await;
    assert_eq!(json["message"], "Invalid username or password");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_nonexistent_user(pool: PgPool) {
    let app = common::build_test_app(pool);

    let body = json!({ "username": "ghost", "password": "whatever1" });
    let response = post_json(app, "/api/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_inactive_user(pool: PgPool) {
    let user = create_user(&pool, "inactive", ROLE_ADMIN, DataScope::default()).await;
    UserRepo::set_active(&pool, user.id, false).await.unwrap();
    let app = common::build_test_app(pool);

    let body = json!({ "username": "inactive", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/auth/login", body).await;

    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_login_missing_field_is_bad_request(pool: PgPool) {
    let app = common::build_test_app(pool);

    let response = post_json(app, "/api/auth/login", json!({ "username": "someone" })).await;

    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_account_locks_after_repeated_failures(pool: PgPool) {
    create_user(&pool, "locked", ROLE_ADMIN, DataScope::default()).await;
    let app = common::build_test_app(pool);

    for _ in 0..5 {
        let body = json!({ "username": "locked", "password": "wrong-pass-1" });
        let response = post_json(app.clone(), "/api/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }

    // Even the right password is refused while the lock is active.
    let body = json!({ "username": "locked", "password": TEST_PASSWORD });
    let response = post_json(app, "/api/auth/login", body).await;
    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert!(json["message"].as_str().unwrap().contains("locked"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_expired_lock_allows_a_full_set_of_attempts(pool: PgPool) {
    let user = create_user(&pool, "relock", ROLE_ADMIN, DataScope::default()).await;
    let app = common::build_test_app(pool.clone());

    for _ in 0..5 {
        let body = json!({ "username": "relock", "password": "wrong-pass-1" });
        let response = post_json(app.clone(), "/api/auth/login", body).await;
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    }
    let stored = UserRepo::find_by_id(&pool, user.id).await.unwrap().unwrap();
    assert!(stored.locked_until.is_some());
    assert_eq!(stored.failed_login_count, 0);

    // Let the lock run out.
    sqlx::query("UPDATE users SET locked_until = NOW() - INTERVAL '1 minute' WHERE id = $1")
        .bind(user.id)
        .execute(&pool)
        .await
        .unwrap();

    let body = json!({ "username": "relock", "password": "wrong-pass-1" });
    let response = post_json(app.clone(), "/api/auth/login", body).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // One failure after expiry does not re-lock the account.
    login(app, "relock", TEST_PASSWORD).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_rotates_token(pool: PgPool) {
    create_user(&pool, "refresher", ROLE_ADMIN, DataScope::default()).await;
    let app = common::build_test_app(pool);

    let data = login(app.clone(), "refresher", TEST_PASSWORD).await;
    let refresh_token = data["refresh_token"].as_str().unwrap().to_string();

    let response = post_json(
        app.clone(),
        "/api/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_ne!(json["data"]["refresh_token"], refresh_token.as_str());

    // The old refresh token was revoked by the rotation.
    let response = post_json(
        app,
        "/api/auth/refresh",
        json!({ "refresh_token": refresh_token }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_logout_revokes_refresh_tokens(pool: PgPool) {
    create_user(&pool, "leaver", ROLE_ADMIN, DataScope::default()).await;
    let app = common::build_test_app(pool);

    let data = login(app.clone(), "leaver", TEST_PASSWORD).await;
    let access = data["access_token"].as_str().unwrap();
    let refresh = data["refresh_token"].as_str().unwrap();

    let response = post_json_auth(app.clone(), "/api/auth/logout", json!({}), access).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["status"], "success");
    assert!(json["data"].is_null());

    let response = post_json(app, "/api/auth/refresh", json!({ "refresh_token": refresh })).await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_me_returns_profile_with_permissions(pool: PgPool) {
    let user = create_user(&pool, "officer", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let token = common::token_for(&user, ROLE_BATTALION_OFFICER);
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/auth/me", &token).await;
    let json = expect_status(response, StatusCode::OK).await;

    assert_eq!(json["data"]["username"], "officer");
    let permissions: Vec<&str> = json["data"]["permissions"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p.as_str().unwrap())
        .collect();
    assert!(permissions.contains(&"STATISTICS_SUBMIT"));
    assert!(!permissions.contains(&"ADMIN_MANAGE"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_my_menus_follow_permissions(pool: PgPool) {
    let officer = create_user(&pool, "menus_officer", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let officer_token = common::token_for(&officer, ROLE_BATTALION_OFFICER);
    let (_admin, admin_token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app.clone(), "/api/auth/me/menus", &officer_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    let names: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|m| m["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Dashboard", "Statistics", "Reports", "Communications"]);

    let response = get_auth(app, "/api/auth/me/menus", &admin_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    let menus = json["data"].as_array().unwrap();
    assert_eq!(menus.len(), 7);
    let masters = menus.iter().find(|m| m["name"] == "Masters").unwrap();
    assert_eq!(masters["sub_menus"].as_array().unwrap().len(), 4);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_change_password(pool: PgPool) {
    let user = create_user(&pool, "changer", ROLE_ADMIN, DataScope::default()).await;
    let token = common::token_for(&user, ROLE_ADMIN);
    let app = common::build_test_app(pool);

    // Wrong current password.
    let response = put_json_auth(
        app.clone(),
        "/api/auth/me/password",
        json!({ "current_password": "nope-1234", "new_password": "Another-pass-9" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    // Too weak.
    let response = put_json_auth(
        app.clone(),
        "/api/auth/me/password",
        json!({ "current_password": TEST_PASSWORD, "new_password": "short" }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = put_json_auth(
        app.clone(),
        "/api/auth/me/password",
        json!({ "current_password": TEST_PASSWORD, "new_password": "Another-pass-9" }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "username": "changer", "password": TEST_PASSWORD }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let data = login(app, "changer", "Another-pass-9").await;
    assert!(data["access_token"].is_string());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_token_carries_scope_from_login(pool: PgPool) {
    let user = create_user(&pool, "scoped", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let app = common::build_test_app(pool);

    let data = login(app.clone(), "scoped", TEST_PASSWORD).await;
    let token = data["access_token"].as_str().unwrap();

    let claims =
        pstats_api::auth::jwt::validate_token(token, &common::test_config().jwt).unwrap();
    assert_eq!(claims.sub, user.id);
    assert_eq!(claims.roles, vec![ROLE_BATTALION_OFFICER.to_string()]);
    assert!(claims.scope.is_unrestricted());

    let response = get_auth(app, "/api/auth/me", token).await;
    let json = body_json(response).await;
    assert_eq!(json["data"]["roles"], json!([ROLE_BATTALION_OFFICER]));
}
