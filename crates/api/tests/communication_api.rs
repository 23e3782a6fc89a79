//! HTTP-level integration tests for `/communications`.

mod common;

use axum::http::StatusCode;
use common::{
    create_user, delete_auth, expect_status, get_auth, post_json_auth, put_auth, token_for,
};
use pstats_core::roles::{ROLE_BATTALION_OFFICER, ROLE_DISTRICT_OFFICER};
use pstats_core::scope::DataScope;
use serde_json::json;
use sqlx::PgPool;

async fn unread_count(app: axum::Router, token: &str) -> i64 {
    let response = get_auth(app, "/api/communications/unread-count", token).await;
    let json = expect_status(response, StatusCode::OK).await;
    json["data"]["unread_count"].as_i64().unwrap()
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_direct_message_flow(pool: PgPool) {
    let (_admin, admin_token) = common::admin(&pool).await;
    let alice = create_user(&pool, "alice", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let bob = create_user(&pool, "bob", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let alice_token = token_for(&alice, ROLE_BATTALION_OFFICER);
    let bob_token = token_for(&bob, ROLE_BATTALION_OFFICER);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/communications",
        json!({
            "recipient_ids": [alice.id, bob.id, alice.id],
            "subject": "Monthly returns",
            "body": "Please submit the monthly returns by Friday.",
            "priority": "high"
        }),
        &admin_token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["kind"], "direct");
    assert_eq!(json["data"]["priority"], "high");
    assert_eq!(json["data"]["recipients"].as_array().unwrap().len(), 2);
    let id = common::data_id(&json);

    assert_eq!(unread_count(app.clone(), &alice_token).await, 1);

    let response = get_auth(app.clone(), "/api/communications?box=inbox", &alice_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["subject"], "Monthly returns");
    assert_eq!(json["data"]["items"][0]["is_read"], false);
    assert_eq!(json["data"]["items"][0]["recipient_count"], 2);

    let response = put_auth(app.clone(), &format!("/api/communications/{id}/read"), &alice_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = put_auth(app.clone(), &format!("/api/communications/{id}/read"), &bob_token).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(unread_count(app.clone(), &alice_token).await, 0);
    assert_eq!(unread_count(app.clone(), &bob_token).await, 0);

    // A reply marks the thread unread for the other recipients only.
    let response = post_json_auth(
        app.clone(),
        &format!("/api/communications/{id}/messages"),
        json!({ "body": "Submitted for Pune Battalion 1." }),
        &alice_token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["sender_name"], "alice user");
    assert_eq!(unread_count(app.clone(), &alice_token).await, 0);
    assert_eq!(unread_count(app.clone(), &bob_token).await, 1);

    let response = get_auth(
        app.clone(),
        &format!("/api/communications/{id}/messages"),
        &bob_token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);

    let response = get_auth(app, "/api/communications?box=sent", &admin_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["message_count"], 1);
    assert!(json["data"]["items"][0]["is_read"].is_null());
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_direct_message_recipient_rules(pool: PgPool) {
    let (admin, admin_token) = common::admin(&pool).await;
    let other = create_user(&pool, "other", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/communications",
        json!({ "recipient_ids": [admin.id], "subject": "Note", "body": "To myself" }),
        &admin_token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = post_json_auth(
        app.clone(),
        "/api/communications",
        json!({ "recipient_ids": [987654], "subject": "Note", "body": "Anyone there?" }),
        &admin_token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(
        json["message"],
        "One or more recipients do not exist or are inactive"
    );

    let response = post_json_auth(
        app.clone(),
        "/api/communications",
        json!({ "recipient_ids": [other.id], "subject": "s".repeat(201), "body": "Too long" }),
        &admin_token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");

    let response = post_json_auth(
        app,
        "/api/communications",
        json!({ "recipient_ids": [other.id], "subject": "Note", "body": "x", "priority": "urgent" }),
        &admin_token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert!(json["message"].as_str().unwrap().contains("low, normal, high"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_broadcast_is_limited_to_sender_scope(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let sender = create_user(&pool, "dist_officer", ROLE_DISTRICT_OFFICER, geo.district_scope()).await;
    let local = create_user(&pool, "local", ROLE_BATTALION_OFFICER, geo.battalion_scope()).await;
    let remote_scope = DataScope {
        state_id: Some(geo.state_id),
        district_id: Some(geo.other_district_id),
        ..Default::default()
    };
    let remote = create_user(&pool, "remote", ROLE_DISTRICT_OFFICER, remote_scope).await;
    let unscoped = create_user(&pool, "unscoped", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let sender_token = token_for(&sender, ROLE_DISTRICT_OFFICER);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/communications/broadcast",
        json!({ "subject": "Drill", "body": "Fire drill on Monday." }),
        &sender_token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["kind"], "broadcast");
    assert_eq!(json["data"]["recipient_count"], 1);

    assert_eq!(unread_count(app.clone(), &token_for(&local, ROLE_BATTALION_OFFICER)).await, 1);
    assert_eq!(unread_count(app.clone(), &token_for(&remote, ROLE_DISTRICT_OFFICER)).await, 0);

    let response = post_json_auth(
        app.clone(),
        "/api/communications/broadcast",
        json!({
            "subject": "Drill",
            "body": "Fire drill on Monday.",
            "district_id": geo.other_district_id
        }),
        &sender_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = post_json_auth(
        app,
        "/api/communications/broadcast",
        json!({ "subject": "Hello", "body": "Everyone?" }),
        &token_for(&unscoped, ROLE_BATTALION_OFFICER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_admin_broadcast_reaches_everyone_else(pool: PgPool) {
    let (_admin, admin_token) = common::admin(&pool).await;
    for name in ["one", "two", "three"] {
        create_user(&pool, name, ROLE_BATTALION_OFFICER, DataScope::default()).await;
    }
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/communications/broadcast",
        json!({ "subject": "Maintenance", "body": "Downtime tonight.", "priority": "low" }),
        &admin_token,
    )
    .await;

    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["data"]["recipient_count"], 3);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_only_sender_or_admin_can_delete(pool: PgPool) {
    let (_admin, admin_token) = common::admin(&pool).await;
    let sender = create_user(&pool, "sender", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let reader = create_user(&pool, "reader", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let outsider = create_user(&pool, "outsider", ROLE_BATTALION_OFFICER, DataScope::default()).await;
    let sender_token = token_for(&sender, ROLE_BATTALION_OFFICER);
    let reader_token = token_for(&reader, ROLE_BATTALION_OFFICER);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/communications",
        json!({ "recipient_ids": [reader.id], "subject": "Leave", "body": "On leave next week." }),
        &sender_token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    let id = common::data_id(&json);

    let response = get_auth(
        app.clone(),
        &format!("/api/communications/{id}"),
        &token_for(&outsider, ROLE_BATTALION_OFFICER),
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app.clone(), &format!("/api/communications/{id}"), &admin_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = delete_auth(app.clone(), &format!("/api/communications/{id}"), &reader_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = delete_auth(app.clone(), &format!("/api/communications/{id}"), &sender_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(app.clone(), &format!("/api/communications/{id}"), &reader_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(unread_count(app, &reader_token).await, 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_unknown_mailbox_is_rejected(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = get_auth(app, "/api/communications?box=archive", &token).await;

    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}
