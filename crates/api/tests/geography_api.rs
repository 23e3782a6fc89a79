//! HTTP-level integration tests for the geography resources.
//!
//! Exercises the shared CRUD surface (list, create, statistics, get, update,
//! status, delete) through `/states` and `/districts`, plus the role checks,
//! constraint mapping and guarded deletes every resource relies on.

mod common;

use axum::http::StatusCode;
use common::{
    data_id, delete_auth, expect_status, get_auth, patch_json_auth, post_json_auth,
    put_json_auth,
};
use pstats_core::roles::ROLE_STATE_OFFICER;
use pstats_core::scope::DataScope;
use serde_json::json;
use sqlx::PgPool;

async fn create_state(app: axum::Router, token: &str, name: &str, code: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/states",
        json!({ "name": name, "code": code }),
        token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    data_id(&json)
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_state_crud_round(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/states",
        json!({ "name": "  Kerala ", "code": "KL" }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["status"], "success");
    assert_eq!(json["message"], "State created successfully");
    assert_eq!(json["data"]["name"], "Kerala");
    assert_eq!(json["data"]["active"], true);
    let id = data_id(&json);

    let response = get_auth(app.clone(), &format!("/api/states/{id}"), &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["code"], "KL");

    let response = put_json_auth(
        app.clone(),
        &format!("/api/states/{id}"),
        json!({ "name": "Kerala State" }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["name"], "Kerala State");
    assert_eq!(json["data"]["code"], "KL");

    let response = patch_json_auth(
        app.clone(),
        &format!("/api/states/{id}/status"),
        json!({ "active": false }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["active"], false);

    let response = get_auth(app.clone(), "/api/states/statistics", &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["active"], 0);
    assert_eq!(json["data"]["inactive"], 1);

    let response = delete_auth(app.clone(), &format!("/api/states/{id}"), &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert!(json["data"].is_null());

    let response = get_auth(app, &format!("/api/states/{id}"), &token).await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["message"], format!("State with id {id} not found"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_filters_and_paginates(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    for (name, code) in [("Assam", "AS"), ("Bihar", "BR"), ("Goa", "GA"), ("Gujarat", "GJ")] {
        create_state(app.clone(), &token, name, code).await;
    }

    let response = get_auth(app.clone(), "/api/states?limit=2&offset=1", &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 4);
    assert_eq!(json["data"]["limit"], 2);
    assert_eq!(json["data"]["offset"], 1);
    let names: Vec<&str> = json["data"]["items"]
        .as_array()
        .unwrap()
        .iter()
        .map(|s| s["name"].as_str().unwrap())
        .collect();
    assert_eq!(names, vec!["Bihar", "Goa"]);

    let response = get_auth(app, "/api/states?search=gu", &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["code"], "GJ");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_duplicate_code_is_conflict(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);
    create_state(app.clone(), &token, "Punjab", "PB").await;

    let response = post_json_auth(
        app,
        "/api/states",
        json!({ "name": "Punjab North", "code": "PB" }),
        &token,
    )
    .await;

    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(json["code"], "CONFLICT");
    assert!(json["message"].as_str().unwrap().contains("uq_states_code"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_invalid_code_is_validation_error(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/states",
        json!({ "name": "Sikkim", "code": "sk!" }),
        &token,
    )
    .await;

    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_district_with_missing_state_is_conflict(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/districts",
        json!({ "state_id": 9999, "name": "Nowhere", "code": "NW" }),
        &token,
    )
    .await;

    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert!(json["message"]
        .as_str()
        .unwrap()
        .contains("fk_districts_state_id"));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_delete_state_with_districts_is_refused(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);
    let state_id = create_state(app.clone(), &token, "Odisha", "OD").await;

    let response = post_json_auth(
        app.clone(),
        "/api/districts",
        json!({ "state_id": state_id, "name": "Cuttack", "code": "OD-CTC" }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    let district_id = data_id(&json);

    let response = get_auth(
        app.clone(),
        &format!("/api/districts?state_id={state_id}"),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);

    let response = delete_auth(app.clone(), &format!("/api/states/{state_id}"), &token).await;
    let json = expect_status(response, StatusCode::CONFLICT).await;
    assert_eq!(
        json["message"],
        format!("State {state_id} cannot be deleted: 1 district record(s) still reference it")
    );

    let response = delete_auth(app.clone(), &format!("/api/districts/{district_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let response = delete_auth(app, &format!("/api/states/{state_id}"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_non_admin_can_read_but_not_write(pool: PgPool) {
    let (_admin, admin_token) = common::admin(&pool).await;
    let officer =
        common::create_user(&pool, "reader", ROLE_STATE_OFFICER, DataScope::default()).await;
    let officer_token = common::token_for(&officer, ROLE_STATE_OFFICER);
    let app = common::build_test_app(pool);
    let id = create_state(app.clone(), &admin_token, "Tripura", "TR").await;

    let response = get_auth(app.clone(), &format!("/api/states/{id}"), &officer_token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/states/{id}"),
        json!({ "name": "Renamed" }),
        &officer_token,
    )
    .await;
    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(json["message"], "Admin role required");

    let response = delete_auth(app, &format!("/api/states/{id}"), &officer_token).await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_malformed_json_is_bad_request(pool: PgPool) {
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(app, "/api/states", json!({ "name": 12 }), &token).await;

    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "BAD_REQUEST");
}
