//! HTTP-level integration tests for `/performance-statistics`.

mod common;

use axum::http::StatusCode;
use chrono::{Duration, Utc};
use common::{create_user, delete_auth, expect_status, get_auth, post_json_auth, put_json_auth, token_for};
use pstats_core::roles::{ROLE_BATTALION_OFFICER, ROLE_DISTRICT_OFFICER};
use pstats_db::repositories::UserRepo;
use serde_json::json;
use sqlx::PgPool;

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_inserts_then_overwrites(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "count").await;
    let officer = create_user(&pool, "bn_officer", ROLE_BATTALION_OFFICER, geo.battalion_scope()).await;
    let token = token_for(&officer, ROLE_BATTALION_OFFICER);
    let app = common::build_test_app(pool);

    let body = json!({
        "battalion_id": geo.battalion_id,
        "question_id": question_id,
        "reporting_date": "2026-03-31",
        "value": 12,
        "remarks": "March drills"
    });
    let response = post_json_auth(app.clone(), "/api/performance-statistics", body, &token).await;
    let json = expect_status(response, StatusCode::CREATED).await;
    assert_eq!(json["message"], "Performance statistic recorded successfully");
    assert_eq!(json["data"]["district_id"], geo.district_id);
    assert_eq!(json["data"]["state_id"], geo.state_id);
    assert_eq!(json["data"]["submitted_by"], officer.id);
    let id = common::data_id(&json);

    let body = json!({
        "battalion_id": geo.battalion_id,
        "question_id": question_id,
        "reporting_date": "2026-03-31",
        "value": 15
    });
    let response = post_json_auth(app.clone(), "/api/performance-statistics", body, &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(common::data_id(&json), id);
    assert_eq!(json["data"]["value"], 15.0);

    let response = get_auth(app, "/api/performance-statistics", &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_rejects_value_outside_question_type(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "percentage").await;
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.battalion_id,
            "question_id": question_id,
            "reporting_date": "2026-03-31",
            "value": 140.5
        }),
        &token,
    )
    .await;

    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["code"], "VALIDATION_ERROR");
    assert_eq!(
        json["message"],
        format!("Question {question_id}: Percentage values must be between 0 and 100")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_outside_scope_is_forbidden(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "count").await;
    let officer = create_user(&pool, "dist_officer", ROLE_DISTRICT_OFFICER, geo.district_scope()).await;
    let token = token_for(&officer, ROLE_DISTRICT_OFFICER);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app,
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.other_battalion_id,
            "question_id": question_id,
            "reporting_date": "2026-03-31",
            "value": 3
        }),
        &token,
    )
    .await;

    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(
        json["message"],
        format!("Battalion {} is outside your data scope", geo.other_battalion_id)
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_submit_rejects_future_date_and_unknown_battalion(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "count").await;
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);
    let tomorrow = (Utc::now().date_naive() + Duration::days(1)).to_string();

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.battalion_id,
            "question_id": question_id,
            "reporting_date": tomorrow,
            "value": 1
        }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["message"], "reporting_date cannot be in the future");

    let response = post_json_auth(
        app,
        "/api/performance-statistics",
        json!({
            "battalion_id": 999999,
            "question_id": question_id,
            "reporting_date": "2026-03-31",
            "value": 1
        }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(json["message"], "Battalion with id 999999 not found");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_submit_counts_inserts_and_updates(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let count_q = common::seed_question(&pool, "count").await;
    let pct_q = common::seed_question(&pool, "percentage").await;
    let (_admin, token) = common::admin(&pool).await;
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.battalion_id,
            "question_id": count_q,
            "reporting_date": "2026-04-30",
            "value": 4
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics/bulk",
        json!({
            "battalion_id": geo.battalion_id,
            "reporting_date": "2026-04-30",
            "entries": [
                { "question_id": count_q, "value": 6 },
                { "question_id": pct_q, "value": 87.5, "remarks": "Attendance" }
            ]
        }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["inserted"], 1);
    assert_eq!(json["data"]["updated"], 1);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);

    // One bad entry rejects the whole batch.
    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics/bulk",
        json!({
            "battalion_id": geo.battalion_id,
            "reporting_date": "2026-05-31",
            "entries": [
                { "question_id": count_q, "value": 2 },
                { "question_id": pct_q, "value": 101 }
            ]
        }),
        &token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics/bulk",
        json!({
            "battalion_id": geo.battalion_id,
            "reporting_date": "2026-05-31",
            "entries": [
                { "question_id": count_q, "value": 2 },
                { "question_id": count_q, "value": 3 }
            ]
        }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(
        json["message"],
        format!("Question {count_q} appears more than once in the batch")
    );

    let response = get_auth(
        app,
        "/api/performance-statistics?from_date=2026-05-01&to_date=2026-05-31",
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_and_summary_follow_caller_scope(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "count").await;
    let (_admin, admin_token) = common::admin(&pool).await;
    let officer = create_user(&pool, "dist_officer", ROLE_DISTRICT_OFFICER, geo.district_scope()).await;
    let officer_token = token_for(&officer, ROLE_DISTRICT_OFFICER);
    let app = common::build_test_app(pool);

    let mut ids = Vec::new();
    for (battalion_id, value) in [(geo.battalion_id, 10), (geo.other_battalion_id, 30)] {
        let response = post_json_auth(
            app.clone(),
            "/api/performance-statistics",
            json!({
                "battalion_id": battalion_id,
                "question_id": question_id,
                "reporting_date": "2026-02-28",
                "value": value
            }),
            &admin_token,
        )
        .await;
        let json = expect_status(response, StatusCode::CREATED).await;
        ids.push(common::data_id(&json));
    }

    let response = get_auth(app.clone(), "/api/performance-statistics", &admin_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 2);

    let response = get_auth(app.clone(), "/api/performance-statistics", &officer_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total"], 1);
    assert_eq!(json["data"]["items"][0]["battalion_id"], geo.battalion_id);

    let response = get_auth(
        app.clone(),
        &format!("/api/performance-statistics?district_id={}", geo.other_district_id),
        &officer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::FORBIDDEN);

    let response = get_auth(app.clone(), "/api/performance-statistics/statistics", &officer_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["total_records"], 1);
    assert_eq!(json["data"]["total_value"], 10.0);
    assert_eq!(json["data"]["last_reporting_date"], "2026-02-28");

    // Another district's row reads as missing.
    let response = get_auth(
        app.clone(),
        &format!("/api/performance-statistics/{}", ids[1]),
        &officer_token,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(
        app,
        "/api/performance-statistics?from_date=2026-03-01&to_date=2026-02-01",
        &officer_token,
    )
    .await;
    let json = expect_status(response, StatusCode::BAD_REQUEST).await;
    assert_eq!(json["message"], "from_date must not be after to_date");
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_update_and_delete(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "boolean").await;
    let officer = create_user(&pool, "bn_officer", ROLE_BATTALION_OFFICER, geo.battalion_scope()).await;
    let token = token_for(&officer, ROLE_BATTALION_OFFICER);
    let app = common::build_test_app(pool);

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.battalion_id,
            "question_id": question_id,
            "reporting_date": "2026-01-31",
            "value": 0
        }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::CREATED).await;
    let id = common::data_id(&json);
    let uri = format!("/api/performance-statistics/{id}");

    let response = put_json_auth(app.clone(), &uri, json!({ "value": 2 }), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let response = put_json_auth(
        app.clone(),
        &uri,
        json!({ "value": 1, "remarks": "Corrected" }),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["value"], 1.0);
    assert_eq!(json["data"]["remarks"], "Corrected");

    let response = delete_auth(app.clone(), &uri, &token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert!(json["data"].is_null());

    let response = get_auth(app, &uri, &token).await;
    let json = expect_status(response, StatusCode::NOT_FOUND).await;
    assert_eq!(
        json["message"],
        format!("Performance statistic with id {id} not found")
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moved_battalion_takes_its_statistics_along(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, "count").await;
    let (_admin, admin_token) = common::admin(&pool).await;
    let old_officer =
        create_user(&pool, "old_district", ROLE_DISTRICT_OFFICER, geo.district_scope()).await;
    let new_officer =
        create_user(&pool, "new_district", ROLE_DISTRICT_OFFICER, geo.other_district_scope()).await;
    let bn_officer =
        create_user(&pool, "bn_officer", ROLE_BATTALION_OFFICER, geo.battalion_scope()).await;
    let app = common::build_test_app(pool.clone());

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.battalion_id,
            "question_id": question_id,
            "reporting_date": "2026-03-31",
            "value": 7
        }),
        &admin_token,
    )
    .await;
    let id = common::data_id(&expect_status(response, StatusCode::CREATED).await);

    let response = put_json_auth(
        app.clone(),
        &format!("/api/battalions/{}", geo.battalion_id),
        json!({ "range_id": geo.other_range_id }),
        &admin_token,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    let uri = format!("/api/performance-statistics/{id}");
    let response = get_auth(app.clone(), &uri, &token_for(&old_officer, ROLE_DISTRICT_OFFICER)).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = get_auth(app, &uri, &token_for(&new_officer, ROLE_DISTRICT_OFFICER)).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["district_id"], geo.other_district_id);
    assert_eq!(json["data"]["range_id"], geo.other_range_id);

    let stored = UserRepo::find_by_id(&pool, bn_officer.id).await.unwrap().unwrap();
    assert_eq!(stored.district_id, Some(geo.other_district_id));
    assert_eq!(stored.range_id, Some(geo.other_range_id));
    assert_eq!(stored.battalion_id, Some(geo.battalion_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_rejects_finer_filter_outside_scope(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let officer =
        create_user(&pool, "dist_officer", ROLE_DISTRICT_OFFICER, geo.district_scope()).await;
    let token = token_for(&officer, ROLE_DISTRICT_OFFICER);
    let app = common::build_test_app(pool);

    let response = get_auth(
        app.clone(),
        &format!("/api/performance-statistics?battalion_id={}", geo.other_battalion_id),
        &token,
    )
    .await;
    let json = expect_status(response, StatusCode::FORBIDDEN).await;
    assert_eq!(
        json["message"],
        format!("battalion {} is outside your data scope", geo.other_battalion_id)
    );

    let response = get_auth(
        app,
        &format!("/api/performance-statistics?range_id={}", geo.range_id),
        &token,
    )
    .await;
    expect_status(response, StatusCode::OK).await;
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_refresh_after_move_picks_up_new_scope(pool: PgPool) {
    let geo = common::seed_geography(&pool).await;
    let question_id = common::seed_question(&pool, pstats_core::questions::TYPE_COUNT).await;
    let (_admin, admin_token) = common::admin(&pool).await;
    create_user(&pool, "bn_mover", ROLE_BATTALION_OFFICER, geo.battalion_scope()).await;
    let app = common::build_test_app(pool);

    let response = common::post_json(
        app.clone(),
        "/api/auth/login",
        json!({ "username": "bn_mover", "password": common::TEST_PASSWORD }),
    )
    .await;
    let session = expect_status(response, StatusCode::OK).await["data"].clone();
    let old_token = session["access_token"].as_str().unwrap().to_string();

    let response = post_json_auth(
        app.clone(),
        "/api/performance-statistics",
        json!({
            "battalion_id": geo.battalion_id,
            "question_id": question_id,
            "reporting_date": "2026-03-31",
            "value": 3
        }),
        &old_token,
    )
    .await;
    let id = common::data_id(&expect_status(response, StatusCode::CREATED).await);
    let uri = format!("/api/performance-statistics/{id}");

    let response = put_json_auth(
        app.clone(),
        &format!("/api/battalions/{}", geo.battalion_id),
        json!({ "range_id": geo.other_range_id }),
        &admin_token,
    )
    .await;
    expect_status(response, StatusCode::OK).await;

    // Access tokens carry the scope they were issued with.
    let response = get_auth(app.clone(), &uri, &old_token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = common::post_json(
        app.clone(),
        "/api/auth/refresh",
        json!({ "refresh_token": session["refresh_token"] }),
    )
    .await;
    let refreshed = expect_status(response, StatusCode::OK).await;
    let new_token = refreshed["data"]["access_token"].as_str().unwrap();

    let response = get_auth(app, &uri, new_token).await;
    let json = expect_status(response, StatusCode::OK).await;
    assert_eq!(json["data"]["range_id"], geo.other_range_id);
}
