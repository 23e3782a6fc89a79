//! Shared helpers for the HTTP integration tests.
//!
//! Each test binary pulls in only a subset of these helpers.
#![allow(dead_code)]

use std::sync::Arc;

use axum::body::Body;
use axum::http::{Method, Request, Response, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use sqlx::PgPool;
use tower::ServiceExt;

use pstats_api::auth::jwt::{generate_access_token, JwtConfig};
use pstats_api::auth::password::hash_password;
use pstats_api::config::ServerConfig;
use pstats_api::router::build_app_router;
use pstats_api::state::AppState;
use pstats_core::roles::ROLE_ADMIN;
use pstats_core::scope::DataScope;
use pstats_db::models::user::{CreateUser, User};
use pstats_db::repositories::{RoleRepo, UserRepo};

/// Password given to every user created through [`create_user`].
pub const TEST_PASSWORD: &str = "Passw0rd-123";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        database_url: String::new(),
        db_max_connections: 5,
        jwt: JwtConfig {
            secret: "integration-test-secret".to_string(),
            access_token_expiry_mins: 15,
            refresh_token_expiry_days: 7,
        },
    }
}

/// Build the full application router, with the production middleware stack,
/// on top of the given pool.
pub fn build_test_app(pool: PgPool) -> Router {
    let config = test_config();
    let state = AppState {
        pool,
        config: Arc::new(config.clone()),
    };
    build_app_router(state, &config)
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

async fn send(
    app: Router,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<serde_json::Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&json).unwrap()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.oneshot(request).await.unwrap()
}

pub async fn get(app: Router, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_json(app: Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    send(app, Method::POST, uri, None, Some(body)).await
}

pub async fn post_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn patch_json_auth(
    app: Router,
    uri: &str,
    body: serde_json::Value,
    token: &str,
) -> Response<Body> {
    send(app, Method::PATCH, uri, Some(token), Some(body)).await
}

pub async fn put_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), None).await
}

pub async fn delete_auth(app: Router, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::DELETE, uri, Some(token), None).await
}

/// Collect a response body and parse it as JSON.
pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

/// Assert the status code and return the parsed body.
pub async fn expect_status(response: Response<Body>, status: StatusCode) -> serde_json::Value {
    let actual = response.status();
    let json = body_json(response).await;
    assert_eq!(actual, status, "unexpected status, body: {json}");
    json
}

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

/// Insert an active user holding the named role, with [`TEST_PASSWORD`].
pub async fn create_user(pool: &PgPool, username: &str, role: &str, scope: DataScope) -> User {
    let input = CreateUser {
        username: username.to_string(),
        email: format!("{username}@example.com"),
        password_hash: hash_password(TEST_PASSWORD).unwrap(),
        full_name: format!("{username} user"),
        phone: None,
        scope,
        active: None,
    };
    let role = RoleRepo::find_by_name(pool, role).await.unwrap().unwrap();
    UserRepo::create(pool, &input, &[role.id]).await.unwrap()
}

/// Mint an access token without going through `/auth/login`.
pub fn token_for(user: &User, role: &str) -> String {
    generate_access_token(user.id, &[role.to_string()], &user.scope(), &test_config().jwt).unwrap()
}

/// Create an admin user and return it with a valid access token.
pub async fn admin(pool: &PgPool) -> (User, String) {
    let user = create_user(pool, "admin_user", ROLE_ADMIN, DataScope::default()).await;
    let token = token_for(&user, ROLE_ADMIN);
    (user, token)
}

/// The `id` of the created record in a success envelope.
pub fn data_id(json: &serde_json::Value) -> i64 {
    json["data"]["id"].as_i64().expect("data.id should be an integer")
}

/// Two disjoint branches of the geography tree inside one state.
pub struct Geo {
    pub state_id: i64,
    pub district_id: i64,
    pub range_id: i64,
    pub battalion_id: i64,
    pub other_district_id: i64,
    pub other_range_id: i64,
    pub other_battalion_id: i64,
}

impl Geo {
    pub fn district_scope(&self) -> DataScope {
        DataScope {
            state_id: Some(self.state_id),
            district_id: Some(self.district_id),
            ..Default::default()
        }
    }

    pub fn other_district_scope(&self) -> DataScope {
        DataScope {
            state_id: Some(self.state_id),
            district_id: Some(self.other_district_id),
            ..Default::default()
        }
    }

    pub fn battalion_scope(&self) -> DataScope {
        DataScope {
            state_id: Some(self.state_id),
            district_id: Some(self.district_id),
            range_id: Some(self.range_id),
            battalion_id: Some(self.battalion_id),
        }
    }
}

/// Insert state -> 2 districts -> range -> battalion chains.
pub async fn seed_geography(pool: &PgPool) -> Geo {
    use pstats_db::models::geography::{
        CreateBattalion, CreateDistrict, CreateRange, CreateState,
    };
    use pstats_db::repositories::{BattalionRepo, DistrictRepo, RangeRepo, StateRepo};

    let state = StateRepo::create(
        pool,
        &CreateState {
            name: "Maharashtra".into(),
            code: "MH".into(),
            active: None,
        },
    )
    .await
    .unwrap();

    let mut branches = Vec::new();
    for (district, code) in [("Pune", "MH-PUN"), ("Nagpur", "MH-NAG")] {
        let d = DistrictRepo::create(
            pool,
            &CreateDistrict {
                state_id: state.id,
                name: district.into(),
                code: code.into(),
                active: None,
            },
        )
        .await
        .unwrap();
        let r = RangeRepo::create(
            pool,
            &CreateRange {
                district_id: d.id,
                name: format!("{district} Range"),
                code: format!("{code}-R1"),
                active: None,
            },
        )
        .await
        .unwrap();
        let b = BattalionRepo::create(
            pool,
            &CreateBattalion {
                range_id: r.id,
                name: format!("{district} Battalion 1"),
                code: format!("{code}-B1"),
                active: None,
            },
        )
        .await
        .unwrap();
        branches.push((d.id, r.id, b.id));
    }

    Geo {
        state_id: state.id,
        district_id: branches[0].0,
        range_id: branches[0].1,
        battalion_id: branches[0].2,
        other_district_id: branches[1].0,
        other_range_id: branches[1].1,
        other_battalion_id: branches[1].2,
    }
}

/// Insert a module -> topic -> question chain and return the question id.
///
/// Call at most once per question type within a test.
pub async fn seed_question(pool: &PgPool, question_type: &str) -> i64 {
    use pstats_db::models::content::{CreateModule, CreateQuestion, CreateTopic};
    use pstats_db::repositories::{ModuleRepo, QuestionRepo, TopicRepo};

    let module = ModuleRepo::create(
        pool,
        &CreateModule {
            name: format!("Training ({question_type})"),
            description: None,
            sort_order: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let topic = TopicRepo::create(
        pool,
        &CreateTopic {
            module_id: module.id,
            name: format!("Drills ({question_type})"),
            description: None,
            sort_order: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let question = QuestionRepo::create(
        pool,
        &CreateQuestion {
            topic_id: topic.id,
            sub_topic_id: None,
            question_text: format!("How many drills were held? ({question_type})"),
            question_type: Some(question_type.to_string()),
            sort_order: None,
            is_mandatory: None,
            active: None,
        },
    )
    .await
    .unwrap();
    question.id
}
