//! Integration tests for statistic upserts, report queries and
//! communication threads.

use chrono::NaiveDate;
use sqlx::PgPool;
use pstats_core::communication::{KIND_BROADCAST, KIND_DIRECT};
use pstats_core::report::{ReportFilter, TrendInterval};
use pstats_core::scope::{GeoFilter, GeoLevel, Location};
use pstats_db::models::communication::{MailboxQuery, NewCommunication};
use pstats_db::models::content::{
    CreateModule, CreateQuestion, CreateSubTopic, CreateTopic, QuestionContext, UpdateSubTopic,
    UpdateTopic,
};
use pstats_db::models::geography::{
    CreateBattalion, CreateDistrict, CreateRange, CreateState, UpdateRange,
};
use pstats_db::models::performance_statistic::NewStatistic;
use pstats_db::models::user::CreateUser;
use pstats_db::repositories::{
    BattalionRepo, CommunicationRepo, DistrictRepo, ModuleRepo, PerformanceStatisticRepo,
    QuestionRepo, RangeRepo, ReportRepo, StateRepo, SubTopicRepo, TopicRepo, UserRepo,
};

// ---------------------------------------------------------------------------
// Fixtures
// ---------------------------------------------------------------------------

struct Fixture {
    locations: Vec<Location>,
    question: QuestionContext,
    user_id: i64,
}

async fn seed(pool: &PgPool) -> Fixture {
    let state = StateRepo::create(
        pool,
        &CreateState {
            name: "Rajasthan".to_string(),
            code: "RJ".to_string(),
            active: None,
        },
    )
    .await
    .unwrap();
    let district = DistrictRepo::create(
        pool,
        &CreateDistrict {
            state_id: state.id,
            name: "Jaipur".to_string(),
            code: "RJ-JP".to_string(),
            active: None,
        },
    )
    .await
    .unwrap();
    let range = RangeRepo::create(
        pool,
        &CreateRange {
            district_id: district.id,
            name: "Jaipur Range".to_string(),
            code: "RJ-JP-R".to_string(),
            active: None,
        },
    )
    .await
    .unwrap();

    let mut locations = Vec::new();
    for (name, code) in [("Alpha", "RJ-B1"), ("Bravo", "RJ-B2")] {
        let battalion = BattalionRepo::create(
            pool,
            &CreateBattalion {
                range_id: range.id,
                name: name.to_string(),
                code: code.to_string(),
                active: None,
            },
        )
        .await
        .unwrap();
        locations.push(
            BattalionRepo::find_location(pool, battalion.id)
                .await
                .unwrap()
                .unwrap(),
        );
    }

    let module = ModuleRepo::create(
        pool,
        &CreateModule {
            name: "Patrol".to_string(),
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
            name: "Night patrol".to_string(),
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
            question_text: "Patrols conducted".to_string(),
            question_type: Some("count".to_string()),
            sort_order: None,
            is_mandatory: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let question = QuestionRepo::find_context(pool, question.id)
        .await
        .unwrap()
        .unwrap();

    let user = new_user(pool, "officer", GeoFilter::default()).await;

    Fixture {
        locations,
        question,
        user_id: user,
    }
}

async fn new_user(pool: &PgPool, username: &str, scope: GeoFilter) -> i64 {
    UserRepo::create(
        pool,
        &CreateUser {
            username: username.to_string(),
            email: format!("{username}@example.com"),
            password_hash: "not-a-real-hash".to_string(),
            full_name: format!("{username} user"),
            phone: None,
            scope,
            active: None,
        },
        &[],
    )
    .await
    .unwrap()
    .id
}

fn date(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn statistic(fx: &Fixture, battalion: usize, day: &str, value: f64) -> NewStatistic {
    NewStatistic {
        location: fx.locations[battalion],
        question: fx.question.clone(),
        reporting_date: date(day),
        value,
        remarks: None,
        submitted_by: fx.user_id,
    }
}

// ---------------------------------------------------------------------------
// Statistics
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_upsert_inserts_then_overwrites(pool: PgPool) {
    let fx = seed(&pool).await;

    let first = PerformanceStatisticRepo::upsert(&pool, &statistic(&fx, 0, "2026-01-05", 4.0))
        .await
        .unwrap();
    assert!(first.inserted);
    assert_eq!(first.statistic.state_id, fx.locations[0].state_id);
    assert_eq!(first.statistic.module_id, fx.question.module_id);

    let second = PerformanceStatisticRepo::upsert(&pool, &statistic(&fx, 0, "2026-01-05", 9.0))
        .await
        .unwrap();
    assert!(!second.inserted);
    assert_eq!(second.statistic.id, first.statistic.id);
    assert_eq!(second.statistic.value, 9.0);

    let all = ReportFilter::default();
    assert_eq!(PerformanceStatisticRepo::count(&pool, &all).await.unwrap(), 1);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_bulk_upsert_rolls_back_on_failure(pool: PgPool) {
    let fx = seed(&pool).await;

    let mut bad = statistic(&fx, 1, "2026-01-06", 1.0);
    bad.submitted_by = 999_999;
    let batch = vec![statistic(&fx, 0, "2026-01-06", 1.0), bad];

    assert!(PerformanceStatisticRepo::bulk_upsert(&pool, &batch).await.is_err());
    assert_eq!(
        PerformanceStatisticRepo::count(&pool, &ReportFilter::default())
            .await
            .unwrap(),
        0
    );
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_list_respects_geo_and_date_filters(pool: PgPool) {
    let fx = seed(&pool).await;
    let batch = vec![
        statistic(&fx, 0, "2026-01-01", 2.0),
        statistic(&fx, 0, "2026-02-01", 3.0),
        statistic(&fx, 1, "2026-02-01", 5.0),
    ];
    PerformanceStatisticRepo::bulk_upsert(&pool, &batch).await.unwrap();

    let filter = ReportFilter {
        geo: GeoFilter {
            battalion_id: Some(fx.locations[0].battalion_id),
            ..Default::default()
        },
        from_date: Some(date("2026-01-15")),
        ..Default::default()
    };
    let rows = PerformanceStatisticRepo::list(&pool, &filter, 25, 0).await.unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].value, 3.0);

    let summary = PerformanceStatisticRepo::statistics(&pool, &ReportFilter::default())
        .await
        .unwrap();
    assert_eq!(summary.total_records, 3);
    assert_eq!(summary.battalions_reporting, 2);
    assert_eq!(summary.total_value, 10.0);
    assert_eq!(summary.first_reporting_date, Some(date("2026-01-01")));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_a_range_rewrites_copied_ancestors(pool: PgPool) {
    let fx = seed(&pool).await;
    let origin = fx.locations[0];
    let stored = PerformanceStatisticRepo::upsert(&pool, &statistic(&fx, 0, "2026-02-01", 2.0))
        .await
        .unwrap()
        .statistic;
    let range_scope = GeoFilter {
        state_id: Some(origin.state_id),
        district_id: Some(origin.district_id),
        range_id: Some(origin.range_id),
        battalion_id: None,
    };
    let range_user = new_user(&pool, "range_officer", range_scope).await;

    let other_state = StateRepo::create(
        &pool,
        &CreateState {
            name: "Gujarat".to_string(),
            code: "GJ".to_string(),
            active: None,
        },
    )
    .await
    .unwrap();
    let other_district = DistrictRepo::create(
        &pool,
        &CreateDistrict {
            state_id: other_state.id,
            name: "Surat".to_string(),
            code: "GJ-SU".to_string(),
            active: None,
        },
    )
    .await
    .unwrap();

    let moved = RangeRepo::update(
        &pool,
        origin.range_id,
        &UpdateRange {
            district_id: Some(other_district.id),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    assert_eq!(moved.district_id, other_district.id);

    let after = PerformanceStatisticRepo::find_by_id(&pool, stored.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.district_id, other_district.id);
    assert_eq!(after.state_id, other_state.id);
    assert_eq!(after.range_id, origin.range_id);

    let user = UserRepo::find_by_id(&pool, range_user).await.unwrap().unwrap();
    assert_eq!(user.district_id, Some(other_district.id));
    assert_eq!(user.state_id, Some(other_state.id));
    assert_eq!(user.range_id, Some(origin.range_id));
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_moving_content_rewrites_copied_ids(pool: PgPool) {
    let fx = seed(&pool).await;
    let other_module = ModuleRepo::create(
        &pool,
        &CreateModule {
            name: "Traffic".to_string(),
            description: None,
            sort_order: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let other_topic = TopicRepo::create(
        &pool,
        &CreateTopic {
            module_id: other_module.id,
            name: "Checkpoints".to_string(),
            description: None,
            sort_order: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let sub_topic = SubTopicRepo::create(
        &pool,
        &CreateSubTopic {
            topic_id: fx.question.topic_id,
            name: "Highway".to_string(),
            description: None,
            sort_order: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let question = QuestionRepo::create(
        &pool,
        &CreateQuestion {
            topic_id: fx.question.topic_id,
            sub_topic_id: Some(sub_topic.id),
            question_text: "Vehicles checked".to_string(),
            question_type: Some("count".to_string()),
            sort_order: None,
            is_mandatory: None,
            active: None,
        },
    )
    .await
    .unwrap();
    let mut answer = statistic(&fx, 0, "2026-02-01", 30.0);
    answer.question = QuestionRepo::find_context(&pool, question.id)
        .await
        .unwrap()
        .unwrap();
    let in_sub_topic = PerformanceStatisticRepo::upsert(&pool, &answer)
        .await
        .unwrap()
        .statistic;
    let in_topic = PerformanceStatisticRepo::upsert(&pool, &statistic(&fx, 0, "2026-02-01", 5.0))
        .await
        .unwrap()
        .statistic;

    // The sub-topic carries its question and statistics to the other topic.
    SubTopicRepo::update(
        &pool,
        sub_topic.id,
        &UpdateSubTopic {
            topic_id: Some(other_topic.id),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    let moved = QuestionRepo::find_by_id(&pool, question.id).await.unwrap().unwrap();
    assert_eq!(moved.topic_id, other_topic.id);
    let after = PerformanceStatisticRepo::find_by_id(&pool, in_sub_topic.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.topic_id, other_topic.id);
    assert_eq!(after.module_id, other_module.id);

    // Moving the original topic re-homes its remaining statistics.
    TopicRepo::update(
        &pool,
        fx.question.topic_id,
        &UpdateTopic {
            module_id: Some(other_module.id),
            ..Default::default()
        },
    )
    .await
    .unwrap()
    .unwrap();
    let after = PerformanceStatisticRepo::find_by_id(&pool, in_topic.id)
        .await
        .unwrap()
        .unwrap();
    assert_eq!(after.module_id, other_module.id);
}

// ---------------------------------------------------------------------------
// Reports
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_report_queries(pool: PgPool) {
    let fx = seed(&pool).await;
    let batch = vec![
        statistic(&fx, 0, "2026-01-10", 2.0),
        statistic(&fx, 0, "2026-02-10", 4.0),
        statistic(&fx, 1, "2026-02-11", 6.0),
    ];
    PerformanceStatisticRepo::bulk_upsert(&pool, &batch).await.unwrap();
    let filter = ReportFilter::default();

    let summary = ReportRepo::summary(&pool, &filter).await.unwrap();
    assert_eq!(summary.len(), 1);
    assert_eq!(summary[0].record_count, 3);
    assert_eq!(summary[0].total_value, 12.0);
    assert_eq!(summary[0].max_value, 6.0);

    let geographic = ReportRepo::geographic(&pool, &filter, GeoLevel::Battalion)
        .await
        .unwrap();
    let names: Vec<&str> = geographic.iter().map(|r| r.geo_name.as_str()).collect();
    assert_eq!(names, ["Alpha", "Bravo"]);

    let trend = ReportRepo::trend(&pool, &filter, TrendInterval::Month)
        .await
        .unwrap();
    assert_eq!(trend.len(), 2);
    assert_eq!(trend[0].period, date("2026-01-01"));
    assert_eq!(trend[1].total_value, 10.0);

    let detailed = ReportRepo::detailed(&pool, &filter, 2, 0).await.unwrap();
    assert_eq!(detailed.len(), 2);
    assert_eq!(detailed[0].reporting_date, date("2026-02-11"));
    assert_eq!(ReportRepo::detailed_count(&pool, &filter).await.unwrap(), 3);

    let january = ReportFilter {
        to_date: Some(date("2026-01-31")),
        ..Default::default()
    };
    let submission = ReportRepo::submission(&pool, &january, 10, 0).await.unwrap();
    assert_eq!(submission.len(), 2);
    assert_eq!(submission[0].battalion_name, "Bravo");
    assert_eq!(submission[0].record_count, 0);
    assert_eq!(submission[1].record_count, 1);
}

// ---------------------------------------------------------------------------
// Communications
// ---------------------------------------------------------------------------

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_direct_communication_thread(pool: PgPool) {
    let sender = new_user(&pool, "sender", GeoFilter::default()).await;
    let reader = new_user(&pool, "reader", GeoFilter::default()).await;

    let communication = CommunicationRepo::create_with_recipients(
        &pool,
        &NewCommunication {
            subject: "Weekly figures".to_string(),
            body: "Please submit by Friday".to_string(),
            sender_id: sender,
            kind: KIND_DIRECT,
            priority: "high".to_string(),
        },
        &[reader],
    )
    .await
    .unwrap();

    assert_eq!(CommunicationRepo::unread_count(&pool, reader).await.unwrap(), 1);
    let inbox = MailboxQuery {
        user_id: reader,
        limit: 25,
        ..Default::default()
    };
    let items = CommunicationRepo::list_inbox(&pool, &inbox).await.unwrap();
    assert_eq!(items.len(), 1);
    assert_eq!(items[0].is_read, Some(false));
    assert_eq!(items[0].sender_name, "sender user");

    assert!(CommunicationRepo::mark_read(&pool, communication.id, reader).await.unwrap());
    assert!(!CommunicationRepo::mark_read(&pool, communication.id, sender).await.unwrap());
    assert_eq!(CommunicationRepo::unread_count(&pool, reader).await.unwrap(), 0);

    let message = CommunicationRepo::add_message(&pool, communication.id, sender, "Reminder")
        .await
        .unwrap();
    assert_eq!(message.sender_name, "sender user");
    assert_eq!(CommunicationRepo::unread_count(&pool, reader).await.unwrap(), 1);
    assert_eq!(
        CommunicationRepo::count_messages(&pool, communication.id).await.unwrap(),
        1
    );

    let outsider = new_user(&pool, "outsider", GeoFilter::default()).await;
    assert!(CommunicationRepo::find_for_participant(&pool, communication.id, outsider)
        .await
        .unwrap()
        .is_none());

    assert!(CommunicationRepo::deactivate(&pool, communication.id).await.unwrap());
    assert_eq!(CommunicationRepo::unread_count(&pool, reader).await.unwrap(), 0);
}

#[sqlx::test(migrations = "../../db/migrations")]
async fn test_broadcast_targets_users_inside_scope(pool: PgPool) {
    let fx = seed(&pool).await;
    let alpha = fx.locations[0];
    let inside = new_user(
        &pool,
        "inside",
        GeoFilter {
            state_id: Some(alpha.state_id),
            battalion_id: Some(alpha.battalion_id),
            ..Default::default()
        },
    )
    .await;
    new_user(
        &pool,
        "elsewhere",
        GeoFilter {
            battalion_id: Some(fx.locations[1].battalion_id),
            ..Default::default()
        },
    )
    .await;

    let (communication, recipients) = CommunicationRepo::broadcast(
        &pool,
        &NewCommunication {
            subject: "Alpha only".to_string(),
            body: "Drill at dawn".to_string(),
            sender_id: fx.user_id,
            kind: KIND_BROADCAST,
            priority: "normal".to_string(),
        },
        &GeoFilter {
            battalion_id: Some(alpha.battalion_id),
            ..Default::default()
        },
    )
    .await
    .unwrap();

    assert_eq!(communication.kind, "broadcast");
    assert_eq!(recipients, 1);
    let list = CommunicationRepo::list_recipients(&pool, communication.id)
        .await
        .unwrap();
    assert_eq!(list[0].user_id, inside);
}
