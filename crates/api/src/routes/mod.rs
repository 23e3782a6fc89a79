pub mod auth;
pub mod battalion;
pub mod communication;
pub mod dashboard;
pub mod district;
pub mod health;
pub mod menu;
pub mod module;
pub mod performance_statistic;
pub mod permission;
pub mod question;
pub mod range;
pub mod report;
pub mod role;
pub mod state;
pub mod sub_menu;
pub mod sub_topic;
pub mod topic;
pub mod user;

use axum::Router;

use crate::state::AppState;

/// Build the `/api` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /auth/login, /auth/refresh                       public
/// /auth/logout, /auth/me, /auth/me/menus,
/// /auth/me/password                                authenticated
///
/// /states, /districts, /ranges, /battalions        geography
/// /modules, /topics, /sub-topics, /questions       content
/// /menus, /sub-menus, /permissions, /roles         navigation and access
///     GET  /, /statistics, /{id}                   any authenticated user
///     POST /, PUT /{id}, PATCH /{id}/status,
///     DELETE /{id}                                 admin only
/// /roles/{id}/permissions                          get, replace
///
/// /users                                           admin only
/// /users/{id}/roles                                replace roles
/// /users/{id}/reset-password                       set a new password
///
/// /communications                                  inbox / sent, direct send
/// /communications/broadcast                        scoped fan-out
/// /communications/unread-count
/// /communications/{id}                             detail, delete
/// /communications/{id}/messages                    thread replies
/// /communications/{id}/read                        mark read
///
/// /performance-statistics                          list, submit (scoped)
/// /performance-statistics/bulk                     batch submit
/// /performance-statistics/statistics               aggregate
/// /performance-statistics/{id}                     get, update, delete
///
/// /reports?report_type=...                         generate
/// /reports/types                                   available report types
///
/// /dashboard/summary                               landing page counts
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .nest("/auth", auth::router())
        // Geography
        .nest("/states", state::router())
        .nest("/districts", district::router())
        .nest("/ranges", range::router())
        .nest("/battalions", battalion::router())
        // Content
        .nest("/modules", module::router())
        .nest("/topics", topic::router())
        .nest("/sub-topics", sub_topic::router())
        .nest("/questions", question::router())
        // Navigation and access control
        .nest("/menus", menu::router())
        .nest("/sub-menus", sub_menu::router())
        .nest("/permissions", permission::router())
        .nest("/roles", role::router())
        .nest("/users", user::router())
        // Messaging, statistics and reporting
        .nest("/communications", communication::router())
        .nest("/performance-statistics", performance_statistic::router())
        .nest("/reports", report::router())
        .nest("/dashboard", dashboard::router())
}
