//! Request handlers, one submodule per resource.
//!
//! Handlers validate input, check the caller's role and scope, delegate to
//! the matching repository in `pstats_db` and wrap the result in the
//! response envelope. Errors are mapped via [`AppError`](crate::error::AppError).

pub mod auth;
pub mod battalion;
pub mod communication;
pub mod dashboard;
pub mod district;
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
