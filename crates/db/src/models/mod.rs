//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` + `Validate` create DTO for inserts
//! - A `Deserialize` + `Validate` update DTO (all `Option` fields) for patches

pub mod common;
pub mod communication;
pub mod content;
pub mod dashboard;
pub mod geography;
pub mod menu;
pub mod performance_statistic;
pub mod report;
pub mod role;
pub mod session;
pub mod user;
