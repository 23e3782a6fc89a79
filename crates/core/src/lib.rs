//! Domain primitives shared by the database and HTTP layers.
//!
//! Nothing in this crate performs I/O: it holds the error type, id and
//! timestamp aliases, role names, and the pure validation / filtering rules
//! that handlers apply before touching the database.

pub mod communication;
pub mod error;
pub mod pagination;
pub mod questions;
pub mod report;
pub mod roles;
pub mod scope;
pub mod types;
pub mod validation;
