//! Pipeline stages and store operations.
//!
//! Stages run in order: locate, decrypt, extract, group, load, archive, then the
//! reporting view is refreshed. [`pipeline::run`] wires them together; every stage is
//! also usable on its own.

pub mod archive;
pub mod branch;
pub mod category;
pub mod coerce;
pub mod decrypt;
pub mod extract;
pub mod grouping;
pub mod header_map;
pub mod loader;
pub mod locator;
pub mod menu;
pub mod order;
pub mod pipeline;
pub mod processed;
pub mod report_view;

use sea_orm::{DbErr, SqlErr};

/// True when `err` is a unique-constraint violation, i.e. another writer got there first.
pub(crate) fn is_unique_violation(err: &DbErr) -> bool {
    matches!(err.sql_err(), Some(SqlErr::UniqueConstraintViolation(_)))
}
