//! Basic Impacts data access layer
//!
//! One async trait per entity, each with a PostgreSQL implementation (sqlx) and
//! a shared in-process implementation used for development and tests.

pub mod db;

pub use db::*;
