//! Persistence layer for the Mailroom backend.
//!
//! This crate contains:
//! - Database configuration and the request-scoped connection
//! - The schema initializer
//! - Entity definitions (database row mappings)
//! - Repository implementations

pub mod db;
pub mod entities;
pub mod metrics;
pub mod repositories;
pub mod schema;
