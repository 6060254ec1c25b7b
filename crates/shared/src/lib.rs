//! Shared utilities and common types for the Mailroom backend.
//!
//! This crate provides common functionality used across all other crates:
//! - Secret values that never leak through `Debug`
//! - Common validation logic

pub mod secret;
pub mod validation;

pub use secret::Secret;
