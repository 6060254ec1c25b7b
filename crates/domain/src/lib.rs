//! Domain layer for the Mailroom backend.
//!
//! This crate contains the mail models exchanged over the API and the
//! validation rules applied to them.

pub mod models;
