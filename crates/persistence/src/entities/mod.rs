//! Database entity definitions.
//!
//! Entities are direct mappings to database rows, decoded by column name.

pub mod mail;

pub use mail::MailEntity;
