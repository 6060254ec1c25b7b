//! Domain models for Mailroom.

pub mod mail;

pub use mail::{CreateMailRequest, ListMailsResponse, Mail, MailSearchQuery};
