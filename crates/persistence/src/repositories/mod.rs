//! Repository implementations for database operations.

pub mod mail;

pub use mail::MailRepository;
