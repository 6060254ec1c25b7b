pub mod app;
pub mod commands;
pub mod config;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod services;
