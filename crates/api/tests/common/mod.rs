//! Common test utilities for integration tests.

#![allow(dead_code)]

use axum::{
    body::Body,
    http::{header, Method, Request},
    response::Response,
    Router,
};
use mailroom_api::{app::create_app, config::Config};
use serde_json::Value;

/// Base variables for a console-provider configuration.
fn base_env() -> Vec<(String, String)> {
    [
        ("SECRET_KEY", "integration-secret"),
        ("FROM_EMAIL", "noreply@example.com"),
        ("EMAIL_PROVIDER", "console"),
        ("LOG_LEVEL", "warn"),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v.to_string()))
    .collect()
}

fn config_for(host: &str, port: &str, user: &str, password: &str, name: &str) -> Config {
    let mut env = base_env();
    env.extend(
        [
            ("FLASK_DATABASE_HOST", host),
            ("FLASK_DATABASE_PORT", port),
            ("FLASK_DATABASE_USER", user),
            ("FLASK_DATABASE_PASSWORD", password),
            ("FLASK_DATABASE", name),
        ]
        .into_iter()
        .map(|(k, v)| (k.to_string(), v.to_string())),
    );

    let config = Config::from_env_vars(env).expect("Failed to build test config");
    config.validate().expect("Invalid test config");
    config
}

/// Configuration pointing at a port nothing listens on.
pub fn unreachable_config() -> Config {
    config_for("127.0.0.1", "1", "mailer", "", "mailroom_test")
}

/// Configuration for the test database, or `None` when `TEST_DATABASE_HOST`
/// is not set.
///
/// Reads `TEST_DATABASE_HOST`, `TEST_DATABASE_PORT`, `TEST_DATABASE_USER`,
/// `TEST_DATABASE_PASSWORD` and `TEST_DATABASE_NAME`.
pub fn database_config() -> Option<Config> {
    let host = std::env::var("TEST_DATABASE_HOST").ok()?;
    let var = |name: &str, default: &str| std::env::var(name).unwrap_or_else(|_| default.into());

    Some(config_for(
        &host,
        &var("TEST_DATABASE_PORT", "3306"),
        &var("TEST_DATABASE_USER", "root"),
        &var("TEST_DATABASE_PASSWORD", ""),
        &var("TEST_DATABASE_NAME", "mailroom_test"),
    ))
}

pub fn create_test_app(config: Config) -> Router {
    create_app(config)
}

/// Helper to create a JSON request.
pub fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

pub fn get_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method(Method::GET)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

/// Helper to parse JSON response body.
pub async fn parse_response_body(response: Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap_or(Value::Null)
}
