use axum::{middleware, routing::get, Router};
use persistence::db::MySqlConnector;
use std::sync::Arc;
use std::time::Duration;
use tower_http::trace::TraceLayer;

use crate::config::Config;
use crate::middleware::{metrics_handler, metrics_middleware, trace_id, with_request_db};
use crate::routes::{health, mails};
use crate::services::EmailService;

#[derive(Clone)]
pub struct AppState {
    pub config: Arc<Config>,
    pub connector: Arc<MySqlConnector>,
    pub email: EmailService,
}

impl AppState {
    pub fn new(config: Config) -> Self {
        let connector = Arc::new(MySqlConnector::new(&config.database));
        let email = EmailService::new(config.email.clone());

        Self {
            config: Arc::new(config),
            connector,
            email,
        }
    }
}

pub fn create_app(config: Config) -> Router {
    build_router(AppState::new(config))
}

/// Assembles routes and middleware around `state`.
///
/// Middleware order (outermost first): request ID, HTTP tracing, metrics,
/// the request database scope, then the timeout.
pub fn build_router(state: AppState) -> Router {
    let timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    let mail_routes = Router::new()
        .route(
            "/api/v1/mails",
            get(mails::list_mails).post(mails::create_mail),
        )
        .route("/api/v1/mails/:id", get(mails::get_mail));

    let health_routes = Router::new()
        .route("/api/health", get(health::health_check))
        .route("/api/health/live", get(health::live))
        .route("/api/health/ready", get(health::ready));

    let routes = Router::new()
        .merge(mail_routes)
        .merge(health_routes)
        .route("/metrics", get(metrics_handler));

    with_request_db(routes, state.connector.clone(), timeout)
        .layer(middleware::from_fn(metrics_middleware))
        .layer(TraceLayer::new_for_http())
        .layer(middleware::from_fn(trace_id))
        .with_state(state)
}
