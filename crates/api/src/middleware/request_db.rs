//! Request-scoped database connection middleware.
//!
//! Every request gets a fresh [`RequestDb`] in its extensions. Handlers
//! obtain the connection through it; this middleware closes whatever was
//! opened once the inner service has produced a response, whether that
//! response is a success or an error.

use axum::{
    body::Body,
    extract::State,
    http::Request,
    middleware::{self, Next},
    response::Response,
    Router,
};
use persistence::db::{Connector, MySqlConnector, RequestDb};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::Mutex;
use tower_http::timeout::TimeoutLayer;
use tracing::warn;

/// Handle to the request's database context, stored in request extensions.
pub type SharedRequestDb<C = MySqlConnector> = Arc<Mutex<RequestDb<C>>>;

/// Installs a request database context and tears it down after the handler.
///
/// Close failures are logged and never replace the response.
pub async fn request_db_scope<C: Connector>(
    State(connector): State<Arc<C>>,
    mut req: Request<Body>,
    next: Next,
) -> Response {
    let db: SharedRequestDb<C> = Arc::new(Mutex::new(RequestDb::new(connector)));
    req.extensions_mut().insert(db.clone());

    let response = next.run(req).await;

    let mut db = db.lock().await;
    if let Err(e) = db.close_connection().await {
        warn!(
            error = %e,
            status = response.status().as_u16(),
            "Failed to close request-scoped database connection"
        );
    }

    response
}

/// Wraps `router` in the request timeout and, outside it, the database scope.
///
/// A timed-out handler is dropped inside the scope, so teardown still runs
/// and closes whatever the handler opened.
pub fn with_request_db<S, C>(router: Router<S>, connector: Arc<C>, timeout: Duration) -> Router<S>
where
    S: Clone + Send + Sync + 'static,
    C: Connector,
{
    router
        .layer(TimeoutLayer::new(timeout))
        .layer(middleware::from_fn_with_state(
            connector,
            request_db_scope::<C>,
        ))
}
