//! HTTP middleware components.

pub mod logging;
pub mod metrics;
pub mod request_db;
pub mod trace_id;

pub use metrics::{init_metrics, metrics_handler, metrics_middleware};
pub use request_db::{request_db_scope, with_request_db, SharedRequestDb};
pub use trace_id::{trace_id, REQUEST_ID_HEADER};
