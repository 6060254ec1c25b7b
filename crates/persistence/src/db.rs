//! Database configuration and request-scoped connection management.
//!
//! There is no pool. Each request owns a [`RequestDb`] that opens at most one
//! connection, on first use, and the request teardown closes it.

use async_trait::async_trait;
use serde::Deserialize;
use shared::Secret;
use sqlx::mysql::{MySqlConnectOptions, MySqlConnection};
use sqlx::Connection;
use std::fmt;
use std::sync::Arc;
use tracing::{debug, warn};

use crate::metrics;

/// Database configuration.
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    pub host: String,

    #[serde(default = "default_port")]
    pub port: u16,

    pub user: String,

    #[serde(default)]
    pub password: Secret,

    /// Database (schema) name.
    pub name: String,
}

fn default_port() -> u16 {
    3306
}

/// Opens and closes physical database connections.
///
/// [`RequestDb`] is generic over this so the lifecycle can run against
/// something other than a live server.
#[async_trait]
pub trait Connector: Send + Sync + 'static {
    type Connection: Send + 'static;

    /// Open a new physical connection.
    async fn connect(&self) -> Result<Self::Connection, sqlx::Error>;

    /// Close a connection previously returned by [`Connector::connect`].
    async fn disconnect(&self, connection: Self::Connection) -> Result<(), sqlx::Error>;
}

/// Connector for a MySQL server described by a [`DatabaseConfig`].
#[derive(Clone)]
pub struct MySqlConnector {
    options: MySqlConnectOptions,
    host: String,
    port: u16,
    database: String,
}

impl MySqlConnector {
    pub fn new(config: &DatabaseConfig) -> Self {
        let options = MySqlConnectOptions::new()
            .host(&config.host)
            .port(config.port)
            .username(&config.user)
            .password(config.password.expose())
            .database(&config.name);

        Self {
            options,
            host: config.host.clone(),
            port: config.port,
            database: config.name.clone(),
        }
    }

    pub fn options(&self) -> &MySqlConnectOptions {
        &self.options
    }
}

impl fmt::Debug for MySqlConnector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("MySqlConnector")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("database", &self.database)
            .finish_non_exhaustive()
    }
}

#[async_trait]
impl Connector for MySqlConnector {
    type Connection = MySqlConnection;

    async fn connect(&self) -> Result<MySqlConnection, sqlx::Error> {
        MySqlConnection::connect_with(&self.options).await
    }

    async fn disconnect(&self, connection: MySqlConnection) -> Result<(), sqlx::Error> {
        connection.close().await
    }
}

/// Round-trips `SELECT 1` over `connection`.
pub async fn ping(connection: &mut MySqlConnection) -> Result<(), sqlx::Error> {
    sqlx::query("SELECT 1").execute(connection).await?;
    Ok(())
}

/// Lifecycle of the connection held by one request context.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Nothing has asked for a connection yet.
    Uninitialized,
    /// A connection is cached.
    Open,
    /// The cached connection was released.
    Closed,
}

/// Request-scoped database handle.
///
/// Holds at most one connection. [`RequestDb::get_connection`] opens it on
/// first use and returns the same connection on every later call;
/// [`RequestDb::close_connection`] releases it and is a no-op when nothing is
/// cached.
pub struct RequestDb<C: Connector = MySqlConnector> {
    connector: Arc<C>,
    connection: Option<C::Connection>,
    state: ConnectionState,
}

impl<C: Connector> RequestDb<C> {
    pub fn new(connector: Arc<C>) -> Self {
        Self {
            connector,
            connection: None,
            state: ConnectionState::Uninitialized,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    /// Whether a connection is currently cached.
    pub fn is_open(&self) -> bool {
        self.connection.is_some()
    }

    /// Returns the cached connection, opening it first if needed.
    ///
    /// Connection failures are returned as-is and leave nothing cached.
    pub async fn get_connection(&mut self) -> Result<&mut C::Connection, sqlx::Error> {
        let connection = match self.connection.take() {
            Some(connection) => connection,
            None => {
                let connection = self.connector.connect().await?;
                metrics::record_connection_opened();
                debug!("Opened request-scoped database connection");
                self.state = ConnectionState::Open;
                connection
            }
        };
        Ok(self.connection.insert(connection))
    }

    /// Releases the cached connection, if any.
    ///
    /// The connection is removed from the context before it is closed, so
    /// even a failed close leaves the context empty.
    pub async fn close_connection(&mut self) -> Result<(), sqlx::Error> {
        let Some(connection) = self.connection.take() else {
            return Ok(());
        };
        self.state = ConnectionState::Closed;
        self.connector.disconnect(connection).await?;
        metrics::record_connection_closed();
        debug!("Closed request-scoped database connection");
        Ok(())
    }
}

impl<C: Connector> Drop for RequestDb<C> {
    fn drop(&mut self) {
        if self.connection.take().is_some() {
            warn!("Request-scoped database connection dropped without teardown");
        }
    }
}
