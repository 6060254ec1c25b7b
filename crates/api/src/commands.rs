//! Command-line interface.

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use persistence::db::{Connector, MySqlConnector, RequestDb};
use persistence::schema::{self, SchemaSession};
use std::io::Write;
use std::sync::Arc;
use tracing::{info, warn};

use crate::app;
use crate::config::Config;
use crate::middleware;

/// Printed by `init-db` once the schema is committed.
pub const INIT_DB_CONFIRMATION: &str = "Database initialized";

#[derive(Parser, Debug)]
#[command(name = "mailroom", version, about = "Mail sending backend")]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand, Debug, Clone, Copy, PartialEq, Eq)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,
    /// Drop and recreate the database tables
    #[command(name = "init-db")]
    InitDb,
}

impl Cli {
    pub fn selected(&self) -> Commands {
        self.command.unwrap_or(Commands::Serve)
    }
}

/// Run the command selected on the command line.
pub async fn run(cli: Cli, config: Config) -> Result<()> {
    match cli.selected() {
        Commands::Serve => serve(config).await,
        Commands::InitDb => {
            let connector = Arc::new(MySqlConnector::new(&config.database));
            init_db(connector, &mut std::io::stdout()).await
        }
    }
}

/// Start the HTTP server and block until it exits.
pub async fn serve(config: Config) -> Result<()> {
    middleware::init_metrics().context("failed to install the metrics recorder")?;

    let addr = config
        .socket_addr()
        .with_context(|| format!("invalid listen address {}", config.server.host))?;
    let app = app::create_app(config);

    let listener = tokio::net::TcpListener::bind(addr)
        .await
        .with_context(|| format!("failed to bind {}", addr))?;
    info!("Server listening on {}", addr);

    axum::serve(listener, app).await?;
    Ok(())
}

/// Initialize the database schema and print the confirmation to `out`.
///
/// The connection is opened in a command-scoped context and closed on every
/// exit path.
pub async fn init_db<C, W>(connector: Arc<C>, out: &mut W) -> Result<()>
where
    C: Connector,
    C::Connection: SchemaSession,
    W: Write,
{
    let mut db = RequestDb::new(connector);
    let result = schema::init_db(&mut db).await;

    if let Err(e) = db.close_connection().await {
        warn!(error = %e, "Failed to close database connection after init-db");
    }

    result.context("failed to initialize the database")?;
    writeln!(out, "{}", INIT_DB_CONFIRMATION)?;
    Ok(())
}
