//! Schema initializer.
//!
//! The initial structure of the database is a fixed, ordered list of
//! statements applied in one transaction. Running it drops and recreates the
//! tables, so it is only invoked explicitly (the `init-db` command).

use async_trait::async_trait;
use sqlx::mysql::MySqlConnection;
use sqlx::Executor;
use tracing::{info, warn};

use crate::db::{Connector, RequestDb};

/// Statements defining the initial database structure, in execution order.
pub const INSTRUCTIONS: &[&str] = &[
    "DROP TABLE IF EXISTS email",
    r#"
    CREATE TABLE email (
        id INT PRIMARY KEY AUTO_INCREMENT,
        email TEXT NOT NULL,
        subject TEXT NOT NULL,
        content TEXT NOT NULL
    )
    "#,
];

/// A connection able to run raw statements inside an explicit transaction.
#[async_trait]
pub trait SchemaSession: Send {
    async fn begin(&mut self) -> Result<(), sqlx::Error>;

    async fn execute_statement(&mut self, statement: &str) -> Result<(), sqlx::Error>;

    async fn commit(&mut self) -> Result<(), sqlx::Error>;
}

#[async_trait]
impl SchemaSession for MySqlConnection {
    async fn begin(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, "START TRANSACTION").await?;
        Ok(())
    }

    async fn execute_statement(&mut self, statement: &str) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, statement).await?;
        Ok(())
    }

    async fn commit(&mut self) -> Result<(), sqlx::Error> {
        Executor::execute(&mut *self, "COMMIT").await?;
        Ok(())
    }
}

/// Runs `instructions` in order and commits once after the last one.
///
/// The first failing statement aborts the run: later statements are not
/// executed and no commit is issued.
pub async fn apply_instructions<S>(
    session: &mut S,
    instructions: &[&str],
) -> Result<(), sqlx::Error>
where
    S: SchemaSession + ?Sized,
{
    session.begin().await?;

    for (index, statement) in instructions.iter().enumerate() {
        if let Err(e) = session.execute_statement(statement).await {
            warn!(statement = index, error = %e, "Schema statement failed, not committing");
            return Err(e);
        }
    }

    session.commit().await
}

/// Initializes the database through the request-scoped connection.
pub async fn init_db<C>(db: &mut RequestDb<C>) -> Result<(), sqlx::Error>
where
    C: Connector,
    C::Connection: SchemaSession,
{
    let connection = db.get_connection().await?;
    apply_instructions(connection, INSTRUCTIONS).await?;
    info!(statements = INSTRUCTIONS.len(), "Database schema initialized");
    Ok(())
}
