use anyhow::Result;
use clap::Parser;
use tracing::info;

use mailroom_api::commands::{self, Cli};
use mailroom_api::config::Config;
use mailroom_api::middleware::logging::init_logging;

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // Load .env file if present
    dotenvy::dotenv().ok();

    let config = Config::load()?;

    init_logging(&config.logging)?;

    info!(
        command = ?cli.selected(),
        "Starting Mailroom v{}",
        env!("CARGO_PKG_VERSION")
    );

    commands::run(cli, config).await
}
