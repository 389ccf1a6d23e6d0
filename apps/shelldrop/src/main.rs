//! shelldrop entry point.

mod app;
mod cli;
mod config;

use std::time::Duration;

use clap::Parser;
use tracing_subscriber::EnvFilter;

fn main() -> anyhow::Result<()> {
    let cli = cli::Cli::parse();

    // Logs go to stderr; stdout belongs to the remote shell.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let mut config = config::Config::load(cli.config.as_deref())?;
    cli.apply_overrides(&mut config);
    tracing::debug!(?config, "configuration resolved");

    let rt = tokio::runtime::Runtime::new()?;
    let result = rt.block_on(async {
        tokio::select! {
            result = app::run(cli, config) => result,
            _ = tokio::signal::ctrl_c() => {
                tracing::info!("SIGINT received, shutting down");
                Ok(())
            }
        }
    });

    // The stdin reader thread may still be parked in a blocking read.
    rt.shutdown_timeout(Duration::from_millis(100));
    result
}
