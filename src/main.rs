use anyhow::{Context, Result};
use clap::Parser;
use emflog::cli::Cli;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

fn main() -> Result<()> {
    // Diagnostics go to stderr; stdout carries only the log line.
    let subscriber = FmtSubscriber::builder()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .finish();
    tracing::subscriber::set_global_default(subscriber)
        .context("setting default subscriber failed")?;

    let cli = Cli::parse();
    let mut log = cli.build_log().context("building metric log")?;

    let record = log.flush();
    tracing::debug!(fields = record.fields().len(), "emitted metric log line");
    Ok(())
}
