mod commands;
mod exec;
mod probe;
mod sources;
mod ui;

use anyhow::{Context, Result};
use clap::Parser;
use tracing_subscriber::EnvFilter;

use crate::commands::Cli;

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging(&cli)?;

    tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?
        .block_on(async { cli.execute().await })
}

/// Initialize logging. The dashboard owns the terminal, so TUI runs log to
/// a file under the home directory instead of stderr.
fn init_logging(cli: &Cli) -> Result<()> {
    let default_filter = if cli.verbose {
        "sysdash=debug"
    } else {
        "sysdash=info"
    };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));

    if cli.wants_tui() {
        let log_dir = dirs::home_dir()
            .context("Could not find home directory")?
            .join(".sysdash");
        std::fs::create_dir_all(&log_dir).context("Failed to create log directory")?;
        let log_file = std::fs::File::create(log_dir.join("sysdash.log"))
            .context("Failed to create log file")?;

        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::sync::Mutex::new(log_file))
            .with_ansi(false)
            .init();
    } else {
        tracing_subscriber::fmt()
            .with_env_filter(filter)
            .with_writer(std::io::stderr)
            .init();
    }

    Ok(())
}
