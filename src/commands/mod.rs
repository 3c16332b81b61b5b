mod dashboard;
mod report;

use anyhow::Result;
use clap::{Parser, Subcommand};

pub use dashboard::DashboardCommand;
pub use report::ReportCommand;

#[derive(Parser)]
#[command(name = "sysdash")]
#[command(about = "Terminal dashboard for hardware and diagnostic reports", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch the interactive dashboard (the default)
    Dashboard(DashboardCommand),

    /// Print one or all source reports to stdout
    Report(ReportCommand),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

impl Cli {
    /// Whether this invocation takes over the terminal with the TUI
    pub fn wants_tui(&self) -> bool {
        matches!(self.command, None | Some(Commands::Dashboard(_)))
    }

    pub async fn execute(self) -> Result<()> {
        match self.command {
            None => DashboardCommand::default().execute().await,
            Some(Commands::Dashboard(cmd)) => cmd.execute().await,
            Some(Commands::Report(cmd)) => cmd.execute().await,
            Some(Commands::Completions { shell }) => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
