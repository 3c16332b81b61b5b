use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use clap::Args;

use crate::exec::CommandRunner;
use crate::probe::Probe;
use crate::sources::Sources;
use crate::ui::Dashboard;

#[derive(Args)]
pub struct DashboardCommand {
    /// Seconds between automatic refreshes of the visible source
    #[arg(long, default_value_t = 3)]
    pub refresh_secs: u64,

    /// Default per-command deadline in seconds
    #[arg(long, default_value_t = 5)]
    pub timeout_secs: u64,
}

impl Default for DashboardCommand {
    fn default() -> Self {
        Self {
            refresh_secs: 3,
            timeout_secs: 5,
        }
    }
}

impl DashboardCommand {
    pub async fn execute(self) -> Result<()> {
        let runner = CommandRunner::with_timeout(Duration::from_secs(self.timeout_secs));
        let sources = Arc::new(Sources::with_parts(runner, Probe::system()));

        let mut dashboard = Dashboard::new(sources, Duration::from_secs(self.refresh_secs))?;
        let result = dashboard.run().await;
        dashboard.cleanup()?;

        result
    }
}
