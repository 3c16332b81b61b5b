mod board;
mod cpu;
mod disks;
mod gpu;
mod memory;
mod network;
mod temps;
mod usage;

use std::sync::Mutex;
use std::time::Duration;

use serde::Serialize;

use crate::exec::CommandRunner;
use crate::probe::Probe;

pub use usage::{cpu_percent, parse_cpu_line, CpuTicks};

/// Separator line between report sections
pub const SECTION_SEPARATOR: &str = "-------------------";

/// Shorter deadline for slow vendor probes (nvidia-smi, radeontop)
pub const VENDOR_TOOL_TIMEOUT: Duration = Duration::from_secs(3);

/// The fixed set of diagnostic report providers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SourceKind {
    Cpu,
    Usage,
    Temps,
    Board,
    Memory,
    Disks,
    Network,
    Gpu,
}

impl SourceKind {
    /// Menu order of the registry
    pub const ALL: [SourceKind; 8] = [
        SourceKind::Cpu,
        SourceKind::Usage,
        SourceKind::Temps,
        SourceKind::Board,
        SourceKind::Memory,
        SourceKind::Disks,
        SourceKind::Network,
        SourceKind::Gpu,
    ];

    /// Display label shown in the menu and report headers
    pub fn label(&self) -> &'static str {
        match self {
            SourceKind::Cpu => "CPU",
            SourceKind::Usage => "System Usage",
            SourceKind::Temps => "Temperatures",
            SourceKind::Board => "Motherboard",
            SourceKind::Memory => "Memory",
            SourceKind::Disks => "Disks",
            SourceKind::Network => "Network",
            SourceKind::Gpu => "GPU",
        }
    }
}

/// Aggregate over all report providers.
///
/// Holds the command runner, the availability/privilege probe, and the one
/// piece of call-to-call state in the system: the previous CPU tick sample
/// used for delta-based usage percentages.
pub struct Sources {
    runner: CommandRunner,
    probe: Probe,
    usage_ticks: Mutex<CpuTicks>,
}

impl Default for Sources {
    fn default() -> Self {
        Self::new()
    }
}

impl Sources {
    pub fn new() -> Self {
        Self::with_parts(CommandRunner::new(), Probe::system())
    }

    pub fn with_parts(runner: CommandRunner, probe: Probe) -> Self {
        Self {
            runner,
            probe,
            usage_ticks: Mutex::new(CpuTicks::default()),
        }
    }

    /// Produce the report for `kind`. Never fails: every error condition
    /// (timeout, missing utility, insufficient privilege, empty data) is
    /// encoded as readable text in the returned report.
    pub async fn fetch(&self, kind: SourceKind) -> String {
        tracing::debug!("Fetching {} report", kind.label());
        match kind {
            SourceKind::Cpu => cpu::fetch(&self.runner, &self.probe).await,
            SourceKind::Usage => usage::fetch(&self.usage_ticks),
            SourceKind::Temps => temps::fetch(&self.runner, &self.probe).await,
            SourceKind::Board => board::fetch(&self.runner, &self.probe).await,
            SourceKind::Memory => memory::fetch(&self.runner, &self.probe).await,
            SourceKind::Disks => disks::fetch(&self.runner, &self.probe).await,
            SourceKind::Network => network::fetch(&self.runner, &self.probe).await,
            SourceKind::Gpu => gpu::fetch(&self.runner, &self.probe).await,
        }
    }
}
